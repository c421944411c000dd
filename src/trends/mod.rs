pub mod analysis;
pub mod frequency;
