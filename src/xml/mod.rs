pub mod document;
pub mod selector;
pub mod structural;
