use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestLensError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Malformed artifact '{file}': {message}")]
    MalformedArtifact { file: String, message: String },

    #[error("Invalid selector '{expression}': {message}")]
    InvalidSelector { expression: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TestLensError>;
