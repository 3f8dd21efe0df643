use std::path::PathBuf;

/// Errors from file store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The root directory could not be created.
    #[error("could not initialize storage at {}: {source}", root.display())]
    Init {
        root: PathBuf,
        source: std::io::Error,
    },

    /// The requested file does not exist or cannot be read.
    #[error("could not read file: {0}")]
    NotFound(String),

    /// Writing a document failed.
    #[error("failed to store file {filename}: {source}")]
    Write {
        filename: String,
        source: std::io::Error,
    },

    /// I/O error reading an already located document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` if this is a missing-file error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for file store operations.
pub type StoreResult<T> = Result<T, StoreError>;
