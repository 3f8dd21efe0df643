use std::path::PathBuf;

/// Errors from metadata store operations.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// A record with this filename already exists.
    #[error("document already recorded: {filename}")]
    Conflict { filename: String },

    /// The backing file exists but does not hold a valid table.
    #[error("metadata file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A thread panicked while holding the store lock.
    #[error("metadata store lock poisoned")]
    Poisoned,
}

impl MetadataError {
    /// Returns `true` if this is a filename uniqueness violation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Result alias for metadata store operations.
pub type MetadataResult<T> = Result<T, MetadataError>;
