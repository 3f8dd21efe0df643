use xmldoc_metadata::MetadataError;
use xmldoc_store::StoreError;

/// A client-correctable reason an upload was refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Can only accept files with .xml extension: {filename}")]
    BadExtension { filename: String },

    #[error("Cannot save empty file: {filename}")]
    EmptyFile { filename: String },

    #[error("Potential directory traversal attack with file name: {filename}")]
    PathTraversal { filename: String },

    #[error("Note cannot be empty.")]
    NoteRequired,

    #[error("Note cannot be greater than {max} characters (got {length}).")]
    NoteTooLong { length: usize, max: usize },

    #[error("File already exists: {filename}")]
    AlreadyExists { filename: String },

    #[error("File contains invalid XML: {filename}")]
    InvalidXml { filename: String },
}

impl Rejection {
    /// Short, stable label for the rejection reason.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadExtension { .. } => "bad extension",
            Self::EmptyFile { .. } => "empty file",
            Self::PathTraversal { .. } => "path traversal",
            Self::NoteRequired => "note required",
            Self::NoteTooLong { .. } => "note too long",
            Self::AlreadyExists { .. } => "already exists",
            Self::InvalidXml { .. } => "invalid XML",
        }
    }
}

/// Errors from the storage orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The upload was refused; the client can correct and retry.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// No stored document has this filename.
    #[error("could not read file: {0}")]
    NotFound(String),

    /// File store failure (initialisation or I/O).
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Metadata store failure.
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),
}

impl ServiceError {
    /// `true` for errors caused by the request rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::NotFound(_))
    }

    /// The rejection, if this is one.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

/// Result alias for orchestrator operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
