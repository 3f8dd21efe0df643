use serde::{Deserialize, Serialize};

use crate::id::DocumentId;

/// Metadata for a document about to be recorded.
///
/// This is what the upload pipeline hands to the metadata store; the store
/// assigns the [`DocumentId`] and returns a [`DocumentMetadata`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    /// Filename as supplied by the uploader.
    pub filename: String,
    /// Free-text description of the document.
    pub note: String,
    /// Length of the stored content in bytes.
    pub size: u64,
}

impl NewDocument {
    pub fn new(filename: impl Into<String>, note: impl Into<String>, size: u64) -> Self {
        Self {
            filename: filename.into(),
            note: note.into(),
            size,
        }
    }

    /// Attach a store-assigned ID.
    pub fn with_id(self, id: DocumentId) -> DocumentMetadata {
        DocumentMetadata {
            id,
            filename: self.filename,
            note: self.note,
            size: self.size,
        }
    }
}

/// A recorded document.
///
/// Records are immutable once created. Exactly one record exists per stored
/// file, keyed by `filename`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub id: DocumentId,
    pub filename: String,
    pub note: String,
    pub size: u64,
}
