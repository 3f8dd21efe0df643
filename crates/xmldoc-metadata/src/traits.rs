use xmldoc_types::{DocumentId, DocumentMetadata, NewDocument};

use crate::error::MetadataResult;

/// Storage backend for document metadata records.
///
/// All implementations must satisfy these invariants:
/// - `insert` checks filename uniqueness and stores the record as one atomic
///   step. Two racing inserts for the same filename yield exactly one
///   success and one [`MetadataError::Conflict`](crate::MetadataError::Conflict).
/// - IDs are assigned monotonically and never reused.
/// - Records are never modified after insertion.
pub trait MetadataStore: Send + Sync {
    /// Record a new document and return it with its assigned ID.
    fn insert(&self, document: NewDocument) -> MetadataResult<DocumentMetadata>;

    /// Look up the record for `filename`, if any.
    fn find_by_filename(&self, filename: &str) -> MetadataResult<Option<DocumentMetadata>>;

    /// Look up a record by ID.
    fn find_by_id(&self, id: DocumentId) -> MetadataResult<Option<DocumentMetadata>>;

    /// All records. Ordering is not part of the contract.
    fn list_all(&self) -> MetadataResult<Vec<DocumentMetadata>>;

    /// Remove every record and return how many were removed.
    ///
    /// Administrative reset only. ID assignment continues from where it was.
    fn delete_all(&self) -> MetadataResult<usize>;

    /// Number of records.
    fn count(&self) -> MetadataResult<usize> {
        Ok(self.list_all()?.len())
    }
}
