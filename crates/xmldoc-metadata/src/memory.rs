use std::sync::RwLock;

use xmldoc_types::{DocumentId, DocumentMetadata, NewDocument};

use crate::error::{MetadataError, MetadataResult};
use crate::table::Table;
use crate::traits::MetadataStore;

/// In-memory metadata store.
///
/// All records live behind a `RwLock` and are lost when the store is
/// dropped. Uniqueness check and insert run under one write lock.
pub struct InMemoryMetadataStore {
    table: RwLock<Table>,
}

impl InMemoryMetadataStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
        }
    }
}

impl Default for InMemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn insert(&self, document: NewDocument) -> MetadataResult<DocumentMetadata> {
        let mut table = self.table.write().map_err(|_| MetadataError::Poisoned)?;
        table.insert(document)
    }

    fn find_by_filename(&self, filename: &str) -> MetadataResult<Option<DocumentMetadata>> {
        let table = self.table.read().map_err(|_| MetadataError::Poisoned)?;
        Ok(table.find_by_filename(filename))
    }

    fn find_by_id(&self, id: DocumentId) -> MetadataResult<Option<DocumentMetadata>> {
        let table = self.table.read().map_err(|_| MetadataError::Poisoned)?;
        Ok(table.find_by_id(id))
    }

    fn list_all(&self) -> MetadataResult<Vec<DocumentMetadata>> {
        let table = self.table.read().map_err(|_| MetadataError::Poisoned)?;
        Ok(table.list())
    }

    fn delete_all(&self) -> MetadataResult<usize> {
        let mut table = self.table.write().map_err(|_| MetadataError::Poisoned)?;
        Ok(table.clear())
    }

    fn count(&self) -> MetadataResult<usize> {
        let table = self.table.read().map_err(|_| MetadataError::Poisoned)?;
        Ok(table.len())
    }
}

impl std::fmt::Debug for InMemoryMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.count().unwrap_or_default();
        f.debug_struct("InMemoryMetadataStore")
            .field("record_count", &count)
            .finish()
    }
}
