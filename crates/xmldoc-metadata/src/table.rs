use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use xmldoc_types::{DocumentId, DocumentMetadata, NewDocument};

use crate::error::{MetadataError, MetadataResult};

/// The record table shared by every backend.
///
/// Holds records ordered by ID, a filename index, and the next ID to hand
/// out. Callers provide the locking.
#[derive(Debug)]
pub(crate) struct Table {
    records: BTreeMap<DocumentId, DocumentMetadata>,
    by_filename: HashMap<String, DocumentId>,
    next_id: DocumentId,
}

/// On-disk form of a [`Table`].
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    pub next_id: DocumentId,
    pub records: Vec<DocumentMetadata>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            by_filename: HashMap::new(),
            next_id: DocumentId::FIRST,
        }
    }
}

impl Table {
    pub fn insert(&mut self, document: NewDocument) -> MetadataResult<DocumentMetadata> {
        if self.by_filename.contains_key(&document.filename) {
            return Err(MetadataError::Conflict {
                filename: document.filename,
            });
        }
        let id = self.next_id;
        self.next_id = id.next();
        let record = document.with_id(id);
        self.by_filename.insert(record.filename.clone(), id);
        self.records.insert(id, record.clone());
        Ok(record)
    }

    pub fn find_by_filename(&self, filename: &str) -> Option<DocumentMetadata> {
        self.by_filename
            .get(filename)
            .and_then(|id| self.records.get(id))
            .cloned()
    }

    pub fn find_by_id(&self, id: DocumentId) -> Option<DocumentMetadata> {
        self.records.get(&id).cloned()
    }

    pub fn list(&self) -> Vec<DocumentMetadata> {
        self.records.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Drop all records, keeping the ID counter.
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        self.by_filename.clear();
        removed
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            next_id: self.next_id,
            records: self.list(),
        }
    }

    /// Rebuild a table from its snapshot, rejecting inconsistent data.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, String> {
        let mut table = Table {
            next_id: snapshot.next_id,
            ..Default::default()
        };
        for record in snapshot.records {
            if record.id >= snapshot.next_id {
                return Err(format!(
                    "record {} is not below next_id {}",
                    record.id, snapshot.next_id
                ));
            }
            if table.by_filename.contains_key(&record.filename) {
                return Err(format!("duplicate filename {}", record.filename));
            }
            if table.records.contains_key(&record.id) {
                return Err(format!("duplicate id {}", record.id));
            }
            table.by_filename.insert(record.filename.clone(), record.id);
            table.records.insert(record.id, record);
        }
        Ok(table)
    }
}
