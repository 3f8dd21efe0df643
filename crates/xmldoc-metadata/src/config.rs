use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::MetadataResult;
use crate::json::JsonFileMetadataStore;
use crate::memory::InMemoryMetadataStore;
use crate::traits::MetadataStore;

/// Default file name for the durable metadata table.
pub const DEFAULT_METADATA_FILE: &str = "xmldoc-metadata.json";

/// Which metadata backend to use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum MetadataBackend {
    /// Records are kept in process memory only.
    Memory,
    /// Records are kept in a JSON file at `path`.
    Json { path: PathBuf },
}

impl Default for MetadataBackend {
    fn default() -> Self {
        Self::Json {
            path: PathBuf::from(DEFAULT_METADATA_FILE),
        }
    }
}

/// Create a metadata store from configuration.
pub fn open(backend: &MetadataBackend) -> MetadataResult<Arc<dyn MetadataStore>> {
    match backend {
        MetadataBackend::Memory => Ok(Arc::new(InMemoryMetadataStore::new())),
        MetadataBackend::Json { path } => Ok(Arc::new(JsonFileMetadataStore::open(path)?)),
    }
}
