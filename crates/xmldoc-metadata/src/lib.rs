//! Metadata store for xmldoc.
//!
//! Maps store-assigned [`DocumentId`]s to `{filename, note, size}` records.
//! The store, not its callers, is the authority on whether a document with
//! a given filename exists: every backend rejects a second record for the
//! same filename with [`MetadataError::Conflict`], atomically with respect
//! to concurrent inserts.
//!
//! # Backends
//!
//! All backends implement the [`MetadataStore`] trait:
//!
//! - [`InMemoryMetadataStore`] -- lives and dies with the process; tests and embedding
//! - [`JsonFileMetadataStore`] -- durable single-file table, re-read under a file lock and rewritten atomically on change, safe to share between processes
//!
//! [`open`] builds either from a [`MetadataBackend`] configuration value.
//!
//! # Rules
//!
//! 1. IDs are monotonic and never reused, even after [`MetadataStore::delete_all`].
//! 2. Records are immutable; there is no update operation.
//! 3. Filenames are unique across all records.

pub mod config;
pub mod error;
pub mod json;
pub mod memory;
mod table;
pub mod traits;

pub use config::{open, MetadataBackend, DEFAULT_METADATA_FILE};
pub use error::{MetadataError, MetadataResult};
pub use json::JsonFileMetadataStore;
pub use memory::InMemoryMetadataStore;
pub use traits::MetadataStore;

pub use xmldoc_types::{DocumentId, DocumentMetadata, NewDocument};
