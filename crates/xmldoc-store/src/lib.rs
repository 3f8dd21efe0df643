//! Directory-backed file store for xmldoc.
//!
//! A [`FileStore`] maps a filename to a file directly under a single root
//! directory. The layout is flat: one file per document, no subdirectories.
//!
//! The store is deliberately mechanical. It does not check path safety
//! (callers pass names that are already sanitized) and it does not know
//! about metadata. Writes replace any existing file of the same name.
//!
//! # Design Rules
//!
//! 1. [`FileStore::init`] must succeed before any other call; failure is fatal.
//! 2. Writes land in a temporary file first and are renamed into place, so a
//!    reader never sees a partially written document.
//! 3. [`FileStore::delete`] is best effort: failures are logged, never returned.
//! 4. A missing or unreadable file is always reported as [`StoreError::NotFound`].

pub mod error;
pub mod fs;
pub mod resource;

pub use error::{StoreError, StoreResult};
pub use fs::FileStore;
pub use resource::DocumentResource;
