//! Storage orchestrator for xmldoc.
//!
//! [`XmlStorage`] composes the file store, the metadata store and the
//! well-formedness validator into three operations:
//!
//! - [`XmlStorage::store`] -- check, write, validate, record
//! - [`XmlStorage::load`] -- fetch a stored document from the file store
//! - [`XmlStorage::list_files`] -- every recorded document
//!
//! # Upload pipeline
//!
//! `store` runs fail-fast, cheapest first:
//!
//! 1. [`ExtensionCheck`] -- sanitized name must end in `.xml`
//! 2. [`NonEmptyCheck`] -- content must not be empty
//! 3. [`TraversalCheck`] -- raw name must not contain `..` or a separator
//! 4. [`NoteCheck`] -- note must be non-blank and at most 200 characters
//! 5. duplicate check against the metadata store
//! 6. write to the file store
//! 7. well-formedness check of the written file (deleted on failure)
//! 8. metadata insert; a uniqueness conflict here is reported exactly like
//!    the duplicate check in step 5
//!
//! Steps 1-5 touch no files. A file that fails step 7 is never left on disk.

pub mod check;
pub mod error;
pub mod filename;
pub mod storage;

pub use check::{
    default_checks, ExtensionCheck, NonEmptyCheck, NoteCheck, TraversalCheck, Upload, UploadCheck,
};
pub use error::{Rejection, ServiceError, ServiceResult};
pub use filename::{has_traversal, sanitize_filename};
pub use storage::XmlStorage;

pub use xmldoc_store::DocumentResource;
pub use xmldoc_types::{DocumentId, DocumentMetadata};
