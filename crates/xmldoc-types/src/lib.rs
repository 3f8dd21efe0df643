//! Foundation types for xmldoc.
//!
//! Every other xmldoc crate depends on `xmldoc-types`. It carries the
//! metadata record kept for each stored XML document and the limits that
//! the upload pipeline enforces.
//!
//! # Key Types
//!
//! - [`DocumentId`]: Store-assigned numeric identifier, monotonic and never reused
//! - [`NewDocument`]: Metadata for a document that has not been recorded yet
//! - [`DocumentMetadata`]: A recorded document: ID, filename, note, size

pub mod document;
pub mod id;

pub use document::{DocumentMetadata, NewDocument};
pub use id::DocumentId;

/// The only file extension accepted for uploads.
pub const XML_EXTENSION: &str = ".xml";

/// Maximum length of a document note, in characters.
pub const MAX_NOTE_CHARS: usize = 200;
