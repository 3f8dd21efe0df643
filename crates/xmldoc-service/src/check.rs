use xmldoc_types::{MAX_NOTE_CHARS, XML_EXTENSION};

use crate::error::Rejection;
use crate::filename::{has_traversal, sanitize_filename};

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// The parts of an upload the pre-write checks look at.
#[derive(Clone, Debug)]
pub struct Upload<'a> {
    /// Filename exactly as the client sent it.
    pub raw_filename: &'a str,
    /// Filename with any directory prefix removed.
    pub filename: String,
    /// Content length in bytes.
    pub content_len: u64,
    /// Free-text note.
    pub note: &'a str,
}

impl<'a> Upload<'a> {
    pub fn new(raw_filename: &'a str, content_len: u64, note: &'a str) -> Self {
        Self {
            raw_filename,
            filename: sanitize_filename(raw_filename),
            content_len,
            note,
        }
    }
}

// ---------------------------------------------------------------------------
// UploadCheck trait
// ---------------------------------------------------------------------------

/// A single pre-write check in the upload pipeline.
///
/// Checks are evaluated in order and the first rejection stops the upload.
/// They must not perform I/O.
pub trait UploadCheck: Send + Sync {
    /// Human-readable name of this check (e.g. "extension").
    fn name(&self) -> &str;

    /// Inspect the upload and either let it through or reject it.
    fn evaluate(&self, upload: &Upload<'_>) -> Result<(), Rejection>;
}

/// The standard pipeline: extension -> non-empty -> traversal -> note.
pub fn default_checks() -> Vec<Box<dyn UploadCheck>> {
    vec![
        Box::new(ExtensionCheck),
        Box::new(NonEmptyCheck),
        Box::new(TraversalCheck),
        Box::new(NoteCheck::default()),
    ]
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// The sanitized filename must end in `.xml`.
pub struct ExtensionCheck;

impl UploadCheck for ExtensionCheck {
    fn name(&self) -> &str {
        "extension"
    }

    fn evaluate(&self, upload: &Upload<'_>) -> Result<(), Rejection> {
        if upload.filename.ends_with(XML_EXTENSION) {
            Ok(())
        } else {
            Err(Rejection::BadExtension {
                filename: upload.filename.clone(),
            })
        }
    }
}

/// Content must not be empty.
pub struct NonEmptyCheck;

impl UploadCheck for NonEmptyCheck {
    fn name(&self) -> &str {
        "non-empty"
    }

    fn evaluate(&self, upload: &Upload<'_>) -> Result<(), Rejection> {
        if upload.content_len == 0 {
            return Err(Rejection::EmptyFile {
                filename: upload.filename.clone(),
            });
        }
        Ok(())
    }
}

/// The raw filename must not contain `..` or a path separator.
///
/// Runs on the raw name: sanitizing first would hide the attempt.
pub struct TraversalCheck;

impl UploadCheck for TraversalCheck {
    fn name(&self) -> &str {
        "path-traversal"
    }

    fn evaluate(&self, upload: &Upload<'_>) -> Result<(), Rejection> {
        if has_traversal(upload.raw_filename) {
            return Err(Rejection::PathTraversal {
                filename: upload.raw_filename.to_string(),
            });
        }
        Ok(())
    }
}

/// The note must be non-blank and no longer than `max_chars` characters.
pub struct NoteCheck {
    pub max_chars: usize,
}

impl Default for NoteCheck {
    fn default() -> Self {
        Self {
            max_chars: MAX_NOTE_CHARS,
        }
    }
}

impl UploadCheck for NoteCheck {
    fn name(&self) -> &str {
        "note"
    }

    fn evaluate(&self, upload: &Upload<'_>) -> Result<(), Rejection> {
        if upload.note.trim().is_empty() {
            return Err(Rejection::NoteRequired);
        }
        let length = upload.note.chars().count();
        if length > self.max_chars {
            return Err(Rejection::NoteTooLong {
                length,
                max: self.max_chars,
            });
        }
        Ok(())
    }
}
