use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use xmldoc_metadata::{MetadataStore, NewDocument};
use xmldoc_store::{DocumentResource, FileStore, StoreError};
use xmldoc_types::DocumentMetadata;
use xmldoc_validate::XmlValidator;

use crate::check::{default_checks, Upload, UploadCheck};
use crate::error::{Rejection, ServiceError, ServiceResult};
use crate::filename::has_traversal;

/// Stores and retrieves XML documents.
///
/// Owns the ordering of the upload pipeline and the cleanup of files that
/// fail validation. The file store and the metadata store know nothing of
/// each other; only this type sequences them.
pub struct XmlStorage {
    files: FileStore,
    metadata: Arc<dyn MetadataStore>,
    validator: XmlValidator,
    checks: Vec<Box<dyn UploadCheck>>,
}

impl XmlStorage {
    /// Create an orchestrator with the default upload checks.
    ///
    /// Call [`init`](Self::init) once before serving any request.
    pub fn new(files: FileStore, metadata: Arc<dyn MetadataStore>) -> Self {
        Self {
            files,
            metadata,
            validator: XmlValidator::new(),
            checks: default_checks(),
        }
    }

    /// Shorthand for a file store rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self::new(FileStore::new(root), metadata)
    }

    /// Append a check to the end of the pre-write pipeline.
    pub fn add_check(&mut self, check: Box<dyn UploadCheck>) {
        self.checks.push(check);
    }

    /// Create the storage root. Failure here is fatal to startup.
    pub fn init(&self) -> ServiceResult<()> {
        self.files.init()?;
        Ok(())
    }

    /// The file-store root directory.
    pub fn root(&self) -> &Path {
        self.files.root()
    }

    /// The metadata store backing this orchestrator.
    pub fn metadata_store(&self) -> &Arc<dyn MetadataStore> {
        &self.metadata
    }

    /// Validate and persist an uploaded document, returning its record.
    pub fn store(
        &self,
        content: &[u8],
        original_filename: &str,
        note: &str,
    ) -> ServiceResult<DocumentMetadata> {
        let upload = Upload::new(original_filename, content.len() as u64, note);
        debug!(filename = %upload.filename, size = upload.content_len, "trying to save file");

        for check in &self.checks {
            if let Err(rejection) = check.evaluate(&upload) {
                debug!(check = check.name(), reason = %rejection, "upload rejected");
                return Err(rejection.into());
            }
        }

        // Fast path only; the metadata insert below is the real gate.
        if self.metadata.find_by_filename(original_filename)?.is_some() {
            return Err(Rejection::AlreadyExists {
                filename: upload.filename,
            }
            .into());
        }

        let path = self.files.write_bytes(&upload.filename, content)?;

        debug!(path = %path.display(), "validating file");
        if !self.validator.is_well_formed_file(&path) {
            self.files.delete(&upload.filename);
            return Err(Rejection::InvalidXml {
                filename: upload.filename,
            }
            .into());
        }

        let document = NewDocument::new(original_filename, note, upload.content_len);
        match self.metadata.insert(document) {
            Ok(record) => {
                info!(id = %record.id, filename = %record.filename, size = record.size, "stored document");
                Ok(record)
            }
            Err(e) if e.is_conflict() => {
                // Lost a race with a concurrent upload of the same name.
                // The file on disk is left in place.
                warn!(filename = %upload.filename, "duplicate detected at metadata insert");
                Err(Rejection::AlreadyExists {
                    filename: upload.filename,
                }
                .into())
            }
            Err(e) => {
                error!(
                    filename = %upload.filename,
                    error = %e,
                    "metadata insert failed; file is stored but unrecorded"
                );
                Err(e.into())
            }
        }
    }

    /// Fetch a stored document by filename.
    ///
    /// Consults only the file store, so a file written without a metadata
    /// record is still retrievable.
    pub fn load(&self, filename: &str) -> ServiceResult<DocumentResource> {
        debug!(filename, "load file");
        if filename.is_empty() || has_traversal(filename) {
            return Err(ServiceError::NotFound(filename.to_string()));
        }
        self.files.read_as_resource(filename).map_err(|e| match e {
            StoreError::NotFound(name) => ServiceError::NotFound(name),
            other => other.into(),
        })
    }

    /// All recorded documents. Order is not guaranteed.
    pub fn list_files(&self) -> ServiceResult<Vec<DocumentMetadata>> {
        debug!("listing files");
        Ok(self.metadata.list_all()?)
    }
}

impl std::fmt::Debug for XmlStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let checks: Vec<&str> = self.checks.iter().map(|c| c.name()).collect();
        f.debug_struct("XmlStorage")
            .field("root", &self.files.root())
            .field("checks", &checks)
            .finish()
    }
}
