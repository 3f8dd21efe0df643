use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::error::{StoreError, StoreResult};
use crate::resource::DocumentResource;

/// Prefix for in-flight temporary files inside the root.
const TEMP_PREFIX: &str = ".xmldoc-upload-";

/// Flat, directory-backed document store.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. Nothing touches the disk until
    /// [`init`](Self::init).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the root directory exists, creating parents as needed.
    pub fn init(&self) -> StoreResult<()> {
        debug!(root = %self.root.display(), "initialising file store");
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Init {
            root: self.root.clone(),
            source,
        })?;
        info!(root = %self.root.display(), "location for XML files");
        Ok(())
    }

    /// Path a document with this filename lives at.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Write `source` to `root/filename`, replacing any existing file.
    ///
    /// Content is staged in a temporary file in the root and renamed into
    /// place once fully written and synced.
    pub fn write<R: Read>(&self, filename: &str, mut source: R) -> StoreResult<PathBuf> {
        let target = self.path_for(filename);
        let write_err = |source: io::Error| StoreError::Write {
            filename: filename.to_string(),
            source,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.root)
            .map_err(write_err)?;
        io::copy(&mut source, &mut tmp).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&target).map_err(|e| write_err(e.error))?;

        info!(path = %target.display(), "saved file");
        Ok(target)
    }

    /// Write an in-memory document. See [`write`](Self::write).
    pub fn write_bytes(&self, filename: &str, content: &[u8]) -> StoreResult<PathBuf> {
        self.write(filename, content)
    }

    /// Returns `true` if a regular file with this name exists.
    pub fn exists(&self, filename: &str) -> bool {
        self.path_for(filename).is_file()
    }

    /// Locate a document and return a sized, readable handle to it.
    pub fn read_as_resource(&self, filename: &str) -> StoreResult<DocumentResource> {
        debug!(filename, "load file as resource");
        let path = self.path_for(filename);
        let not_found = || StoreError::NotFound(filename.to_string());

        let meta = fs::metadata(&path).map_err(|_| not_found())?;
        if !meta.is_file() {
            return Err(not_found());
        }
        // Unreadable files report NotFound here, not on a later read.
        File::open(&path).map_err(|_| not_found())?;

        Ok(DocumentResource::new(filename, path, meta.len()))
    }

    /// Remove a document. Failures are logged and otherwise ignored.
    pub fn delete(&self, filename: &str) {
        let path = self.path_for(filename);
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "deleted file"),
            Err(e) => error!(path = %path.display(), error = %e, "unable to delete file"),
        }
    }
}
