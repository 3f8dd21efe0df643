use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::StoreResult;

/// A readable handle to a stored document.
///
/// Produced by [`FileStore::read_as_resource`](crate::FileStore::read_as_resource)
/// once the file is known to exist. The size is captured at lookup time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentResource {
    filename: String,
    path: PathBuf,
    size: u64,
}

impl DocumentResource {
    pub(crate) fn new(filename: impl Into<String>, path: PathBuf, size: u64) -> Self {
        Self {
            filename: filename.into(),
            path,
            size,
        }
    }

    /// The document's filename within the store.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Absolute or root-relative path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes when the resource was located.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Open the document for streaming reads.
    pub fn open(&self) -> StoreResult<File> {
        Ok(File::open(&self.path)?)
    }

    /// Read the whole document into memory.
    pub fn read_bytes(&self) -> StoreResult<Vec<u8>> {
        let mut file = self.open()?;
        let mut bytes = Vec::with_capacity(self.size as usize);
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}
