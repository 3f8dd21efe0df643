use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fs4::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, error, info};
use xmldoc_types::{DocumentId, DocumentMetadata, NewDocument};

use crate::error::{MetadataError, MetadataResult};
use crate::table::{Snapshot, Table};
use crate::traits::MetadataStore;

/// Durable metadata store backed by a single JSON file.
///
/// The file is the only copy of the table. Every operation takes an
/// advisory lock on a sibling `.lock` file (shared for reads, exclusive for
/// writes), reads the table, and for writes replaces the file with a
/// temporary written in the same directory. Any number of handles, in this
/// process or others, can share one path: a filename recorded through one is
/// immediately visible to, and conflicts in, all the others.
///
/// The ID counter is stored alongside the records so IDs survive restarts
/// and purges.
///
/// On-disk format:
/// ```text
/// {"next_id": 3, "records": [{"id": 1, "filename": "a.xml", "note": "...", "size": 12}, ...]}
/// ```
pub struct JsonFileMetadataStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileMetadataStore {
    /// Open the table at `path`, starting empty if the file does not exist.
    ///
    /// Fails with [`MetadataError::Corrupt`] if the file holds something
    /// other than a valid table.
    pub fn open(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut lock_name = path.file_name().map(OsString::from).unwrap_or_default();
        lock_name.push(".lock");
        let store = Self {
            lock_path: path.with_file_name(lock_name),
            path,
        };

        let records = store.read(|table| table.len())?;
        info!(path = %store.path.display(), records, "opened metadata table");
        Ok(store)
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self, exclusive: bool) -> MetadataResult<File> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)?;
        if exclusive {
            file.lock_exclusive()?;
        } else {
            file.lock_shared()?;
        }
        Ok(file)
    }

    fn load(&self) -> MetadataResult<Table> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Table::default()),
            Err(e) => return Err(e.into()),
        };
        let snapshot: Snapshot =
            serde_json::from_slice(&bytes).map_err(|e| MetadataError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        Table::from_snapshot(snapshot).map_err(|reason| MetadataError::Corrupt {
            path: self.path.clone(),
            reason,
        })
    }

    /// Run `f` against the current table under a shared lock.
    fn read<T>(&self, f: impl FnOnce(&Table) -> T) -> MetadataResult<T> {
        let _lock = self.lock(false)?;
        Ok(f(&self.load()?))
    }

    /// Run `f` against the current table under an exclusive lock and write
    /// the result back. Nothing is written if `f` fails.
    fn update<T>(&self, f: impl FnOnce(&mut Table) -> MetadataResult<T>) -> MetadataResult<T> {
        let _lock = self.lock(true)?;
        let mut table = self.load()?;
        let out = f(&mut table)?;
        self.persist(&table)?;
        Ok(out)
    }

    fn persist(&self, table: &Table) -> MetadataResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, &table.to_snapshot())
                .map_err(|e| MetadataError::Serialization(e.to_string()))?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), records = table.len(), "persisted metadata table");
        Ok(())
    }
}

impl MetadataStore for JsonFileMetadataStore {
    fn insert(&self, document: NewDocument) -> MetadataResult<DocumentMetadata> {
        let filename = document.filename.clone();
        self.update(|table| table.insert(document))
            .inspect_err(|e| {
                if !e.is_conflict() {
                    error!(filename = %filename, error = %e, "failed to persist metadata insert");
                }
            })
    }

    fn find_by_filename(&self, filename: &str) -> MetadataResult<Option<DocumentMetadata>> {
        self.read(|table| table.find_by_filename(filename))
    }

    fn find_by_id(&self, id: DocumentId) -> MetadataResult<Option<DocumentMetadata>> {
        self.read(|table| table.find_by_id(id))
    }

    fn list_all(&self) -> MetadataResult<Vec<DocumentMetadata>> {
        self.read(Table::list)
    }

    fn delete_all(&self) -> MetadataResult<usize> {
        self.update(|table| Ok(table.clear()))
    }

    fn count(&self) -> MetadataResult<usize> {
        self.read(Table::len)
    }
}

impl std::fmt::Debug for JsonFileMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileMetadataStore")
            .field("path", &self.path)
            .finish()
    }
}
