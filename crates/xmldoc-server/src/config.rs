use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use xmldoc_metadata::MetadataBackend;
use xmldoc_service::XmlStorage;

use crate::error::{ServerError, ServerResult};

/// Default storage root, relative to the working directory.
pub const DEFAULT_STORAGE_LOCATION: &str = "upload-dir";

/// Default upload ceiling (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Server settings, read from TOML. Every field is optional.
///
/// ```toml
/// bind_addr = "0.0.0.0:8080"
/// max_upload_bytes = 10485760
///
/// [storage]
/// location = "/srv/xmldoc/upload-dir"
///
/// [metadata]
/// backend = "json"
/// path = "/srv/xmldoc/xmldoc-metadata.json"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
    /// Where document files live.
    pub storage: StorageConfig,
    /// Where metadata records live.
    pub metadata: MetadataBackend,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            storage: StorageConfig::default(),
            metadata: MetadataBackend::default(),
        }
    }
}

impl ServerConfig {
    /// Parse settings from a TOML document.
    pub fn from_toml_str(input: &str) -> ServerResult<Self> {
        toml::from_str(input).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read and parse the TOML file at `path`.
    pub fn from_toml_file(path: &Path) -> ServerResult<Self> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&input)
    }

    /// Open the configured metadata backend and build an initialized storage service.
    pub fn open_storage(&self) -> ServerResult<XmlStorage> {
        let metadata = xmldoc_metadata::open(&self.metadata)?;
        let storage = XmlStorage::with_root(self.storage.location.clone(), metadata);
        storage.init()?;
        Ok(storage)
    }

    pub(crate) fn open_shared_storage(&self) -> ServerResult<Arc<XmlStorage>> {
        self.open_storage().map(Arc::new)
    }
}

/// File store settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding uploaded documents.
    pub location: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            location: PathBuf::from(DEFAULT_STORAGE_LOCATION),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(c.storage.location, PathBuf::from("upload-dir"));
        assert!(matches!(c.metadata, MetadataBackend::Json { .. }));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:9000"

            [storage]
            location = "/srv/xml"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.storage.location, PathBuf::from("/srv/xml"));
        assert_eq!(c.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn full_example_parses() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:8080"
            max_upload_bytes = 10485760

            [storage]
            location = "/srv/xmldoc/upload-dir"

            [metadata]
            backend = "json"
            path = "/srv/xmldoc/xmldoc-metadata.json"
            "#,
        )
        .unwrap();
        assert_eq!(c.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(
            c.metadata,
            MetadataBackend::Json {
                path: PathBuf::from("/srv/xmldoc/xmldoc-metadata.json")
            }
        );
    }

    #[test]
    fn metadata_backend_from_toml() {
        let c = ServerConfig::from_toml_str(
            r#"
            [metadata]
            backend = "memory"
            "#,
        )
        .unwrap();
        assert_eq!(c.metadata, MetadataBackend::Memory);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = ServerConfig::from_toml_str("bind_addr = 12").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = ServerConfig::from_toml_file(Path::new("/nonexistent/xmldoc.toml")).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn open_storage_creates_root() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig {
            storage: StorageConfig {
                location: dir.path().join("nested/upload-dir"),
            },
            metadata: MetadataBackend::Json {
                path: dir.path().join("meta.json"),
            },
            ..ServerConfig::default()
        };
        let storage = config.open_storage().unwrap();
        assert!(storage.root().is_dir());
        assert!(storage.list_files().unwrap().is_empty());
    }
}
