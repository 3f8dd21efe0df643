//! HTTP server for xmldoc.
//!
//! A thin adapter over [`xmldoc_service::XmlStorage`]:
//!
//! - `POST /xmldoc/add` -- multipart `file` + `note`, returns the metadata record
//! - `GET /xmldoc/get/{filename}` -- the stored bytes as an attachment
//! - `GET /xmldoc/list` -- every metadata record
//! - `GET /health`, `GET /info`

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{ServerConfig, StorageConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use server::XmlDocServer;
