use std::sync::Arc;

use tokio::net::TcpListener;
use xmldoc_service::XmlStorage;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// xmldoc HTTP server.
pub struct XmlDocServer {
    config: ServerConfig,
    storage: Arc<XmlStorage>,
}

impl XmlDocServer {
    /// Open the metadata backend and initialize the storage root.
    ///
    /// Initialization happens here, once, before any request is served.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let storage = config.open_shared_storage()?;
        Ok(Self { config, storage })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<XmlStorage> {
        &self.storage
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.storage.clone(), self.config.max_upload_bytes)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            root = %self.storage.root().display(),
            "xmldoc server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
