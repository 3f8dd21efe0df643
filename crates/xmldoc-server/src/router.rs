use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, SharedStorage};

/// Build the application router over a shared storage service.
pub fn build_router(storage: SharedStorage, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handler::health_handler))
        .route("/info", get(handler::info_handler))
        .route("/xmldoc/add", post(handler::add_handler))
        .route("/xmldoc/get/:filename", get(handler::get_handler))
        .route("/xmldoc/list", get(handler::list_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(storage)
}
