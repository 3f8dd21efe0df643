use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::debug;
use xmldoc_service::{ServiceResult, XmlStorage};
use xmldoc_types::DocumentMetadata;

use crate::error::ApiError;

/// Shared handle to the storage service.
pub type SharedStorage = Arc<XmlStorage>;

/// Health check endpoint.
pub async fn health_handler() -> Json<Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

/// Server info endpoint.
pub async fn info_handler() -> Json<Value> {
    Json(json!({
        "name": "xmldoc-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /xmldoc/add` with multipart fields `file` and `note`.
pub async fn add_handler(
    State(storage): State<SharedStorage>,
    mut multipart: Multipart,
) -> Result<Json<DocumentMetadata>, ApiError> {
    let mut file = None;
    let mut note = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await.map_err(bad_multipart)?;
                file = Some((filename, content));
            }
            "note" => note = Some(field.text().await.map_err(bad_multipart)?),
            other => debug!(field = other, "ignoring multipart field"),
        }
    }

    let (filename, content) =
        file.ok_or_else(|| ApiError::BadRequest("File must be supplied.".into()))?;
    let note = note.unwrap_or_default();
    debug!(filename = %filename, size = content.len(), "attempting to add XML document");

    let record = run_blocking(move || storage.store(&content, &filename, &note)).await?;
    Ok(Json(record))
}

/// `GET /xmldoc/get/{filename}`: the stored bytes as an attachment.
pub async fn get_handler(
    State(storage): State<SharedStorage>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let (name, bytes) = run_blocking(move || {
        let resource = storage.load(&filename)?;
        let bytes = resource.read_bytes()?;
        Ok((resource.filename().to_string(), bytes))
    })
    .await?;

    let headers = [
        (header::CONTENT_TYPE, "application/xml".to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(&name)),
    ];
    Ok((headers, bytes).into_response())
}

/// `GET /xmldoc/list`
pub async fn list_handler(
    State(storage): State<SharedStorage>,
) -> Result<Json<Vec<DocumentMetadata>>, ApiError> {
    let records = run_blocking(move || storage.list_files()).await?;
    Ok(Json(records))
}

/// Storage work touches the filesystem; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
        .map_err(ApiError::from)
}

/// `attachment` disposition for `name`.
///
/// Plain printable ASCII names are sent as a quoted `filename`. Anything
/// else also gets an RFC 6266 `filename*` parameter and a quoted-string
/// fallback with `"` and `\\` escaped and other characters replaced by `_`.
pub fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect();
    if fallback == name && !name.contains(['"', '\\']) {
        return format!("attachment; filename=\"{name}\"");
    }

    let quoted = fallback.replace('\\', "\\\\").replace('"', "\\\"");
    let mut encoded = String::with_capacity(name.len() * 3);
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename=\"{quoted}\"; filename*=UTF-8''{encoded}")
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(err.body_text())
}
