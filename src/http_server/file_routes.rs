//! File HTTP Routes
//!
//! - `PUT    /{identifier}/{filename}?expires={tag}` store the request body
//! - `GET    /{identifier}/{filename}` download (local) or redirect (object store)
//! - `PUT    /copy/{source}/{destination}/{filename}?expires={tag}` copy a file
//! - `DELETE /{identifier}/{filename}` delete one file, always 200
//! - `DELETE /{identifier}` delete every file of an identifier, always 200

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::file_storage::address::attachment_disposition;
use crate::file_storage::{AccessHandle, ExpiryTag, FileService, StorageError};

// ==================
// Shared State
// ==================

/// File state shared across handlers
pub struct FileState {
    pub file_service: FileService,
}

impl FileState {
    pub fn new(file_service: FileService) -> Self {
        Self { file_service }
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Default, Deserialize)]
pub struct ExpiresQuery {
    #[serde(default)]
    pub expires: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

// ==================
// File Routes
// ==================

/// Create file routes
pub fn file_routes(state: Arc<FileState>) -> Router {
    Router::new()
        .route("/copy/{source}/{destination}/{filename}", put(copy_file_handler))
        .route(
            "/{identifier}/{filename}",
            put(put_file_handler)
                .get(get_file_handler)
                .delete(delete_file_handler),
        )
        .route("/{identifier}", delete(delete_files_handler))
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

/// Status-only error body; medium details stay in the logs.
fn error_response(status: StatusCode) -> Response {
    let body = ErrorResponse {
        error: status
            .canonical_reason()
            .unwrap_or("error")
            .to_lowercase(),
        code: status.as_u16(),
    };
    (status, Json(body)).into_response()
}

fn parse_expires(query: &ExpiresQuery) -> Result<Option<ExpiryTag>, Response> {
    ExpiryTag::parse_optional(query.expires.as_deref()).map_err(|e| {
        tracing::debug!(error = %e, "rejected expires parameter");
        error_response(StatusCode::BAD_REQUEST)
    })
}

/// Declared body size, falling back to the received length.
fn declared_size(headers: &HeaderMap, body: &Bytes) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(body.len() as u64)
}

fn log_failure(operation: &str, error: &StorageError) {
    match error {
        StorageError::InvalidParameters(_) | StorageError::NotFound(_) => {
            tracing::trace!(operation, error = %error, "request rejected")
        }
        _ => tracing::warn!(operation, error = %error, "storage failure"),
    }
}

// ==================
// File Handlers
// ==================

async fn put_file_handler(
    State(state): State<Arc<FileState>>,
    Path((identifier, filename)): Path<(String, String)>,
    Query(query): Query<ExpiresQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let expires = match parse_expires(&query) {
        Ok(expires) => expires,
        Err(response) => return response,
    };
    let size = declared_size(&headers, &body);

    match state
        .file_service
        .put(&identifier, &filename, size, expires, &body)
        .await
    {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            log_failure("put", &e);
            match e {
                StorageError::InvalidParameters(_) => error_response(StatusCode::BAD_REQUEST),
                _ => error_response(StatusCode::INTERNAL_SERVER_ERROR),
            }
        }
    }
}

async fn get_file_handler(
    State(state): State<Arc<FileState>>,
    Path((identifier, filename)): Path<(String, String)>,
) -> Response {
    let handle = match state.file_service.get(&identifier, &filename).await {
        Ok(handle) => handle,
        Err(e) => {
            log_failure("get", &e);
            return error_response(StatusCode::NOT_FOUND);
        }
    };

    match handle {
        AccessHandle::Path(path) => {
            let data = match tokio::fs::read(&path).await {
                Ok(data) => data,
                Err(e) => {
                    log_failure("get", &StorageError::from_io(e, &path.to_string_lossy()));
                    return error_response(StatusCode::NOT_FOUND);
                }
            };
            let disposition = HeaderValue::from_bytes(attachment_disposition(&filename).as_bytes())
                .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

            let mut response_headers = HeaderMap::new();
            response_headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            );
            response_headers.insert(header::CONTENT_DISPOSITION, disposition);

            (StatusCode::OK, response_headers, Bytes::from(data)).into_response()
        }
        AccessHandle::Url(url) => match HeaderValue::from_str(&url) {
            Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            Err(_) => {
                tracing::warn!(identifier = %identifier, "presigned url is not a valid header");
                error_response(StatusCode::NOT_FOUND)
            }
        },
    }
}

async fn copy_file_handler(
    State(state): State<Arc<FileState>>,
    Path((source, destination, filename)): Path<(String, String, String)>,
    Query(query): Query<ExpiresQuery>,
) -> Response {
    let expires = match parse_expires(&query) {
        Ok(expires) => expires,
        Err(response) => return response,
    };

    match state
        .file_service
        .copy(&source, &destination, &filename, expires)
        .await
    {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            log_failure("copy", &e);
            match e {
                StorageError::InvalidParameters(_) => error_response(StatusCode::BAD_REQUEST),
                StorageError::NotFound(_) | StorageError::IdentifierNotFound(_) => {
                    error_response(StatusCode::NOT_FOUND)
                }
                _ => error_response(StatusCode::INTERNAL_SERVER_ERROR),
            }
        }
    }
}

/// Deletes are best-effort: the outcome is logged by the service and the
/// caller always gets 200.
async fn delete_file_handler(
    State(state): State<Arc<FileState>>,
    Path((identifier, filename)): Path<(String, String)>,
) -> StatusCode {
    state.file_service.delete(&identifier, &filename).await;
    StatusCode::OK
}

async fn delete_files_handler(
    State(state): State<Arc<FileState>>,
    Path(identifier): Path<String>,
) -> StatusCode {
    state.file_service.delete_all(&identifier).await;
    StatusCode::OK
}
