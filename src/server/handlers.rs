//! HTTP request handlers for the Resize Streamer API.
//!
//! # Endpoints
//!
//! - `GET /{alias}/{assortment}/{object_key...}/{size}.{ext}` - Serve a resized image
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::DEFAULT_CACHE_MAX_AGE;
use crate::error::{ErrorKind, ServeError};
use crate::io::ObjectStore;
use crate::resize::{Codec, ImageCodec};
use crate::service::ResizeService;

/// Header reporting whether the variant was served from the disk cache.
pub const CACHE_HIT_HEADER: &str = "x-cache-hit";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the resize service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: ObjectStore, C: Codec = ImageCodec> {
    /// The service resolving and producing variants
    pub service: Arc<ResizeService<S, C>>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,
}

impl<S: ObjectStore, C: Codec> AppState<S, C> {
    /// Create a new application state with the default max-age.
    pub fn new(service: ResizeService<S, C>) -> Self {
        Self::with_cache_max_age(service, DEFAULT_CACHE_MAX_AGE)
    }

    /// Create a new application state with custom cache max-age.
    pub fn with_cache_max_age(service: ResizeService<S, C>, cache_max_age: u32) -> Self {
        Self {
            service: Arc::new(service),
            cache_max_age,
        }
    }
}

impl<S: ObjectStore, C: Codec> Clone for AppState<S, C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "bad_request")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Handling
// =============================================================================

impl ErrorKind {
    /// HTTP status and error identifier for this kind.
    pub fn status(self) -> (StatusCode, &'static str) {
        match self {
            ErrorKind::BadRequest => (StatusCode::BAD_REQUEST, "bad_request"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            ErrorKind::UpstreamError => (StatusCode::BAD_GATEWAY, "upstream_error"),
            ErrorKind::DecodeError => (StatusCode::INTERNAL_SERVER_ERROR, "decode_error"),
            ErrorKind::EncodeError => (StatusCode::INTERNAL_SERVER_ERROR, "encode_error"),
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.kind().status();
        let message = self.to_string();

        // Log errors based on severity
        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle resized image requests.
///
/// # Endpoint
///
/// `GET /{alias}/{assortment}/{object_key...}/{size}.{ext}`
///
/// # Response Headers
///
/// - `Content-Type`: `image/jpeg` or `image/png`
/// - `Cache-Control`: `public, max-age={cache_max_age}`
/// - `ETag`: quoted hex cache key of the variant
/// - `X-Cache-Hit`: `true` if served from the disk cache
///
/// # Errors
///
/// - `400 Bad Request`: path does not resolve against the catalog
/// - `404 Not Found`: original object does not exist
/// - `502 Bad Gateway`: object storage failure
/// - `500 Internal Server Error`: decode or encode failure
pub async fn image_handler<S, C>(
    State(state): State<AppState<S, C>>,
    Path(path): Path<String>,
) -> Result<Response, ServeError>
where
    S: ObjectStore,
    C: Codec + 'static,
{
    let response = state.service.serve(&path).await?;

    let headers = [
        (header::CONTENT_TYPE, response.content_type.to_string()),
        (
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.cache_max_age),
        ),
        (header::ETAG, format!("\"{}\"", response.cache_key.to_hex())),
        (
            HeaderName::from_static(CACHE_HIT_HEADER),
            response.cache_hit.to_string(),
        ),
    ];

    Ok((StatusCode::OK, headers, response.data).into_response())
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
