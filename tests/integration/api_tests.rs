//! API integration tests for image retrieval and error handling.
//!
//! Tests verify:
//! - Resized JPEG and PNG responses, including aspect-ratio inference
//! - Error cases (unknown alias, assortment, size or extension, missing
//!   original, storage failure, corrupt original)
//! - HTTP response codes, headers and JSON error bodies

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use resize_streamer::error::IoError;
use resize_streamer::{create_router, RouterConfig};

use super::test_utils::{
    build_router, build_service, create_test_jpeg, create_test_png, image_dimensions,
    is_valid_jpeg, is_valid_png, MockObjectStore, BUCKET,
};

async fn get(router: &Router, uri: &str) -> axum::response::Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn assert_error(router: &Router, uri: &str, status: StatusCode, error: &str) {
    let response = get(router, uri).await;
    assert_eq!(response.status(), status, "unexpected status for {}", uri);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );

    let json = json_body(response).await;
    assert_eq!(json["error"], error);
    assert_eq!(json["status"], status.as_u16());
    assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()));
}

// =============================================================================
// Basic Retrieval
// =============================================================================

#[tokio::test]
async fn test_resize_jpeg_success() {
    let dir = TempDir::new().unwrap();
    let store =
        MockObjectStore::new().with_object(BUCKET, "user/42", create_test_png(80, 80, [255, 0, 0]));
    let router = build_router(store, dir.path()).await;

    let response = get(&router, "/images/avatar/user/42/large.jpg").await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get("content-type").unwrap(), "image/jpeg");
    assert_eq!(headers.get("cache-control").unwrap(), "public, max-age=3600");
    assert_eq!(headers.get("x-cache-hit").unwrap(), "false");

    let etag = headers.get("etag").unwrap().to_str().unwrap().to_string();
    assert!(etag.starts_with('"') && etag.ends_with('"'));
    assert_eq!(etag.len(), 64 + 2);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(is_valid_jpeg(&body), "Response should be a valid JPEG");
    assert_eq!(image_dimensions(&body), (40, 40));
}

#[tokio::test]
async fn test_resize_png_output() {
    let dir = TempDir::new().unwrap();
    let store = MockObjectStore::new().with_object(
        BUCKET,
        "user/42",
        create_test_jpeg(80, 80, [0, 128, 255]),
    );
    let router = build_router(store, dir.path()).await;

    let response = get(&router, "/images/avatar/user/42/large.png").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(is_valid_png(&body), "Response should be a valid PNG");
    assert_eq!(image_dimensions(&body), (40, 40));
}

#[tokio::test]
async fn test_extension_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let store =
        MockObjectStore::new().with_object(BUCKET, "photo", create_test_png(20, 20, [1, 2, 3]));
    let router = build_router(store, dir.path()).await;

    let response = get(&router, "/images/avatar/photo/large.JPEG").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/jpeg");
}

#[tokio::test]
async fn test_height_inferred_from_aspect_ratio() {
    let dir = TempDir::new().unwrap();
    let store =
        MockObjectStore::new().with_object(BUCKET, "tall", create_test_png(20, 40, [9, 9, 9]));
    let router = build_router(store, dir.path()).await;

    let response = get(&router, "/images/avatar/tall/thumbnail.png").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(image_dimensions(&body), (10, 20));
}

#[tokio::test]
async fn test_zero_size_keeps_original_dimensions() {
    let dir = TempDir::new().unwrap();
    let store =
        MockObjectStore::new().with_object(BUCKET, "wide", create_test_png(33, 17, [0, 0, 0]));
    let router = build_router(store, dir.path()).await;

    let response = get(&router, "/images/avatar/wide/original.png").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(image_dimensions(&body), (33, 17));
}

#[tokio::test]
async fn test_nested_object_key() {
    let dir = TempDir::new().unwrap();
    let store = MockObjectStore::new().with_object(
        BUCKET,
        "users/42/photos/profile",
        create_test_png(50, 50, [7, 7, 7]),
    );
    let router = build_router(store.clone(), dir.path()).await;

    let response = get(&router, "/images/avatar/users/42/photos/profile/large.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.fetch_count(), 1);
}

// =============================================================================
// Caching Headers
// =============================================================================

#[tokio::test]
async fn test_cache_hit_header() {
    let dir = TempDir::new().unwrap();
    let store =
        MockObjectStore::new().with_object(BUCKET, "user/42", create_test_png(80, 80, [0, 255, 0]));
    let router = build_router(store.clone(), dir.path()).await;

    let first = get(&router, "/images/avatar/user/42/large.jpg").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers().get("x-cache-hit").unwrap(), "false");
    let first_etag = first.headers().get("etag").unwrap().clone();
    let first_body = first.into_body().collect().await.unwrap().to_bytes();

    let second = get(&router, "/images/avatar/user/42/large.jpg").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers().get("x-cache-hit").unwrap(), "true");
    assert_eq!(second.headers().get("etag").unwrap(), &first_etag);
    let second_body = second.into_body().collect().await.unwrap().to_bytes();

    assert_eq!(first_body, second_body);
    assert_eq!(store.fetch_count(), 1, "Original should be fetched once");
}

#[tokio::test]
async fn test_distinct_variants_have_distinct_etags() {
    let dir = TempDir::new().unwrap();
    let store =
        MockObjectStore::new().with_object(BUCKET, "user/42", create_test_png(80, 80, [0, 0, 255]));
    let router = build_router(store, dir.path()).await;

    let jpg = get(&router, "/images/avatar/user/42/large.jpg").await;
    let png = get(&router, "/images/avatar/user/42/large.png").await;
    let thumb = get(&router, "/images/avatar/user/42/thumbnail.jpg").await;

    let jpg_etag = jpg.headers().get("etag").unwrap();
    let png_etag = png.headers().get("etag").unwrap();
    let thumb_etag = thumb.headers().get("etag").unwrap();
    assert_ne!(jpg_etag, png_etag);
    assert_ne!(jpg_etag, thumb_etag);
}

#[tokio::test]
async fn test_custom_cache_max_age() {
    let dir = TempDir::new().unwrap();
    let store =
        MockObjectStore::new().with_object(BUCKET, "user/42", create_test_png(8, 8, [1, 1, 1]));
    let service = build_service(store, dir.path(), 10).await;
    let router = create_router(
        service,
        RouterConfig::new()
            .with_cache_max_age(60)
            .with_tracing(false),
    );

    let response = get(&router, "/images/avatar/user/42/large.jpg").await;
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=60"
    );
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_bad_request_paths() {
    let dir = TempDir::new().unwrap();
    let store =
        MockObjectStore::new().with_object(BUCKET, "user/42", create_test_png(8, 8, [1, 1, 1]));
    let router = build_router(store.clone(), dir.path()).await;

    for uri in [
        "/videos/avatar/user/42/large.jpg",
        "/images/banner/user/42/large.jpg",
        "/images/avatar/user/42/huge.jpg",
        "/images/avatar/user/42/large.gif",
        "/images/avatar/large.jpg",
        "/images/avatar/user/42/large",
        "/images/avatar/user//large.jpg",
    ] {
        assert_error(&router, uri, StatusCode::BAD_REQUEST, "bad_request").await;
    }

    assert_eq!(store.fetch_count(), 0, "Bad requests must not hit storage");
}

#[tokio::test]
async fn test_missing_original() {
    let dir = TempDir::new().unwrap();
    let router = build_router(MockObjectStore::new(), dir.path()).await;

    assert_error(
        &router,
        "/images/avatar/nobody/large.jpg",
        StatusCode::NOT_FOUND,
        "not_found",
    )
    .await;
}

#[tokio::test]
async fn test_storage_failure() {
    let dir = TempDir::new().unwrap();
    let store = MockObjectStore::new().with_failure(
        BUCKET,
        "flaky",
        IoError::Connection("connection reset".to_string()),
    );
    let router = build_router(store, dir.path()).await;

    assert_error(
        &router,
        "/images/avatar/flaky/large.jpg",
        StatusCode::BAD_GATEWAY,
        "upstream_error",
    )
    .await;
}

#[tokio::test]
async fn test_corrupt_original() {
    let dir = TempDir::new().unwrap();
    let store = MockObjectStore::new().with_object(BUCKET, "broken", b"not an image".to_vec());
    let router = build_router(store, dir.path()).await;

    assert_error(
        &router,
        "/images/avatar/broken/large.jpg",
        StatusCode::INTERNAL_SERVER_ERROR,
        "decode_error",
    )
    .await;
}

#[tokio::test]
async fn test_errors_are_not_cached() {
    let dir = TempDir::new().unwrap();
    let store = MockObjectStore::new().with_object(BUCKET, "broken", b"garbage".to_vec());
    let router = build_router(store.clone(), dir.path()).await;

    let _ = get(&router, "/images/avatar/broken/large.jpg").await;
    let _ = get(&router, "/images/avatar/broken/large.jpg").await;

    assert_eq!(store.fetch_count(), 2);
}

// =============================================================================
// Health Check
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let router = build_router(MockObjectStore::new(), dir.path()).await;

    let response = get(&router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
