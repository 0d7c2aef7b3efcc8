//! Test utilities for integration tests.
//!
//! This module provides an in-memory object store with request tracking and
//! helpers for building test images, services and routers.

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, Rgb, RgbImage};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use resize_streamer::error::IoError;
use resize_streamer::{
    create_router, CacheStore, Catalog, DescriptorResolver, ObjectStore, ResizeService,
    RouterConfig,
};

// =============================================================================
// Mock Object Store
// =============================================================================

/// An in-memory object store that counts fetches.
///
/// Clones share the object table and the counter, so a test can keep a handle
/// after moving the store into a service.
#[derive(Clone, Default)]
pub struct MockObjectStore {
    objects: Arc<HashMap<(String, String), Result<Bytes, IoError>>>,
    fetch_count: Arc<AtomicUsize>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, bucket: &str, key: &str, data: Vec<u8>) -> Self {
        self.with_result(bucket, key, Ok(Bytes::from(data)))
    }

    pub fn with_failure(self, bucket: &str, key: &str, err: IoError) -> Self {
        self.with_result(bucket, key, Err(err))
    }

    fn with_result(self, bucket: &str, key: &str, result: Result<Bytes, IoError>) -> Self {
        let mut objects = Arc::try_unwrap(self.objects).unwrap_or_else(|arc| (*arc).clone());
        objects.insert((bucket.to_string(), key.to_string()), result);
        Self {
            objects: Arc::new(objects),
            fetch_count: self.fetch_count,
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes, IoError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        match self.objects.get(&(bucket.to_string(), key.to_string())) {
            Some(result) => result.clone(),
            None => Err(IoError::NotFound(format!("s3://{}/{}", bucket, key))),
        }
    }
}

// =============================================================================
// Test Images
// =============================================================================

/// Bucket alias used by [`test_catalog`].
pub const ALIAS: &str = "images";

/// Bucket behind [`ALIAS`].
pub const BUCKET: &str = "bucket-1";

/// Catalog with one alias and an `avatar` assortment.
///
/// - `large`: 40x40
/// - `thumbnail`: 10x0 (height inferred)
/// - `original`: 0x0 (no resize)
pub fn test_catalog() -> Catalog {
    Catalog::new()
        .with_bucket(ALIAS, BUCKET)
        .with_size("avatar", "large", "40x40")
        .with_size("avatar", "thumbnail", "10x0")
        .with_size("avatar", "original", "0x0")
}

/// Create a solid-color RGB image.
pub fn solid_image(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

/// Encode a solid-color image as PNG.
pub fn create_test_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = solid_image(width, height, color);
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Encode a solid-color image as JPEG.
pub fn create_test_jpeg(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = solid_image(width, height, color);
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 95)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Check if data is a valid JPEG (SOI ... EOI).
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 4
        && data[0] == 0xFF
        && data[1] == 0xD8
        && data[data.len() - 2] == 0xFF
        && data[data.len() - 1] == 0xD9
}

/// Check if data starts with the PNG signature.
pub fn is_valid_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'])
}

/// Decode response bytes and return their dimensions.
pub fn image_dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data).unwrap();
    (img.width(), img.height())
}

// =============================================================================
// Service and Router Builders
// =============================================================================

/// Build a service over `store` with a cache in `cache_dir`.
pub async fn build_service(
    store: MockObjectStore,
    cache_dir: &Path,
    max_files: usize,
) -> ResizeService<MockObjectStore> {
    let cache = CacheStore::open(cache_dir, max_files).await.unwrap();
    let resolver = DescriptorResolver::new(Arc::new(test_catalog()));
    ResizeService::new(resolver, store, cache)
}

/// Build a router with tracing disabled.
pub async fn build_router(store: MockObjectStore, cache_dir: &Path) -> Router {
    let service = build_service(store, cache_dir, 100).await;
    create_router(service, RouterConfig::new().with_tracing(false))
}
