//! # Resize Streamer
//!
//! An on-demand image resize server for originals stored in S3-compatible
//! object storage.
//!
//! A request path names a bucket alias, an assortment, an object key and a
//! named size from that assortment. The server fetches the original, scales it
//! with a deterministic nearest-neighbor resampler, re-encodes it as JPEG or
//! PNG and keeps the result in a bounded on-disk cache.
//!
//! ## Architecture
//!
//! - [`resolve`] - Request path to descriptor resolution against the catalog
//! - [`resize`] - Size specs, nearest-neighbor resizing and image codecs
//! - [`cache`] - Bounded disk cache with half-batch LRU eviction
//! - [`io`] - Object store abstraction and the S3 implementation
//! - [`service`] - The resolve, cache, fetch, resize, encode pipeline
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI, YAML config file and merged settings
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use resize_streamer::{
//!     create_router, create_s3_client, CacheStore, Catalog, DescriptorResolver, ResizeService,
//!     RouterConfig, S3ObjectStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::new()
//!         .with_bucket("images", "bucket-1")
//!         .with_size("avatar", "large", "1000x1000");
//!
//!     let store = S3ObjectStore::new(create_s3_client(None, "us-east-1").await);
//!     let cache = CacheStore::open("./cache", 1000).await?;
//!     let service = ResizeService::new(DescriptorResolver::new(Arc::new(catalog)), store, cache);
//!
//!     let router = create_router(service, RouterConfig::new());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod io;
pub mod resize;
pub mod resolve;
pub mod server;
pub mod service;

// Re-export commonly used types
pub use cache::{CacheKey, CacheStats, CacheStore, DEFAULT_MAX_CACHE_FILES};
pub use config::{Config, ConfigFile, Settings};
pub use error::{
    CacheError, CodecError, ConfigError, ErrorKind, IoError, ResizeError, ResolveError,
    ServeError, SizeError,
};
pub use io::{create_s3_client, ObjectStore, S3ObjectStore};
pub use resize::{
    clamp_quality, is_valid_quality, parse_size, resize_nearest, Codec, Dimension, ImageCodec,
    OutputFormat, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use resolve::{Catalog, DescriptorResolver, RequestDescriptor};
pub use server::{
    create_router, health_handler, image_handler, AppState, ErrorResponse, HealthResponse,
    RouterConfig,
};
pub use service::{ResizeService, ServeResponse};
