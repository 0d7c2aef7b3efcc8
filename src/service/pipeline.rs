//! Resize pipeline orchestration.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ResizeService                            │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                      serve()                            │    │
//! │  │  1. Resolve path      5. Resize (nearest neighbor)      │    │
//! │  │  2. Check cache       6. Encode as requested            │    │
//! │  │  3. Fetch original    7. Store in cache                 │    │
//! │  │  4. Decode            8. Return bytes                   │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │        │               │               │              │         │
//! │        ▼               ▼               ▼              ▼         │
//! │  ┌──────────┐   ┌────────────┐   ┌───────────┐   ┌─────────┐    │
//! │  │ Resolver │   │ CacheStore │   │ObjectStore│   │  Codec  │    │
//! │  └──────────┘   └────────────┘   └───────────┘   └─────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheStats, CacheStore};
use crate::error::ServeError;
use crate::io::ObjectStore;
use crate::resize::{clamp_quality, resize_nearest, Codec, ImageCodec, DEFAULT_JPEG_QUALITY};
use crate::resolve::{DescriptorResolver, RequestDescriptor};

// =============================================================================
// Serve Response
// =============================================================================

/// A served image variant.
#[derive(Debug, Clone)]
pub struct ServeResponse {
    /// The encoded image
    pub data: Bytes,

    /// MIME type matching the requested extension
    pub content_type: &'static str,

    /// Whether the bytes came from the cache
    pub cache_hit: bool,

    /// Cache key of the variant
    pub cache_key: CacheKey,
}

// =============================================================================
// Resize Service
// =============================================================================

/// Service for resolving, generating and caching image variants.
///
/// # Type Parameters
///
/// * `S` - Object store holding the originals
/// * `C` - Codec used to decode originals and encode variants
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use resize_streamer::{CacheStore, Catalog, DescriptorResolver, ResizeService};
///
/// let resolver = DescriptorResolver::new(Arc::new(catalog));
/// let cache = CacheStore::open("./cache", 1000).await?;
/// let service = ResizeService::new(resolver, store, cache);
///
/// let response = service.serve("/images/avatar/user/42/large.jpg").await?;
/// println!("{} bytes, cache hit: {}", response.data.len(), response.cache_hit);
/// ```
pub struct ResizeService<S: ObjectStore, C: Codec = ImageCodec> {
    resolver: DescriptorResolver,
    store: S,
    codec: Arc<C>,
    cache: CacheStore,
    jpeg_quality: u8,
}

impl<S: ObjectStore> ResizeService<S, ImageCodec> {
    /// Create a service using the `image`-crate codec.
    pub fn new(resolver: DescriptorResolver, store: S, cache: CacheStore) -> Self {
        Self::with_codec(resolver, store, ImageCodec::new(), cache)
    }
}

impl<S: ObjectStore, C: Codec + 'static> ResizeService<S, C> {
    /// Create a service with a custom codec.
    pub fn with_codec(resolver: DescriptorResolver, store: S, codec: C, cache: CacheStore) -> Self {
        Self {
            resolver,
            store,
            codec: Arc::new(codec),
            cache,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Set the JPEG quality used when encoding variants (clamped to 1-100).
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = clamp_quality(quality);
        self
    }

    /// Serve the variant named by a request path.
    ///
    /// This is the main entry point. It:
    /// 1. Resolves the path against the catalog
    /// 2. Returns cached bytes if present
    /// 3. Otherwise fetches, decodes, resizes and encodes the original
    /// 4. Caches and returns the result
    ///
    /// A failed cache write is logged and does not fail the request.
    ///
    /// # Errors
    ///
    /// - [`ServeError::BadRequest`] if the path does not resolve
    /// - [`ServeError::Fetch`] if the original is missing or storage fails
    /// - [`ServeError::DecodeError`] / [`ServeError::EncodeError`] on codec failure
    pub async fn serve(&self, path: &str) -> Result<ServeResponse, ServeError> {
        let descriptor = self.resolver.resolve(path)?;
        self.serve_descriptor(&descriptor).await
    }

    /// Serve an already resolved request.
    pub async fn serve_descriptor(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<ServeResponse, ServeError> {
        let cache_key = descriptor.cache_key();

        if let Some(data) = self.cache.get(&cache_key).await {
            debug!(key = %cache_key, object = %descriptor.object_key, "Cache hit");
            return Ok(ServeResponse {
                data,
                content_type: descriptor.content_type(),
                cache_hit: true,
                cache_key,
            });
        }

        debug!(key = %cache_key, object = %descriptor.object_key, "Cache miss");
        let data = self.render(descriptor).await?;

        if let Err(e) = self.cache.set(&cache_key, &data).await {
            warn!(key = %cache_key, error = %e, "Failed to cache resized image");
        }

        Ok(ServeResponse {
            data,
            content_type: descriptor.content_type(),
            cache_hit: false,
            cache_key,
        })
    }

    /// Fetch, decode, resize and encode a variant without touching the cache.
    ///
    /// Decode, resize and encode run on the blocking thread pool so a large
    /// image never stalls other requests.
    pub async fn render(&self, descriptor: &RequestDescriptor) -> Result<Bytes, ServeError> {
        let original = self
            .store
            .fetch(&descriptor.bucket, &descriptor.object_key)
            .await?;

        let codec = Arc::clone(&self.codec);
        let dimension = descriptor.dimension;
        let format = descriptor.format;
        let quality = self.jpeg_quality;

        tokio::task::spawn_blocking(move || -> Result<Bytes, ServeError> {
            let decoded = codec.decode(&original)?;
            let resized = resize_nearest(&decoded, dimension)?;
            Ok(codec.encode(&resized, format, quality)?)
        })
        .await
        .map_err(|e| ServeError::EncodeError {
            message: format!("image processing task failed: {}", e),
        })?
    }

    /// Get the resolver.
    pub fn resolver(&self) -> &DescriptorResolver {
        &self.resolver
    }

    /// Get the cache store.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Get cache statistics.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Clear the image cache.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// JPEG quality used for encoding.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}

// =============================================================================
// Tests
// =============================================================================
