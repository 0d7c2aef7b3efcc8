//! Request path resolution.
//!
//! Request paths have the shape
//!
//! ```text
//! /{bucket_alias}/{assortment}/{object/key/segments...}/{size_name}.{extension}
//! ```
//!
//! The object key may span several segments because the object store's key
//! namespace is itself slash-delimited. The final segment is always split at
//! its last `.`, so a key whose own last segment contains a dot
//! (`photos/cat.v2`) is still unambiguous.

use std::sync::Arc;

use crate::cache::CacheKey;
use crate::error::ResolveError;
use crate::resize::{parse_size, Dimension, OutputFormat};

use super::catalog::Catalog;

/// Minimum number of path segments: alias, assortment, key, size.ext
const MIN_SEGMENTS: usize = 4;

/// A fully parsed and validated image request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Public bucket alias from the URL
    pub bucket_alias: String,

    /// Assortment the size name belongs to
    pub assortment: String,

    /// Object key in the backing bucket (may contain `/`)
    pub object_key: String,

    /// Size name within the assortment
    pub size_name: String,

    /// Extension as requested (drives the output encoding)
    pub extension: String,

    /// Backing bucket the alias resolves to
    pub bucket: String,

    /// Target dimensions from the assortment catalog
    pub dimension: Dimension,

    /// Output encoding derived from the extension
    pub format: OutputFormat,
}

impl RequestDescriptor {
    /// Cache key for this request.
    ///
    /// Built from the alias, not the resolved bucket.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(
            &self.bucket_alias,
            &self.object_key,
            &self.assortment,
            &self.size_name,
            &self.extension,
        )
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Resolves request paths against an immutable catalog snapshot.
#[derive(Debug, Clone)]
pub struct DescriptorResolver {
    catalog: Arc<Catalog>,
}

impl DescriptorResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Resolve a raw request path. Leading and trailing slashes are ignored.
    pub fn resolve(&self, path: &str) -> Result<RequestDescriptor, ResolveError> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        self.resolve_segments(&segments)
    }

    /// Resolve a path that has already been split on `/`.
    ///
    /// Steps run in order and stop at the first failure: path shape, bucket
    /// alias, assortment, size name, size spec, extension.
    pub fn resolve_segments(&self, segments: &[&str]) -> Result<RequestDescriptor, ResolveError> {
        if segments.len() < MIN_SEGMENTS {
            return Err(ResolveError::MalformedPath(format!(
                "expected at least {} segments, got {}",
                MIN_SEGMENTS,
                segments.len()
            )));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ResolveError::MalformedPath(
                "path contains an empty segment".to_string(),
            ));
        }

        let bucket_alias = segments[0];
        let assortment = segments[1];
        let object_key = segments[2..segments.len() - 1].join("/");
        let last = segments[segments.len() - 1];

        let (size_name, extension) = match last.rsplit_once('.') {
            Some((size, ext)) if !size.is_empty() && !ext.is_empty() => (size, ext),
            _ => {
                return Err(ResolveError::MalformedPath(format!(
                    "final segment {:?} is not <size>.<extension>",
                    last
                )))
            }
        };

        let bucket = self
            .catalog
            .bucket(bucket_alias)
            .ok_or_else(|| ResolveError::UnknownBucketAlias(bucket_alias.to_string()))?;

        let sizes = self
            .catalog
            .sizes(assortment)
            .ok_or_else(|| ResolveError::UnknownAssortment(assortment.to_string()))?;

        let spec = sizes
            .get(size_name)
            .ok_or_else(|| ResolveError::UnknownSizeName {
                assortment: assortment.to_string(),
                size: size_name.to_string(),
            })?;

        let dimension = parse_size(spec)?;

        let format = OutputFormat::from_extension(extension)
            .ok_or_else(|| ResolveError::UnsupportedExtension(extension.to_string()))?;

        Ok(RequestDescriptor {
            bucket_alias: bucket_alias.to_string(),
            assortment: assortment.to_string(),
            object_key,
            size_name: size_name.to_string(),
            extension: extension.to_string(),
            bucket: bucket.to_string(),
            dimension,
            format,
        })
    }
}
