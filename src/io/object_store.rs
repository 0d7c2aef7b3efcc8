use async_trait::async_trait;
use bytes::Bytes;

use crate::error::IoError;

/// Trait for fetching whole objects from remote storage.
///
/// This abstraction keeps the resize pipeline independent of the storage
/// backend. Implementations must be thread-safe; one instance serves every
/// concurrent request.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full contents of `key` in `bucket`.
    ///
    /// Returns [`IoError::NotFound`] when the object does not exist, so
    /// callers can tell a missing original from a storage failure.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes, IoError>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<T> {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes, IoError> {
        (**self).fetch(bucket, key).await
    }
}
