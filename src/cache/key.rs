//! Cache keys for derived images.
//!
//! A key is a SHA-256 fingerprint over the identifying fields of a request:
//! bucket alias, object key, assortment, size name and extension. The alias is
//! used instead of the resolved bucket so that re-pointing an alias at a
//! renamed bucket keeps existing entries valid.
//!
//! Each field is length-prefixed before hashing, so no two distinct field
//! tuples feed the same bytes to the hash (`("a/b", "c")` vs `("a", "b/c")`).

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

/// Length of a key in bytes.
pub const CACHE_KEY_LEN: usize = 32;

/// Fixed-length fingerprint identifying one derived image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey([u8; CACHE_KEY_LEN]);

impl CacheKey {
    /// Fingerprint a request's identifying fields.
    pub fn new(
        bucket_alias: &str,
        object_key: &str,
        assortment: &str,
        size_name: &str,
        extension: &str,
    ) -> Self {
        let mut hasher = Sha256::new();
        for field in [bucket_alias, object_key, assortment, size_name, extension] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field.as_bytes());
        }
        Self(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: [u8; CACHE_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CACHE_KEY_LEN] {
        &self.0
    }

    /// Lowercase hex form, also used as the backing file name.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for CacheKey {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; CACHE_KEY_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}
