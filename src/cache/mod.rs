//! Local disk cache for derived images.
//!
//! # Components
//!
//! - [`CacheKey`]: SHA-256 fingerprint of a request's identifying fields
//! - [`CacheStore`]: bounded, file-per-key store with half-batch LRU eviction
//!
//! # Example
//!
//! ```no_run
//! use resize_streamer::cache::{CacheKey, CacheStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = CacheStore::open("./cache", 1000).await.unwrap();
//!     let key = CacheKey::new("images", "user/42", "avatar", "large", "jpg");
//!
//!     if let Some(bytes) = cache.get(&key).await {
//!         println!("Cache hit: {} bytes", bytes.len());
//!     }
//! }
//! ```

mod key;
mod store;

pub use key::{CacheKey, CACHE_KEY_LEN};
pub use store::{CacheStats, CacheStore, DEFAULT_MAX_CACHE_FILES};
