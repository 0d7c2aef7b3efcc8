//! Disk-backed cache for encoded variants.
//!
//! Each entry is one file under the cache directory, named by the key's hex
//! fingerprint. An in-memory index records when each key was last read or
//! written and is the only thing consulted for capacity decisions.
//!
//! # Eviction
//!
//! When a write finds the index at or above `max_files`, the oldest half of
//! the entries (by last access, rounded down) is deleted in one pass. Freeing
//! half the capacity at once means a cache running at its limit pays for a
//! sort every `max_files / 2` inserts rather than on every insert.
//!
//! # Concurrency
//!
//! One async mutex guards the index. `set` holds it across check, evict and
//! write; `get` holds it across the read and the access-time update. Files
//! are written to a unique temp name and renamed into place, so a reader
//! never observes a partially written entry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::CacheError;

use super::key::CacheKey;

/// Default maximum number of cached files.
pub const DEFAULT_MAX_CACHE_FILES: usize = 1000;

/// Suffix for in-flight writes. Leftovers are swept on open.
const TEMP_SUFFIX: &str = ".tmp";

// =============================================================================
// Index
// =============================================================================

/// Last-access stamp. `seq` breaks ties between equal wall-clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct AccessStamp {
    at: SystemTime,
    seq: u64,
}

#[derive(Debug)]
struct CacheIndex {
    entries: HashMap<CacheKey, AccessStamp>,
    /// Latest stamp handed out; keeps stamps monotonic if the clock steps back.
    clock: SystemTime,
    next_seq: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheIndex {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            clock: SystemTime::UNIX_EPOCH,
            next_seq: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn stamp_at(&mut self, at: SystemTime) -> AccessStamp {
        self.clock = self.clock.max(at);
        let seq = self.next_seq;
        self.next_seq += 1;
        AccessStamp {
            at: self.clock,
            seq,
        }
    }

    fn touch(&mut self, key: CacheKey) {
        let stamp = self.stamp_at(SystemTime::now());
        self.entries.insert(key, stamp);
    }

    /// Keys ordered least-recently-used first.
    fn oldest_first(&self) -> Vec<CacheKey> {
        let mut by_age: Vec<(CacheKey, AccessStamp)> =
            self.entries.iter().map(|(k, s)| (*k, *s)).collect();
        by_age.sort_by_key(|(_, stamp)| *stamp);
        by_age.into_iter().map(|(key, _)| key).collect()
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub max_files: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

// =============================================================================
// Cache Store
// =============================================================================

/// Bounded key -> bytes store persisted as one file per key.
///
/// # Example
///
/// ```no_run
/// use resize_streamer::cache::{CacheKey, CacheStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let cache = CacheStore::open("/tmp/resize-cache", 1000).await?;
///
///     let key = CacheKey::new("images", "user/42", "avatar", "large", "jpg");
///     cache.set(&key, b"encoded bytes").await?;
///
///     assert!(cache.get(&key).await.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct CacheStore {
    dir: PathBuf,
    max_files: usize,
    index: Mutex<CacheIndex>,
}

impl CacheStore {
    /// Open (or create) a cache directory.
    ///
    /// Existing entries are adopted into the index with their modification
    /// time as last access, and temp files left by an interrupted write are
    /// removed. If the directory holds more than `max_files` entries, the
    /// oldest are deleted until it fits.
    ///
    /// A `max_files` of zero is treated as one.
    pub async fn open(dir: impl Into<PathBuf>, max_files: usize) -> Result<Self, CacheError> {
        let dir = dir.into();
        let max_files = max_files.max(1);
        fs::create_dir_all(&dir).await?;

        let mut found: Vec<(CacheKey, SystemTime)> = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };

            if name.ends_with(TEMP_SUFFIX) {
                let _ = fs::remove_file(entry.path()).await;
                continue;
            }

            let Ok(key) = name.parse::<CacheKey>() else {
                continue;
            };
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((key, modified));
        }

        found.sort_by_key(|(_, modified)| *modified);

        let mut index = CacheIndex::new();
        for (key, modified) in found {
            let stamp = index.stamp_at(modified);
            index.entries.insert(key, stamp);
        }

        let store = Self {
            dir,
            max_files,
            index: Mutex::new(CacheIndex::new()),
        };

        if index.entries.len() > max_files {
            let excess = index.entries.len() - max_files;
            store.evict_oldest(&mut index, excess).await;
        }

        debug!(
            dir = %store.dir.display(),
            entries = index.entries.len(),
            max_files,
            "Opened image cache"
        );

        *store.index.lock().await = index;
        Ok(store)
    }

    /// Read an entry, refreshing its access time on a hit.
    ///
    /// Untracked keys and unreadable files are misses. An unreadable tracked
    /// file is dropped from the index.
    pub async fn get(&self, key: &CacheKey) -> Option<Bytes> {
        let mut index = self.index.lock().await;

        if !index.entries.contains_key(key) {
            index.misses += 1;
            return None;
        }

        match fs::read(self.entry_path(key)).await {
            Ok(data) => {
                index.touch(*key);
                index.hits += 1;
                Some(Bytes::from(data))
            }
            Err(e) => {
                debug!(key = %key, error = %e, "Cache file unreadable, treating as miss");
                index.entries.remove(key);
                index.misses += 1;
                None
            }
        }
    }

    /// Store an entry, evicting first if the index is at capacity.
    ///
    /// Eviction runs even when `key` is already tracked. Only a failure to persist `data` is reported; problems deleting
    /// evicted files are ignored.
    pub async fn set(&self, key: &CacheKey, data: &[u8]) -> Result<(), CacheError> {
        let mut index = self.index.lock().await;

        if index.entries.len() >= self.max_files {
            self.evict(&mut index).await;
        }

        let seq = index.next_seq;
        self.write_atomic(key, seq, data).await?;
        index.touch(*key);

        Ok(())
    }

    /// Delete an entry. Returns `true` if it was tracked.
    pub async fn remove(&self, key: &CacheKey) -> bool {
        let mut index = self.index.lock().await;
        let tracked = index.entries.remove(key).is_some();
        let _ = fs::remove_file(self.entry_path(key)).await;
        tracked
    }

    /// Delete every tracked entry.
    pub async fn clear(&self) {
        let mut index = self.index.lock().await;
        for key in index.entries.keys() {
            let _ = fs::remove_file(self.entry_path(key)).await;
        }
        index.entries.clear();
    }

    /// Check whether a key is tracked without refreshing its access time.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.index.lock().await.entries.contains_key(key)
    }

    /// Number of tracked entries.
    pub async fn len(&self) -> usize {
        self.index.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.lock().await.entries.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        let index = self.index.lock().await;
        CacheStats {
            entries: index.entries.len(),
            max_files: self.max_files,
            hits: index.hits,
            misses: index.misses,
            evictions: index.evictions,
        }
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the backing file for `key`.
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.to_hex())
    }

    /// Remove the least-recently-used half of the index.
    ///
    /// Always frees at least one slot so that a tiny cache (e.g. a single
    /// entry, where half rounds down to zero) still respects its bound.
    async fn evict(&self, index: &mut CacheIndex) {
        let len = index.entries.len();
        let count = (len / 2).max((len + 1).saturating_sub(self.max_files));
        self.evict_oldest(index, count).await;
    }

    async fn evict_oldest(&self, index: &mut CacheIndex, count: usize) {
        if count == 0 {
            return;
        }

        let victims: Vec<CacheKey> = index.oldest_first().into_iter().take(count).collect();
        for key in &victims {
            if let Err(e) = fs::remove_file(self.entry_path(key)).await {
                debug!(key = %key, error = %e, "Evicted cache file already gone");
            }
            index.entries.remove(key);
        }
        index.evictions += victims.len() as u64;

        debug!(
            evicted = victims.len(),
            remaining = index.entries.len(),
            "Evicted least recently used cache entries"
        );
    }

    async fn write_atomic(&self, key: &CacheKey, seq: u64, data: &[u8]) -> Result<(), CacheError> {
        let final_path = self.entry_path(key);
        let temp_path = self
            .dir
            .join(format!("{}.{}{}", key.to_hex(), seq, TEMP_SUFFIX));

        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.flush().await?;
            drop(file);
            fs::rename(&temp_path, &final_path).await
        }
        .await;

        if let Err(e) = result {
            warn!(key = %key, error = %e, "Failed to write cache file");
            let _ = fs::remove_file(&temp_path).await;
            return Err(CacheError::Io(e));
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
