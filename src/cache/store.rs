//! Cache Engine Module
//!
//! Main cache engine combining the recency index with byte-budget
//! accounting, LRU eviction and lazy TTL expiration.

use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{
    current_timestamp_ms, parse_size, CacheEntry, CacheStats, RecencyIndex, DEFAULT_MAX_MEMORY,
    MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Bytes accounted for one key/value pair.
fn entry_size(key_len: usize, value_len: usize) -> u64 {
    (key_len + value_len) as u64
}

// == Guarded State ==
/// Everything the engine mutates, kept behind one lock so the byte counter
/// always moves together with the index mutation it accounts for.
#[derive(Debug)]
struct Inner {
    index: RecencyIndex,
    current_memory: u64,
    max_memory: u64,
    stats: CacheStats,
}

impl Inner {
    // == Evict ==
    /// Drops least recently used entries until usage is under the ceiling
    /// or nothing is left.
    fn evict(&mut self) {
        let mut evicted = 0usize;
        while self.current_memory >= self.max_memory {
            let Some((key, entry)) = self.index.remove_least_recently_used() else {
                break;
            };
            self.current_memory = self
                .current_memory
                .saturating_sub(entry_size(key.len(), entry.value.len()));
            self.stats.record_eviction();
            evicted += 1;
            debug!(key = %key, "Evicted least recently used entry");
        }
        if evicted > 0 {
            debug!(
                evicted,
                current_memory = self.current_memory,
                max_memory = self.max_memory,
                "Eviction pass finished"
            );
        }
    }
}

// == Cache Engine ==
/// Thread-safe, size-bounded cache with LRU eviction and lazy TTL expiration.
///
/// Only key and value bytes count towards the ceiling. Expired entries are
/// hidden from [`get`](Self::get) but keep their slot and their bytes until
/// they are deleted, flushed or evicted, so [`count`](Self::count) and
/// [`current_memory`](Self::current_memory) include them.
#[derive(Debug)]
pub struct CacheEngine {
    inner: Mutex<Inner>,
    /// TTL applied when `set` is called without one; zero = never expires
    default_ttl: Duration,
}

impl CacheEngine {
    // == Constructor ==
    /// Creates a new engine with the given ceiling and default TTL.
    ///
    /// # Arguments
    /// * `max_memory` - Ceiling in bytes for accounted key and value data
    /// * `default_ttl` - TTL for entries set without one (zero = no expiry)
    pub fn new(max_memory: u64, default_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                index: RecencyIndex::new(),
                current_memory: 0,
                max_memory,
                stats: CacheStats::new(),
            }),
            default_ttl,
        }
    }

    /// Creates an engine with the ceiling taken from a size string.
    ///
    /// A string that fails to parse leaves the default 1 MB ceiling.
    pub fn with_size_spec(spec: &str) -> Self {
        let max_memory = parse_size(spec).unwrap_or_else(|err| {
            warn!(error = %err, "Ignoring capacity, using default");
            DEFAULT_MAX_MEMORY
        });
        Self::new(max_memory, Duration::ZERO)
    }

    /// Creates an engine from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_memory, config.default_ttl)
    }

    // == Set Max Memory ==
    /// Replaces the memory ceiling with the parsed value of `spec`.
    ///
    /// Returns the new ceiling. On a parse error nothing changes. A lower
    /// ceiling is enforced by the next `set`.
    pub fn set_max_memory(&self, spec: &str) -> Result<u64> {
        let max_memory = parse_size(spec)?;
        self.inner.lock().max_memory = max_memory;
        debug!(max_memory, "Memory ceiling updated");
        Ok(max_memory)
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// An existing key gets its value and expiry replaced and becomes the
    /// most recently used entry. If usage reaches the ceiling afterwards,
    /// least recently used entries are evicted before returning. An entry
    /// that alone reaches the ceiling is evicted as well.
    ///
    /// # Arguments
    /// * `key` - At most `MAX_KEY_LENGTH` bytes
    /// * `value` - At most `MAX_VALUE_SIZE` bytes
    /// * `ttl` - TTL for this entry (default TTL if None, zero = no expiry)
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = key.into();
        let value = value.into();

        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::KeyInvalid(key.len()));
        }
        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::ValueInvalid(value.len()));
        }

        let key_len = key.len();
        let size = entry_size(key_len, value.len());
        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));

        let mut inner = self.inner.lock();
        if let Some(previous) = inner.index.set(key, entry) {
            inner.current_memory = inner
                .current_memory
                .saturating_sub(entry_size(key_len, previous.value.len()));
        }
        inner.current_memory += size;

        if inner.current_memory >= inner.max_memory {
            inner.evict();
        }

        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None for missing keys, oversized keys and expired entries.
    /// Reads do not change recency and do not reclaim expired entries.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut inner = self.inner.lock();

        if key.len() > MAX_KEY_LENGTH {
            inner.stats.record_miss();
            return None;
        }

        let now = current_timestamp_ms();
        let value = inner
            .index
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone());

        match value {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        value
    }

    // == Delete ==
    /// Removes an entry by key, returning whether it existed.
    pub fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        match inner.index.delete(key) {
            Some((key, entry)) => {
                inner.current_memory = inner
                    .current_memory
                    .saturating_sub(entry_size(key.len(), entry.value.len()));
                true
            }
            None => false,
        }
    }

    // == Exists ==
    /// Checks whether a key is present, regardless of expiry.
    pub fn exists(&self, key: &str) -> bool {
        self.inner.lock().index.exists(key)
    }

    // == Flush ==
    /// Removes every entry and resets memory usage to zero.
    pub fn flush(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.index = RecencyIndex::new();
        inner.current_memory = 0;
        true
    }

    // == Count ==
    /// Returns the number of entries, expired-but-present ones included.
    pub fn count(&self) -> usize {
        self.inner.lock().index.len()
    }

    /// Returns the key and value bytes currently accounted.
    pub fn current_memory(&self) -> u64 {
        self.inner.lock().current_memory
    }

    /// Returns the configured ceiling in bytes.
    pub fn max_memory(&self) -> u64 {
        self.inner.lock().max_memory
    }

    /// Returns the keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .lock()
            .index
            .keys()
            .map(str::to_string)
            .collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            total_entries: inner.index.len(),
            current_memory: inner.current_memory,
            max_memory: inner.max_memory,
            ..inner.stats.clone()
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let inner = self.inner.lock();
        inner.index.assert_consistent();
        let accounted: u64 = inner
            .index
            .keys()
            .map(|key| {
                let value = inner.index.get(key).map_or(0, |e| e.value.len());
                entry_size(key.len(), value)
            })
            .sum();
        assert_eq!(inner.current_memory, accounted, "memory accounting drifted");
    }
}

impl Default for CacheEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MEMORY, Duration::ZERO)
    }
}
