//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use chrono::Utc;

// == Cache Entry ==
/// Represents a single cache entry with value and expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// A zero TTL means the entry never expires.
    pub fn new(value: String, ttl: Duration) -> Self {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
            Some(current_timestamp_ms().saturating_add(ttl_ms))
        };

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at the given instant.
    ///
    /// An entry stays readable up to and including its expiration
    /// millisecond; it is expired only once `now` is strictly past it.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => expires < now,
            None => false,
        }
    }

    /// Checks if the entry has expired against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}
