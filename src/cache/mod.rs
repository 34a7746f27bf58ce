//! Cache Module
//!
//! Provides in-memory caching bounded by a byte budget, with LRU eviction
//! and lazy TTL expiration.

mod entry;
mod lru;
mod size;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use lru::RecencyIndex;
pub use size::parse_size;
pub use stats::CacheStats;
pub use store::CacheEngine;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 64;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024;

/// Memory ceiling used when none is configured
pub const DEFAULT_MAX_MEMORY: u64 = 1024 * 1024; // 1 MB
