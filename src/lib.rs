//! Mini KV - An embeddable in-memory key-value cache
//!
//! Bounded by a byte budget, with LRU eviction and lazy TTL expiration.

pub mod cache;
pub mod command;
pub mod config;
pub mod error;

pub use cache::{CacheEngine, CacheStats};
pub use command::Command;
pub use config::Config;
pub use error::{CacheError, Result};
