//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::cache::{MAX_KEY_LENGTH, MAX_VALUE_SIZE};

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is longer than the allowed maximum
    #[error("The key length {0} is greater than {max}", max = MAX_KEY_LENGTH)]
    KeyInvalid(usize),

    /// Value is larger than the allowed maximum
    #[error("The value size {0} is greater than {max}", max = MAX_VALUE_SIZE)]
    ValueInvalid(usize),

    /// Capacity string could not be parsed
    #[error("Invalid size: {0}")]
    InvalidSize(String),

    /// Console command could not be understood
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
