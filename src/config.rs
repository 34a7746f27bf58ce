//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::cache::{parse_size, DEFAULT_MAX_MEMORY};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Memory ceiling in bytes for key and value data
    pub max_memory: u64,
    /// TTL for entries set without one, zero = never expires
    pub default_ttl: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_MEMORY` - Size string such as `64MB` (default: 1MB)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 0, no expiry)
    pub fn from_env() -> Self {
        Self::from_values(
            env::var("MAX_MEMORY").ok().as_deref(),
            env::var("DEFAULT_TTL_MS").ok().as_deref(),
        )
    }

    fn from_values(max_memory: Option<&str>, default_ttl_ms: Option<&str>) -> Self {
        let max_memory = max_memory
            .and_then(|v| {
                parse_size(v)
                    .map_err(|err| warn!(error = %err, "Ignoring MAX_MEMORY"))
                    .ok()
            })
            .unwrap_or(DEFAULT_MAX_MEMORY);
        let default_ttl = default_ttl_ms
            .and_then(|v| v.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::ZERO);

        Self {
            max_memory,
            default_ttl,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_memory: DEFAULT_MAX_MEMORY,
            default_ttl: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_memory, 1024 * 1024);
        assert_eq!(config.default_ttl, Duration::ZERO);
    }

    #[test]
    fn test_config_missing_values_use_defaults() {
        assert_eq!(Config::from_values(None, None), Config::default());
    }

    #[test]
    fn test_config_parses_values() {
        let config = Config::from_values(Some("64MB"), Some("1500"));
        assert_eq!(config.max_memory, 64 * 1024 * 1024);
        assert_eq!(config.default_ttl, Duration::from_millis(1500));
    }

    #[test]
    fn test_config_invalid_values_use_defaults() {
        let config = Config::from_values(Some("manyMB"), Some("soon"));
        assert_eq!(config, Config::default());
    }
}
