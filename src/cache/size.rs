//! Size String Module
//!
//! Converts capacity strings such as `1KB`, `64MB` or `2gb` into bytes.

use tracing::warn;

use crate::cache::DEFAULT_MAX_MEMORY;
use crate::error::{CacheError, Result};

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

// == Parse Size ==
/// Parses `<decimal><unit>` into a byte count.
///
/// The unit is the last two characters and is matched case-insensitively
/// against `KB`, `MB` and `GB`. Any other unit yields
/// [`DEFAULT_MAX_MEMORY`]. A magnitude that is not an unsigned decimal,
/// or a result that does not fit in `u64`, is an error.
pub fn parse_size(spec: &str) -> Result<u64> {
    let spec = spec.trim();
    if spec.len() < 2 || !spec.is_char_boundary(spec.len() - 2) {
        return Err(CacheError::InvalidSize(spec.to_string()));
    }

    let (number, unit) = spec.split_at(spec.len() - 2);
    let number: u64 = number
        .parse()
        .map_err(|_| CacheError::InvalidSize(spec.to_string()))?;

    let multiplier = match unit.to_ascii_uppercase().as_str() {
        "KB" => KB,
        "MB" => MB,
        "GB" => GB,
        _ => {
            warn!(spec = %spec, "Unrecognized size unit, using default capacity");
            return Ok(DEFAULT_MAX_MEMORY);
        }
    };

    number
        .checked_mul(multiplier)
        .ok_or_else(|| CacheError::InvalidSize(spec.to_string()))
}
