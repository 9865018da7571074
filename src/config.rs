//! # Runtime Configuration
//!
//! Environment-driven settings for the parts of the crate that need runtime tuning.
//!
//! ### `RDISPATCH_STACK_SIZE`
//!
//! Stack size for [`CoroutineHandler`](crate::handler::CoroutineHandler) coroutines.
//! Accepts decimal (`65536`) or hexadecimal (`0x10000`). Unparseable values fall back to
//! the default of `0x10000` (64 KB).
//!
//! ```rust
//! use route_dispatch::config::DispatchConfig;
//!
//! let config = DispatchConfig::from_env();
//! assert!(config.stack_size > 0);
//! ```

use std::env;

pub const DEFAULT_STACK_SIZE: usize = 0x10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Stack size for handler coroutines in bytes
    pub stack_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl DispatchConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            stack_size: env::var("RDISPATCH_STACK_SIZE")
                .ok()
                .and_then(|v| parse_stack_size(&v))
                .unwrap_or(DEFAULT_STACK_SIZE),
        }
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal size. Zero is rejected.
#[must_use]
pub fn parse_stack_size(value: &str) -> Option<usize> {
    let value = value.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    };
    parsed.filter(|size| *size > 0)
}
