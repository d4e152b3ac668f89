//! Configuration Module
//!
//! Handles loading the cache byte budget from environment variables.

use std::env;

use serde::Serialize;
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Environment variable holding the byte budget
pub const MAX_BYTES_VAR: &str = "CACHE_MAX_BYTES";

/// Cache configuration parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheConfig {
    /// Byte budget for keys plus values, 0 = unbounded
    pub max_bytes: usize,
}

impl CacheConfig {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Creates a new CacheConfig from environment variables.
    ///
    /// Invalid values are logged and replaced with the default.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_BYTES` - Byte budget, e.g. `1048576`, `64KiB`, `2MB` (default: 0, unbounded)
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|err| {
            warn!("{}, using default configuration", err);
            Self::default()
        })
    }

    /// Like [`from_env`](Self::from_env), but reports invalid values.
    pub fn try_from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_bytes = match lookup(MAX_BYTES_VAR) {
            Some(raw) => parse_byte_size(&raw).map_err(|source| ConfigError::InvalidVar {
                var: MAX_BYTES_VAR.to_string(),
                source: Box::new(source),
            })?,
            None => 0,
        };

        Ok(Self { max_bytes })
    }
}

// == Byte Size Parsing ==
/// Parses a byte count with an optional unit suffix.
///
/// Accepts a plain integer or one followed by `B`, `KB`, `MB`, `GB`
/// (powers of 1000) or `KiB`, `MiB`, `GiB` (powers of 1024). Units are
/// case-insensitive and may be separated from the number by whitespace.
pub fn parse_byte_size(input: &str) -> Result<usize> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    if digits.is_empty() {
        return Err(ConfigError::InvalidByteSize(input.to_string()));
    }

    let multiplier: usize = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => 1_000,
        "kib" => 1 << 10,
        "m" | "mb" => 1_000_000,
        "mib" => 1 << 20,
        "g" | "gb" => 1_000_000_000,
        "gib" => 1 << 30,
        _ => return Err(ConfigError::InvalidByteSize(input.to_string())),
    };

    // All-digit input only fails to parse on overflow
    let amount: usize = digits
        .parse()
        .map_err(|_| ConfigError::OutOfRange(input.to_string()))?;

    amount
        .checked_mul(multiplier)
        .ok_or_else(|| ConfigError::OutOfRange(input.to_string()))
}
