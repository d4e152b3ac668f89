//! Error types for the cache
//!
//! Cache operations are total and never fail; only configuration parsing
//! can produce an error.

use thiserror::Error;

// == Config Error Enum ==
/// Errors raised while reading cache configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Value is not a number with an optional byte unit
    #[error("Invalid byte size: {0:?}")]
    InvalidByteSize(String),

    /// Value does not fit in the platform's address space
    #[error("Byte size out of range: {0:?}")]
    OutOfRange(String),

    /// Environment variable holds an unusable value
    #[error("Invalid value for {var}: {source}")]
    InvalidVar {
        var: String,
        #[source]
        source: Box<ConfigError>,
    },
}

// == Result Type Alias ==
/// Convenience Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;
