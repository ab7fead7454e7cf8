//! Cache facade error types

use redis::RedisError;
use thiserror::Error;

/// Errors surfaced by the cache facade and its primitives
#[derive(Debug, Error)]
pub enum CacheError {
    /// Error returned by the underlying client, passed through untouched
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Cache unavailable: connection is not ready")]
    Unavailable,

    #[error("Health check for '{service}' timed out after {timeout_ms}ms")]
    Timeout { service: String, timeout_ms: u64 },

    #[error("Invalid TTL: expiry must be longer than zero")]
    InvalidTtl,

    #[error("Connection handle is closed")]
    Closed,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CacheError {
    /// True when the facade refused the call because it is disabled
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// True when the underlying error means the transport itself went away
    #[must_use]
    pub fn is_connection_loss(&self) -> bool {
        match self {
            Self::Redis(err) => {
                err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal()
            }
            Self::Closed => true,
            _ => false,
        }
    }
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;
