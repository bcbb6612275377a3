//! Cache error types.

use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// A cache miss is never an error: reads report it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache operation failed: {0}")]
    Operation(String),

    #[error("Cache connection failed: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid TTL {0}: must be a positive number of seconds")]
    InvalidTtl(u64),

    #[error("Invalid cache key '{0}'")]
    InvalidKey(String),
}

impl CacheError {
    /// Whether the error came from talking to the store rather than from the caller's input.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, CacheError::Operation(_) | CacheError::Connection(_))
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serialization(e.to_string())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout() {
            CacheError::Connection(e.to_string())
        } else {
            CacheError::Operation(e.to_string())
        }
    }
}
