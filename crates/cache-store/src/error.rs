//! Cache core error types
//!
//! A missing or expired key is never an error here: the contract operations
//! report it as `None`. These variants only surface from startup, from
//! deadline-aware remote calls and from caller input validation.

use thiserror::Error;

/// Cache core errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Remote operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    /// Short label used in log fields and counters.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Timeout { .. } => "timeout",
            Self::Remote(_) => "remote",
            Self::InvalidInput(_) => "invalid_input",
            Self::Serialization(_) => "serialization",
        }
    }

    pub(crate) fn timeout(timeout: std::time::Duration) -> Self {
        Self::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<cache_domain::ParseBackendError> for CacheError {
    fn from(err: cache_domain::ParseBackendError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
            Self::Unavailable(err.to_string())
        } else {
            Self::Remote(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
