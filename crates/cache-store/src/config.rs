//! # Cache Configuration
//!
//! Environment-based configuration for backend selection, TTL defaults,
//! sweep cadence and the remote endpoint. Read once at startup.

use std::env;
use std::time::Duration;

use cache_domain::BackendKind;

use crate::error::{CacheError, Result};

/// Default TTL applied by callers that do not pick their own.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Default interval between background sweeps of the in-process store.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Default deadline for a single remote round trip.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(500);

/// Remote key/value service configuration
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub op_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }
}

/// Cache core configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Backend behind the facade
    pub backend: BackendKind,

    /// TTL used when a caller does not supply one
    pub default_ttl: Duration,

    /// Cadence of the in-process expiry sweep
    pub sweep_interval: Duration,

    /// Remote endpoint, only consulted for `BackendKind::Remote`
    pub remote: RemoteConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::InProcess,
            default_ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            remote: RemoteConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidInput` for an unknown `CACHE_BACKEND`
    /// or a zero sweep interval.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match var("CACHE_BACKEND") {
            Some(name) => name.parse::<BackendKind>()?,
            None => {
                let use_redis = var("USE_REDIS")
                    .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false);
                if use_redis {
                    BackendKind::Remote
                } else {
                    BackendKind::InProcess
                }
            }
        };

        let default_ttl = var("CACHE_DEFAULT_TTL_SECS")
            .and_then(|v| v.trim().parse().ok())
            .map_or(DEFAULT_TTL, Duration::from_secs);

        let sweep_interval = var("CACHE_SWEEP_INTERVAL_SECS")
            .and_then(|v| v.trim().parse().ok())
            .map_or(DEFAULT_SWEEP_INTERVAL, Duration::from_secs);

        if sweep_interval.is_zero() {
            return Err(CacheError::InvalidInput(
                "CACHE_SWEEP_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        let url = var("REDIS_URL")
            .or_else(|| var("REDIS_ADDR").map(|addr| format!("redis://{}", addr.trim())))
            .unwrap_or_else(|| RemoteConfig::default().url);

        let op_timeout = var("REDIS_OP_TIMEOUT_MS")
            .and_then(|v| v.trim().parse().ok())
            .map_or(DEFAULT_OP_TIMEOUT, Duration::from_millis);

        Ok(Self {
            backend,
            default_ttl,
            sweep_interval,
            remote: RemoteConfig { url, op_timeout },
        })
    }
}
