//! # API Configuration
//!
//! Environment-based configuration for the cache service.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use cache_store::{CacheConfig, CacheError};

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    /// Logging level
    pub log_level: String,

    /// CORS allowed origins
    pub cors_origins: Vec<String>,

    /// Simulated latency of the slow backend behind `/data`
    pub backend_latency: Duration,

    /// Cache core configuration
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidInput` for a malformed `SERVER_ADDR` or
    /// invalid cache settings.
    pub fn from_env() -> Result<Self, CacheError> {
        let addr = env::var("SERVER_ADDR")
            .or_else(|_| env::var("SERVICE_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let server_addr = normalize_addr(&addr)
            .parse::<SocketAddr>()
            .map_err(|e| CacheError::InvalidInput(format!("invalid SERVER_ADDR '{addr}': {e}")))?;

        Ok(Self {
            server_addr,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),

            backend_latency: env::var("BACKEND_LATENCY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map_or(Duration::from_millis(100), Duration::from_millis),

            cache: CacheConfig::from_env()?,
        })
    }
}

/// `":8080"` style addresses bind on all interfaces.
fn normalize_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}
