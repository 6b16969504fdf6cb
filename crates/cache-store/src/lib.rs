//! # Cache Store Library
//!
//! Interchangeable TTL cache core for services that put a cache in front
//! of a slow backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Callers (HTTP handlers)                     │
//! └─────────────────────────────────────────────────────────────┘
//!                │                  │                  │
//!                ▼                  ▼                  ▼
//! ┌──────────────────────┐ ┌─────────────────┐ ┌────────────────┐
//! │     Cache Facade     │ │  RankingStore   │ │    Metrics     │
//! │ (set / get / delete) │ │    (top N)      │ │ (hits, p50..)  │
//! └──────────────────────┘ └─────────────────┘ └────────────────┘
//!                │                  │
//!        ┌───────┴────────┐ ┌───────┴────────┐
//!        ▼                ▼ ▼                ▼
//! ┌──────────────────┐  ┌──────────────────────────┐
//! │   MemoryStore    │  │       RemoteStore        │
//! │ (RwLock + sweep) │  │ (Redis, native expiry)   │
//! └──────────────────┘  └──────────────────────────┘
//! ```
//!
//! Missing, expired and unreachable keys all read as `None`. Only startup
//! (remote connection) and the deadline-aware `*_within` calls report
//! errors.
//!
//! ## Features
//!
//! - `redis`: Enable the Redis backend (default)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cache_store::{Cache, CacheConfig, Metrics};
//!
//! let config = CacheConfig::from_env()?;
//! let metrics = Arc::new(Metrics::for_backend(config.backend));
//! let (cache, sweeper) = Cache::from_config(&config, metrics.clone()).await?;
//!
//! cache.set("session:1", "payload", Duration::from_secs(10)).await;
//! assert_eq!(cache.get("session:1").await.as_deref(), Some("payload"));
//!
//! println!("{:?}", metrics.summarize());
//! if let Some(sweeper) = sweeper {
//!     sweeper.shutdown().await;
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ranking;
pub mod store;

// Re-export commonly used types
pub use cache::{Cache, CacheBackend, Source};
pub use cache_domain::{BackendKind, MetricsSummary, ScoreEntry, ScoreUpdate};
pub use config::{CacheConfig, RemoteConfig};
pub use error::{CacheError, Result};
pub use metrics::{Metrics, SharedMetrics};
pub use ranking::{DEFAULT_TOP_N, MemoryRanking, RankingStore, parse_limit};
#[cfg(feature = "redis")]
pub use store::RemoteStore;
pub use store::{MemoryStore, Sweeper};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
