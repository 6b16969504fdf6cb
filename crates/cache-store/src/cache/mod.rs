//! # Cache Facade
//!
//! Enum-dispatched front for whichever store was selected at startup.
//!
//! ## Backends
//!
//! - `InProcess` - [`MemoryStore`] with a background expiry sweep (default)
//! - `Remote` - [`RemoteStore`] over Redis, expiry delegated to the server
//!
//! ## Example
//!
//! ```rust,ignore
//! use cache_store::{Cache, CacheConfig, Metrics};
//!
//! let metrics = Arc::new(Metrics::for_backend(config.backend));
//! let (cache, sweeper) = Cache::from_config(&config, metrics.clone()).await?;
//!
//! cache.set("user:42", &json, cache.default_ttl()).await;
//! let (value, source) = cache
//!     .get_or_load("user:42", cache.default_ttl(), || load_user(42))
//!     .await?;
//! ```

use cache_domain::BackendKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::metrics::SharedMetrics;
use crate::ranking::RankingStore;
use crate::store::{MemoryStore, Sweeper};
#[cfg(feature = "redis")]
use crate::store::RemoteStore;

/// The store behind the facade. Chosen once; never re-checked per call.
#[derive(Debug, Clone)]
pub enum CacheBackend {
    InProcess(Arc<MemoryStore>),
    #[cfg(feature = "redis")]
    Remote(RemoteStore),
}

impl CacheBackend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::InProcess(_) => BackendKind::InProcess,
            #[cfg(feature = "redis")]
            Self::Remote(_) => BackendKind::Remote,
        }
    }

    pub async fn set(&self, key: &str, value: &str, ttl: Duration) {
        match self {
            Self::InProcess(store) => store.set(key, value, ttl),
            #[cfg(feature = "redis")]
            Self::Remote(store) => store.set(key, value, ttl).await,
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        match self {
            Self::InProcess(store) => store.get(key),
            #[cfg(feature = "redis")]
            Self::Remote(store) => store.get(key).await,
        }
    }

    pub async fn delete(&self, key: &str) {
        match self {
            Self::InProcess(store) => store.delete(key),
            #[cfg(feature = "redis")]
            Self::Remote(store) => store.delete(key).await,
        }
    }

    /// Lookup with an explicit deadline; only the remote arm can fail.
    pub async fn get_within(&self, key: &str, timeout: Duration) -> Result<Option<String>> {
        match self {
            Self::InProcess(store) => {
                let _ = timeout;
                Ok(store.get(key))
            }
            #[cfg(feature = "redis")]
            Self::Remote(store) => store.get_within(key, timeout).await,
        }
    }
}

/// Where a value returned by [`Cache::get_or_load`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Cache,
    Loader,
}

/// Backend-agnostic cache handle, cheap to clone.
///
/// When built with a metrics handle, every lookup is counted as a hit or
/// a miss.
#[derive(Debug, Clone)]
pub struct Cache {
    backend: CacheBackend,
    metrics: Option<SharedMetrics>,
    default_ttl: Duration,
}

impl Cache {
    pub fn new(backend: CacheBackend, default_ttl: Duration) -> Self {
        Self {
            backend,
            metrics: None,
            default_ttl,
        }
    }

    /// In-process cache without a sweeper, mostly for tests and tools.
    pub fn in_process(default_ttl: Duration) -> Self {
        Self::new(CacheBackend::InProcess(Arc::new(MemoryStore::new())), default_ttl)
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the configured backend.
    ///
    /// The in-process backend comes with a running [`Sweeper`] that the
    /// caller should shut down on exit. The remote backend connects here;
    /// a failure is meant to abort startup.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidInput` for a zero sweep interval on the
    /// in-process backend, and `CacheError::Unavailable` when the remote
    /// backend cannot be reached (or was compiled out).
    pub async fn from_config(
        config: &CacheConfig,
        metrics: SharedMetrics,
    ) -> Result<(Self, Option<Sweeper>)> {
        let (backend, sweeper) = match config.backend {
            BackendKind::InProcess => {
                if config.sweep_interval.is_zero() {
                    return Err(CacheError::InvalidInput(
                        "sweep interval must be non-zero".to_string(),
                    ));
                }
                let store = Arc::new(MemoryStore::new());
                let sweeper = store.spawn_sweeper(config.sweep_interval);
                (CacheBackend::InProcess(store), Some(sweeper))
            }
            #[cfg(feature = "redis")]
            BackendKind::Remote => {
                let store = RemoteStore::connect(&config.remote, Some(metrics.clone())).await?;
                (CacheBackend::Remote(store), None)
            }
            #[cfg(not(feature = "redis"))]
            BackendKind::Remote => {
                return Err(CacheError::Unavailable(
                    "remote backend requested but built without the `redis` feature".to_string(),
                ));
            }
        };

        tracing::info!(
            backend = %backend.kind(),
            default_ttl_secs = config.default_ttl.as_secs(),
            "Cache backend selected"
        );

        Ok((Self::new(backend, config.default_ttl).with_metrics(metrics), sweeper))
    }

    pub fn backend(&self) -> &CacheBackend {
        &self.backend
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Ranking store living on the same backend as this cache.
    ///
    /// The in-process arm returns a fresh, empty ranking on every call, so
    /// build it once at startup and share the handle.
    #[cfg_attr(not(feature = "redis"), allow(unused_variables))]
    pub fn ranking(&self, name: &str) -> RankingStore {
        match &self.backend {
            CacheBackend::InProcess(_) => RankingStore::in_memory(),
            #[cfg(feature = "redis")]
            CacheBackend::Remote(store) => RankingStore::remote(store.clone(), name),
        }
    }

    // =========================================================================
    // CONTRACT OPERATIONS
    // =========================================================================

    pub async fn set(&self, key: &str, value: &str, ttl: Duration) {
        self.backend.set(key, value, ttl).await;
    }

    /// `Some(value)` on a hit. Missing, expired and unreachable all yield `None`.
    pub async fn get(&self, key: &str) -> Option<String> {
        let value = self.backend.get(key).await;
        self.count_lookup(value.is_some());
        value
    }

    pub async fn delete(&self, key: &str) {
        self.backend.delete(key).await;
    }

    // =========================================================================
    // EXTENDED OPERATIONS
    // =========================================================================

    /// Lookup bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Remote backend only: `CacheError::Timeout` when the deadline passes,
    /// `CacheError::Remote`/`Unavailable` when the command fails.
    pub async fn get_within(&self, key: &str, timeout: Duration) -> Result<Option<String>> {
        let value = self.backend.get_within(key, timeout).await?;
        self.count_lookup(value.is_some());
        Ok(value)
    }

    /// Cache-aside read: return the cached value, or run `loader`, cache
    /// its output for `ttl` and return that.
    ///
    /// # Errors
    ///
    /// Loader errors are returned unchanged and nothing is cached.
    pub async fn get_or_load<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> std::result::Result<(String, Source), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<String, E>>,
    {
        if let Some(value) = self.get(key).await {
            tracing::debug!(key, "Cache hit");
            return Ok((value, Source::Cache));
        }

        tracing::debug!(key, "Cache miss, loading");
        let value = loader().await?;
        self.set(key, &value, ttl).await;
        Ok((value, Source::Loader))
    }

    /// Store `value` as JSON.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Serialization` if `value` cannot be encoded.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.set(key, &json, ttl).await;
        Ok(())
    }

    /// Decode a JSON value. Undecodable payloads are treated as not found.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = self.get(key).await?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cached value");
                None
            }
        }
    }

    fn count_lookup(&self, hit: bool) {
        if let Some(metrics) = &self.metrics {
            if hit {
                metrics.record_hit();
            } else {
                metrics.record_miss();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_from_config_in_process() {
        let metrics = Arc::new(Metrics::new());
        let (cache, sweeper) = Cache::from_config(&CacheConfig::default(), metrics)
            .await
            .unwrap();

        assert_eq!(cache.backend_kind(), BackendKind::InProcess);
        let sweeper = sweeper.expect("in-process backend starts a sweeper");
        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_from_config_rejects_zero_sweep_interval() {
        let config = CacheConfig {
            sweep_interval: Duration::ZERO,
            ..CacheConfig::default()
        };
        let result = Cache::from_config(&config, Arc::new(Metrics::new())).await;
        assert!(matches!(result, Err(CacheError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_get_counts_hits_and_misses() {
        let metrics = Arc::new(Metrics::new());
        let cache = Cache::in_process(Duration::from_secs(60)).with_metrics(metrics.clone());

        cache.set("a", "1", cache.default_ttl()).await;
        assert_eq!(cache.get("a").await.as_deref(), Some("1"));
        assert_eq!(cache.get("b").await, None);

        let summary = metrics.summarize();
        assert_eq!(summary.cache_hits, 1);
        assert_eq!(summary.cache_misses, 1);
        assert_eq!(summary.backend_ops, 0);
    }

    #[tokio::test]
    async fn test_get_or_load_populates_once() {
        let cache = Cache::in_process(Duration::from_secs(60));

        let first = cache
            .get_or_load("user:1", Duration::from_secs(60), || async {
                Ok::<_, std::io::Error>("alice".to_string())
            })
            .await;
        assert_eq!(assert_ok!(first), ("alice".to_string(), Source::Loader));

        let second = cache
            .get_or_load("user:1", Duration::from_secs(60), || async {
                Ok::<_, std::io::Error>("unreachable".to_string())
            })
            .await;
        assert_eq!(assert_ok!(second), ("alice".to_string(), Source::Cache));
    }

    #[tokio::test]
    async fn test_get_or_load_does_not_cache_errors() {
        let cache = Cache::in_process(Duration::from_secs(60));

        let result = cache
            .get_or_load("user:404", Duration::from_secs(60), || async {
                Err::<String, _>("not in database")
            })
            .await;
        assert_err!(result);
        assert_eq!(cache.get("user:404").await, None);
    }

    #[tokio::test]
    async fn test_json_helpers() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct User {
            id: u32,
            name: String,
        }

        let cache = Cache::in_process(Duration::from_secs(60));
        let user = User {
            id: 7,
            name: "bob".to_string(),
        };
        assert_ok!(cache.set_json("user:7", &user, Duration::from_secs(60)).await);
        assert_eq!(cache.get_json::<User>("user:7").await, Some(user));

        cache.set("user:8", "{not json", Duration::from_secs(60)).await;
        assert_eq!(cache.get_json::<User>("user:8").await, None);
    }

    #[tokio::test]
    async fn test_get_within_never_fails_in_process() {
        let cache = Cache::in_process(Duration::from_secs(60));
        cache.set("k", "v", Duration::from_secs(60)).await;

        let value = assert_ok!(cache.get_within("k", Duration::ZERO).await);
        assert_eq!(value.as_deref(), Some("v"));
    }
}
