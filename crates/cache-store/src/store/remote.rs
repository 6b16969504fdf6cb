//! # Redis Store Adapter
//!
//! Redis-backed store with the same contract as [`MemoryStore`]: the
//! contract operations absorb every failure into not-found / no-op, while
//! the `*_within` variants surface timeouts and command failures.
//!
//! [`MemoryStore`]: super::MemoryStore

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::RemoteConfig;
use crate::error::{CacheError, Result};
use crate::metrics::SharedMetrics;

/// Budget for establishing the initial connection and verifying it.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis store with a single multiplexed, auto-reconnecting connection
#[derive(Clone)]
pub struct RemoteStore {
    conn: ConnectionManager,
    op_timeout: Duration,
    metrics: Option<SharedMetrics>,
    absorbed: Arc<AtomicU64>,
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("op_timeout", &self.op_timeout)
            .field("absorbed_failures", &self.absorbed_failures())
            .finish_non_exhaustive()
    }
}

impl RemoteStore {
    /// Connect and verify the endpoint with a `PING`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Unavailable` if the URL is malformed, the
    /// server cannot be reached, or the handshake does not complete within
    /// [`CONNECT_TIMEOUT`]. Callers treat this as fatal; nothing retries.
    pub async fn connect(config: &RemoteConfig, metrics: Option<SharedMetrics>) -> Result<Self> {
        Self::connect_with_timeout(config, metrics, CONNECT_TIMEOUT).await
    }

    pub async fn connect_with_timeout(
        config: &RemoteConfig,
        metrics: Option<SharedMetrics>,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| CacheError::Unavailable(format!("invalid redis url: {e}")))?;

        let handshake = async {
            let mut conn = ConnectionManager::new(client).await?;
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            RedisResult::Ok(conn)
        };

        let conn = match tokio::time::timeout(connect_timeout, handshake).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(CacheError::Unavailable(e.to_string())),
            Err(_) => {
                return Err(CacheError::Unavailable(format!(
                    "no response from {} within {}ms",
                    config.url,
                    connect_timeout.as_millis()
                )));
            }
        };

        tracing::info!(
            url = %config.url,
            op_timeout_ms = u64::try_from(config.op_timeout.as_millis()).unwrap_or(u64::MAX),
            "Redis connected"
        );

        Ok(Self {
            conn,
            op_timeout: config.op_timeout,
            metrics,
            absorbed: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Failures absorbed into not-found / no-op since startup.
    pub fn absorbed_failures(&self) -> u64 {
        self.absorbed.load(Ordering::Relaxed)
    }

    // =========================================================================
    // CONTRACT OPERATIONS
    // =========================================================================

    /// Store `value` under `key` with a native Redis expiry. Never fails.
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) {
        if let Err(e) = self.set_within(key, value, ttl, self.op_timeout).await {
            self.absorb("set", key, &e);
        }
    }

    /// Value for `key`, or `None` when absent, expired or unreachable.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.get_within(key, self.op_timeout).await {
            Ok(value) => value,
            Err(e) => {
                self.absorb("get", key, &e);
                None
            }
        }
    }

    /// Remove `key`. Never fails.
    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.delete_within(key, self.op_timeout).await {
            self.absorb("delete", key, &e);
        }
    }

    // =========================================================================
    // DEADLINE-AWARE OPERATIONS
    // =========================================================================

    /// `PSETEX` with `ttl`. A TTL under one millisecond deletes the key,
    /// since Redis rejects zero expirations.
    pub async fn set_within(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        timeout: Duration,
    ) -> Result<()> {
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        if millis == 0 {
            return self.delete_within(key, timeout).await.map(|_| ());
        }

        self.round_trip(timeout, |mut conn| async move {
            conn.pset_ex(key, value, millis).await
        })
        .await
    }

    pub async fn get_within(&self, key: &str, timeout: Duration) -> Result<Option<String>> {
        self.round_trip(timeout, |mut conn| async move {
            conn.get::<_, Option<String>>(key).await
        })
        .await
    }

    /// Returns whether a key was actually removed.
    pub async fn delete_within(&self, key: &str, timeout: Duration) -> Result<bool> {
        let removed: i64 = self
            .round_trip(timeout, |mut conn| async move { conn.del::<_, i64>(key).await })
            .await?;
        Ok(removed > 0)
    }

    // =========================================================================
    // SORTED SET OPERATIONS
    // =========================================================================

    /// `ZADD`: last write wins per member.
    pub async fn zadd_score(&self, set: &str, member: &str, score: f64) -> Result<()> {
        self.round_trip(self.op_timeout, |mut conn| async move {
            conn.zadd(set, member, score).await
        })
        .await
    }

    /// `ZREVRANGE ... WITHSCORES` for the first `limit` members.
    pub async fn zrevrange_top(&self, set: &str, limit: usize) -> Result<Vec<(String, f64)>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let stop = isize::try_from(limit - 1).unwrap_or(isize::MAX);
        self.round_trip(self.op_timeout, |mut conn| async move {
            conn.zrevrange_withscores::<_, Vec<(String, f64)>>(set, 0, stop).await
        })
        .await
    }

    pub async fn zcard(&self, set: &str) -> Result<usize> {
        self.round_trip(self.op_timeout, |mut conn| async move { conn.zcard::<_, usize>(set).await })
            .await
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Run one command against a fresh handle to the shared connection,
    /// bounded by `timeout`. Counts as one backend operation either way.
    async fn round_trip<T, F, Fut>(&self, timeout: Duration, op: F) -> Result<T>
    where
        F: FnOnce(ConnectionManager) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        if let Some(metrics) = &self.metrics {
            metrics.record_backend_op();
        }

        match tokio::time::timeout(timeout, op(self.conn.clone())).await {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => Err(CacheError::timeout(timeout)),
        }
    }

    fn absorb(&self, op: &'static str, key: &str, err: &CacheError) {
        let total = self.absorbed.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::warn!(
            op,
            key,
            kind = err.kind(),
            error = %err,
            absorbed_total = total,
            "Remote cache failure absorbed"
        );
    }
}
