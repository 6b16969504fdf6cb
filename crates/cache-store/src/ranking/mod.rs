//! # Ranking Module
//!
//! Top-N views over (identifier, score) pairs, held in process or in a
//! Redis sorted set.

pub mod memory;

pub use memory::MemoryRanking;

use cache_domain::{BackendKind, ScoreEntry, ScoreUpdate};
use std::sync::Arc;

use crate::error::{CacheError, Result};
#[cfg(feature = "redis")]
use crate::store::RemoteStore;

/// N used when a caller does not specify one.
pub const DEFAULT_TOP_N: usize = 10;

/// Parse a caller-supplied N. Absent or blank means [`DEFAULT_TOP_N`].
///
/// # Errors
///
/// Returns `CacheError::InvalidInput` for non-numeric or non-positive input.
pub fn parse_limit(raw: Option<&str>) -> Result<usize> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_TOP_N);
    };

    match raw.parse::<i64>() {
        Ok(n) if n > 0 => usize::try_from(n)
            .map_err(|_| CacheError::InvalidInput(format!("limit {n} is too large"))),
        _ => Err(CacheError::InvalidInput(format!(
            "invalid number of top entries: '{raw}'"
        ))),
    }
}

/// Score table on the same backend as the cache.
#[derive(Debug, Clone)]
pub enum RankingStore {
    InProcess(Arc<MemoryRanking>),
    #[cfg(feature = "redis")]
    Remote { store: RemoteStore, key: String },
}

impl RankingStore {
    pub fn in_memory() -> Self {
        Self::InProcess(Arc::new(MemoryRanking::new()))
    }

    /// Sorted set `key` on the remote store.
    #[cfg(feature = "redis")]
    pub fn remote(store: RemoteStore, key: impl Into<String>) -> Self {
        Self::Remote {
            store,
            key: key.into(),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        match self {
            Self::InProcess(_) => BackendKind::InProcess,
            #[cfg(feature = "redis")]
            Self::Remote { .. } => BackendKind::Remote,
        }
    }

    /// Set `identifier`'s score, replacing any previous one.
    ///
    /// The remote variant cannot tell whether the score changed and always
    /// reports `Changed`.
    ///
    /// # Errors
    ///
    /// `CacheError::InvalidInput` for a non-finite score; remote failures
    /// otherwise.
    pub async fn record(&self, identifier: &str, score: f64) -> Result<ScoreUpdate> {
        if !score.is_finite() {
            return Err(CacheError::InvalidInput(format!(
                "score for '{identifier}' must be finite"
            )));
        }

        match self {
            Self::InProcess(ranking) => Ok(ranking.record(identifier, score)),
            #[cfg(feature = "redis")]
            Self::Remote { store, key } => {
                store.zadd_score(key, identifier, score).await?;
                Ok(ScoreUpdate::Changed)
            }
        }
    }

    /// Up to `n` entries by descending score.
    ///
    /// # Errors
    ///
    /// `CacheError::InvalidInput` when `n` is zero; remote failures otherwise.
    pub async fn top_n(&self, n: usize) -> Result<Vec<ScoreEntry>> {
        if n == 0 {
            return Err(CacheError::InvalidInput(
                "number of top entries must be positive".to_string(),
            ));
        }

        match self {
            Self::InProcess(ranking) => Ok(ranking.top_n(n)),
            #[cfg(feature = "redis")]
            Self::Remote { store, key } => Ok(store
                .zrevrange_top(key, n)
                .await?
                .into_iter()
                .map(|(id, score)| ScoreEntry::new(id, score))
                .collect()),
        }
    }

    /// Number of ranked identifiers.
    pub async fn len(&self) -> Result<usize> {
        match self {
            Self::InProcess(ranking) => Ok(ranking.len()),
            #[cfg(feature = "redis")]
            Self::Remote { store, key } => store.zcard(key).await,
        }
    }
}
