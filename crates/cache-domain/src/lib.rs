//! # Cache Comparison - Domain Model
//!
//! Value types shared between the cache core and the services that call
//! into it: backend selection, ranking entries and metrics snapshots.
//! These types carry no behaviour beyond parsing and formatting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// ENUMS
// =============================================================================

/// Which store sits behind the cache facade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// In-process map with TTL sweep
    #[default]
    InProcess,
    /// Network key/value service (Redis)
    Remote,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProcess => "in_process",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised backend name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cache backend '{0}' (expected one of: memory, inmemory, in_process, redis, remote)")]
pub struct ParseBackendError(pub String);

impl FromStr for BackendKind {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "inmemory" | "in_memory" | "in_process" | "local" => Ok(Self::InProcess),
            "redis" | "remote" => Ok(Self::Remote),
            other => Err(ParseBackendError(other.to_string())),
        }
    }
}

// =============================================================================
// RANKING
// =============================================================================

/// One ranked identifier. Uniqueness is per identifier; the latest score wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(rename = "user_id")]
    pub identifier: String,
    pub score: f64,
}

impl ScoreEntry {
    pub fn new(identifier: impl Into<String>, score: f64) -> Self {
        Self {
            identifier: identifier.into(),
            score,
        }
    }
}

/// Outcome of recording a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreUpdate {
    /// The identifier already held exactly this score
    Unchanged,
    /// New identifier, or a different score replaced the previous one
    Changed,
}

impl ScoreUpdate {
    #[must_use]
    pub const fn is_unchanged(self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

// =============================================================================
// METRICS
// =============================================================================

/// Point-in-time snapshot of the metrics aggregator.
///
/// Latencies and uptime are expressed in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub backend_ops: u64,
    pub avg_latency: f64,
    pub p50_latency: f64,
    pub p95_latency: f64,
    pub p99_latency: f64,
    pub uptime_seconds: f64,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,
}

impl MetricsSummary {
    /// Fraction of lookups that were hits, 0 when nothing was looked up.
    #[must_use]
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}
