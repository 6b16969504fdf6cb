//! Metrics aggregator tracking request latency and cache effectiveness.

use cache_domain::{BackendKind, MetricsSummary};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::stats::{average, percentile};

#[derive(Debug, Default)]
struct MetricsState {
    request_count: u64,
    cache_hits: u64,
    cache_misses: u64,
    backend_ops: u64,
    /// Seconds, in completion order
    latencies: Vec<f64>,
}

/// Thread-safe counters plus an append-only latency log.
///
/// Every mutation takes one exclusive lock over the whole state. The
/// latency log grows without bound for the lifetime of the aggregator.
#[derive(Debug)]
pub struct Metrics {
    state: Mutex<MetricsState>,
    started: Instant,
    started_at: DateTime<Utc>,
    backend: Option<BackendKind>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MetricsState {
                latencies: Vec::with_capacity(1024),
                ..MetricsState::default()
            }),
            started: Instant::now(),
            started_at: Utc::now(),
            backend: None,
        }
    }

    /// Aggregator whose summaries are labelled with the active backend.
    pub fn for_backend(backend: BackendKind) -> Self {
        Self {
            backend: Some(backend),
            ..Self::new()
        }
    }

    /// Count a completed request and log its latency.
    pub fn record_request(&self, latency: Duration) {
        let mut state = self.state.lock();
        state.request_count += 1;
        state.latencies.push(latency.as_secs_f64());
    }

    pub fn record_hit(&self) {
        self.state.lock().cache_hits += 1;
    }

    pub fn record_miss(&self) {
        self.state.lock().cache_misses += 1;
    }

    /// Count one round trip to a remote backend.
    pub fn record_backend_op(&self) {
        self.state.lock().backend_ops += 1;
    }

    /// Snapshot counters and latency statistics.
    ///
    /// Copies the log under the lock and sorts the copy after releasing it,
    /// so cost is `O(n log n)` in recorded requests. Meant for periodic or
    /// on-demand use.
    pub fn summarize(&self) -> MetricsSummary {
        let (request_count, cache_hits, cache_misses, backend_ops, mut latencies) = {
            let state = self.state.lock();
            (
                state.request_count,
                state.cache_hits,
                state.cache_misses,
                state.backend_ops,
                state.latencies.clone(),
            )
        };

        latencies.sort_by(f64::total_cmp);

        MetricsSummary {
            total_requests: request_count,
            cache_hits,
            cache_misses,
            backend_ops,
            avg_latency: average(&latencies),
            p50_latency: percentile(&latencies, 50.0),
            p95_latency: percentile(&latencies, 95.0),
            p99_latency: percentile(&latencies, 99.0),
            uptime_seconds: self.started.elapsed().as_secs_f64(),
            started_at: self.started_at,
            backend: self.backend,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared metrics handle
pub type SharedMetrics = Arc<Metrics>;
