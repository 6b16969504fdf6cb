//! # Metrics Module
//!
//! Process-wide request/cache counters with on-demand latency statistics.

pub mod aggregator;
pub mod stats;

pub use aggregator::{Metrics, SharedMetrics};
pub use stats::{average, percentile};
