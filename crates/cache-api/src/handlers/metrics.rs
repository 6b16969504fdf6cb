//! Metrics summary endpoint.

use axum::{Json, extract::State};
use cache_domain::MetricsSummary;

use crate::AppState;

/// `GET /metrics/summary`. Not itself tracked.
pub async fn summary(State(state): State<AppState>) -> Json<MetricsSummary> {
    Json(state.metrics.summarize())
}
