//! Request latency tracking.

use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use cache_store::SharedMetrics;
use std::time::Instant;

/// Record the wall-clock latency of every request passing through.
pub async fn track_latency(
    State(metrics): State<SharedMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    metrics.record_request(start.elapsed());
    response
}
