//! # Cache API
//!
//! Thin HTTP wiring over the cache core: a cache-aside demo endpoint, raw
//! key access, a score ranking and the metrics summary.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Axum HTTP Server                         │
//! │          (latency tracking middleware on every route        │
//! │                 except /metrics/summary)                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      AppState                               │
//! │            (Cache, RankingStore, Metrics)                   │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │   In-process store      │   │        Redis                 │
//! │  (RwLock + sweeper)     │   │  (native TTL, sorted set)    │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use cache_store::{Cache, RankingStore, SharedMetrics};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::{ApiError, ApiResult};

/// Sorted-set / table name used for the score ranking
pub const RANKING_NAME: &str = "leaderboard";

/// Application state shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub cache: Cache,
    pub ranking: RankingStore,
    pub metrics: SharedMetrics,
    /// Simulated latency of the slow backend behind `/data`
    pub backend_latency: Duration,
}

impl AppState {
    pub fn new(cache: Cache, metrics: SharedMetrics, backend_latency: Duration) -> Self {
        let ranking = cache.ranking(RANKING_NAME);
        Self {
            cache,
            ranking,
            metrics,
            backend_latency,
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Build the Axum router
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let tracked = Router::new()
        .route("/data", get(handlers::cache::cache_aside))
        .route(
            "/cache/{key}",
            get(handlers::cache::get_key)
                .put(handlers::cache::put_key)
                .delete(handlers::cache::delete_key),
        )
        .route("/score/{id}", post(handlers::ranking::post_score))
        .route("/leaderboard/top", get(handlers::ranking::top))
        .route_layer(axum::middleware::from_fn_with_state(
            state.metrics.clone(),
            middleware::track_latency,
        ));

    Router::new()
        .merge(tracked)
        .route("/metrics/summary", get(handlers::metrics::summary))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(parsed))
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
