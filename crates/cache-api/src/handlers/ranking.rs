//! Score ranking endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use cache_domain::{BackendKind, ScoreEntry};
use cache_store::parse_limit;
use serde::Deserialize;

use crate::{AppState, error::ApiError, error::ApiResult};

#[derive(Debug, Deserialize)]
pub struct ScoreQuery {
    pub score: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub n: Option<String>,
}

/// `POST /score/{id}?score=S`
///
/// On the in-process ranking, re-posting an identical score counts as a
/// cache hit and anything else as a miss. The remote ranking counts backend
/// operations instead.
pub async fn post_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ScoreQuery>,
) -> ApiResult<StatusCode> {
    let score: f64 = query
        .score
        .as_deref()
        .map(str::trim)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ApiError::InvalidInput("invalid score".to_string()))?;

    let update = state.ranking.record(&id, score).await?;

    if state.ranking.backend_kind() == BackendKind::InProcess {
        if update.is_unchanged() {
            state.metrics.record_hit();
        } else {
            state.metrics.record_miss();
        }
    }

    Ok(StatusCode::OK)
}

/// `GET /leaderboard/top?n=N`, N defaulting to 10.
pub async fn top(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> ApiResult<Json<Vec<ScoreEntry>>> {
    let n = parse_limit(query.n.as_deref())?;
    Ok(Json(state.ranking.top_n(n).await?))
}
