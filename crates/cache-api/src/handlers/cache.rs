//! Key/value endpoints and the cache-aside demo.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use cache_store::Source;
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;

use crate::{AppState, error::ApiError, error::ApiResult};

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TtlQuery {
    pub ttl_secs: Option<u64>,
}

/// `GET /data?id=K`: serve from cache, or from the slow backend and cache it.
pub async fn cache_aside(
    State(state): State<AppState>,
    Query(query): Query<DataQuery>,
) -> ApiResult<String> {
    let key = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("missing id param".to_string()))?;

    let latency = state.backend_latency;
    let loaded = state
        .cache
        .get_or_load(&key, state.cache.default_ttl(), || async {
            tokio::time::sleep(latency).await;
            Ok::<_, Infallible>(format!("Value-for-{key}"))
        })
        .await;

    let (value, source) = match loaded {
        Ok(found) => found,
        Err(never) => match never {},
    };

    Ok(match source {
        Source::Cache => format!("From Cache: {value}\n"),
        Source::Loader => format!("From DB: {value}\n"),
    })
}

/// `GET /cache/{key}`
pub async fn get_key(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<String> {
    state.cache.get(&key).await.ok_or(ApiError::NotFound(key))
}

/// `PUT /cache/{key}?ttl_secs=T` with the value as the request body.
pub async fn put_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<TtlQuery>,
    body: String,
) -> StatusCode {
    let ttl = query
        .ttl_secs
        .map_or(state.cache.default_ttl(), Duration::from_secs);
    state.cache.set(&key, &body, ttl).await;
    StatusCode::NO_CONTENT
}

/// `DELETE /cache/{key}`. Succeeds whether or not the key existed.
pub async fn delete_key(State(state): State<AppState>, Path(key): Path<String>) -> StatusCode {
    state.cache.delete(&key).await;
    StatusCode::NO_CONTENT
}
