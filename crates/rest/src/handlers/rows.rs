//! Shared plumbing between handlers and the store.

use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hiremetrics_persistence::assembly::AssembledQuery;
use hiremetrics_persistence::core::AnalyticsStore;
use serde_json::Value;

use crate::error::RestResult;
use crate::state::AppState;

/// Runs a statement and returns its rows as a JSON array.
pub(crate) async fn fetch_json<S: AnalyticsStore + ?Sized>(
    store: &S,
    query: &AssembledQuery,
) -> RestResult<Value> {
    let rows = store.fetch_rows(query).await?;
    Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
}

/// Like [`fetch_json`], but served from the result cache when a fresh entry
/// exists under `key`.
pub(crate) async fn fetch_cached<S: AnalyticsStore>(
    state: &AppState<S>,
    key: &str,
    ttl: Duration,
    query: &AssembledQuery,
) -> RestResult<Value> {
    state
        .cache()
        .get_or_compute(key, Some(ttl), || fetch_json(state.store(), query))
        .await
}

pub(crate) fn ok_json(body: Value) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}
