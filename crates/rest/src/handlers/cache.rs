//! Result cache administration handlers.

use axum::{extract::State, response::Response};
use hiremetrics_persistence::core::AnalyticsStore;
use tracing::info;

use super::rows::ok_json;
use crate::error::RestResult;
use crate::state::AppState;

/// Handler for the cache status.
///
/// # HTTP Request
///
/// `GET [base]/api/cache/status`
///
/// # Response
///
/// `{"cache_size", "cache_enabled", "default_ttl", "hits", "misses"}`, with
/// `default_ttl` in seconds.
pub async fn cache_status_handler<S>(State(state): State<AppState<S>>) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let cache = state.cache();
    let stats = cache.stats();

    Ok(ok_json(serde_json::json!({
        "cache_size": stats.size,
        "cache_enabled": cache.is_enabled(),
        "default_ttl": cache.default_ttl().as_secs(),
        "hits": stats.hits,
        "misses": stats.misses,
    })))
}

/// Handler that drops every cached result.
///
/// # HTTP Request
///
/// `POST [base]/api/cache/clear`
pub async fn cache_clear_handler<S>(State(state): State<AppState<S>>) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let dropped = state.cache().size();
    state.cache().clear();
    info!(dropped, "Result cache cleared");

    Ok(ok_json(serde_json::json!({
        "message": "Cache cleared successfully"
    })))
}
