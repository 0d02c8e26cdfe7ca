//! Health check endpoint handler.
//!
//! Provides a simple health check endpoint for monitoring and load balancers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hiremetrics_persistence::core::AnalyticsStore;
use tracing::debug;

use crate::error::RestResult;
use crate::state::AppState;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "HireMetrics Jobs API";

/// Handler for the health check endpoint.
///
/// Pings the store so that a dead database is reported to load balancers.
///
/// # HTTP Request
///
/// `GET [base]/health`
///
/// # Response
///
/// - `200 OK` - Server and database are reachable
/// - `503 Service Unavailable` - The database cannot be reached
pub async fn health_handler<S>(State(state): State<AppState<S>>) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    debug!("Processing health check request");

    state.store().ping().await?;

    let health_response = serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "backend": state.store().backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    Ok((StatusCode::OK, Json(health_response)).into_response())
}
