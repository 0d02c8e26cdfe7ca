//! Location and employment type handlers.

use axum::{extract::State, response::Response};
use hiremetrics_persistence::core::AnalyticsStore;
use hiremetrics_persistence::dashboard::{self, LOCATIONS_GEO_LIMIT, LOCATIONS_LIMIT};
use tracing::debug;

use super::rows::{fetch_json, ok_json};
use crate::error::RestResult;
use crate::extractors::DashboardQuery;
use crate::state::AppState;

/// Handler for the distinct posting locations.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/locations?limit=100&...filters`
///
/// # Response
///
/// `[{"title": "<city>", "state": "<state>"}]`
pub async fn locations_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit = query.limit(LOCATIONS_LIMIT)?;
    debug!(limit, "Processing locations request");

    let statement = dashboard::locations(query.filters(), limit)?;
    Ok(ok_json(fetch_json(state.store(), &statement).await?))
}

/// Handler for posting counts per location, for the map view.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/job-locations-geo?limit=500&...filters`
///
/// # Response
///
/// `[{"job_city": ..., "job_state": ..., "job_count": ...}]`, busiest first.
pub async fn job_locations_geo_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit = query.limit(LOCATIONS_GEO_LIMIT)?;
    debug!(limit, "Processing job locations geo request");

    let statement = dashboard::job_locations_geo(query.filters(), limit)?;
    Ok(ok_json(fetch_json(state.store(), &statement).await?))
}

/// Handler for the employment type breakdown.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/employment-type-distribution?...filters`
pub async fn employment_type_distribution_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    debug!("Processing employment type distribution request");

    let statement = dashboard::employment_type_distribution(query.filters())?;
    Ok(ok_json(fetch_json(state.store(), &statement).await?))
}
