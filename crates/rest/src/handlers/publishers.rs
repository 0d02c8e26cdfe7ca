//! Job board handlers.
//!
//! A `publisher` filter narrows the apply options counted here, except for
//! the top publishers ranking where it selects whole postings.

use std::time::Duration;

use axum::{extract::State, response::Response};
use hiremetrics_persistence::cache::CacheKey;
use hiremetrics_persistence::core::AnalyticsStore;
use hiremetrics_persistence::dashboard::{
    self, MATRIX_COMPANIES_LIMIT, MATRIX_PUBLISHERS_LIMIT, PUBLISHERS_SENIORITY_LIMIT,
    PUBLISHERS_TIMELINE_LIMIT, TOP_PUBLISHERS_LIMIT,
};
use tracing::debug;

use super::rows::{fetch_cached, fetch_json, ok_json};
use crate::error::RestResult;
use crate::extractors::DashboardQuery;
use crate::state::AppState;

/// Cache lifetime of the top publishers ranking.
pub const TOP_PUBLISHERS_TTL: Duration = Duration::from_secs(300);

/// Cache lifetime of the publisher option list.
pub const AVAILABLE_PUBLISHERS_TTL: Duration = Duration::from_secs(600);

/// Handler for the publishers ranking.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/top-publishers?limit=20&...filters`
///
/// # Response
///
/// `[{"publisher": ..., "publication_count": ..., "unique_jobs_count": ...}]`
pub async fn top_publishers_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit = query.limit(TOP_PUBLISHERS_LIMIT)?;
    debug!(limit, "Processing top publishers request");

    let key = CacheKey::new("top_publishers", "top_publishers")
        .kwarg("limit", &limit)
        .kwarg("filters", query.filters())
        .build();
    let statement = dashboard::top_publishers(query.filters(), limit)?;

    let body = fetch_cached(&state, &key, TOP_PUBLISHERS_TTL, &statement).await?;
    Ok(ok_json(body))
}

/// Handler for the publisher KPI tiles.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/publishers-kpis?...filters`
///
/// # Response
///
/// A single object with `total_publishers`, `avg_publishers_per_job`,
/// `biggest_coverage_publisher`, `biggest_coverage_count` and
/// `direct_percentage`.
pub async fn publishers_kpis_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    debug!("Processing publishers KPIs request");

    let kpis = dashboard::fetch_publisher_kpis(state.store(), query.filters()).await?;
    Ok(ok_json(serde_json::to_value(kpis)?))
}

/// Handler for the seniority breakdown of the top publishers.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/publishers-seniority-distribution?limit=10&...filters`
pub async fn publishers_seniority_distribution_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit = query.limit(PUBLISHERS_SENIORITY_LIMIT)?;
    debug!(limit, "Processing publishers seniority distribution request");

    let statement = dashboard::publishers_seniority_distribution(query.filters(), limit)?;
    Ok(ok_json(fetch_json(state.store(), &statement).await?))
}

/// Handler for the publisher by company matrix.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/publishers-companies-matrix?limit_publishers=15&limit_companies=15&...filters`
pub async fn publishers_companies_matrix_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit_publishers = query.limit(MATRIX_PUBLISHERS_LIMIT)?;
    let limit_companies = query.limit(MATRIX_COMPANIES_LIMIT)?;
    debug!(
        limit_publishers,
        limit_companies, "Processing publishers companies matrix request"
    );

    let statement =
        dashboard::publishers_companies_matrix(query.filters(), limit_publishers, limit_companies)?;
    Ok(ok_json(fetch_json(state.store(), &statement).await?))
}

/// Handler for daily posting counts of the top publishers.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/publishers-timeline?limit=10&...filters`
pub async fn publishers_timeline_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit = query.limit(PUBLISHERS_TIMELINE_LIMIT)?;
    debug!(limit, "Processing publishers timeline request");

    let statement = dashboard::publishers_timeline(query.filters(), limit)?;
    Ok(ok_json(fetch_json(state.store(), &statement).await?))
}

/// Handler for the direct versus indirect apply option split.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/direct-vs-indirect-distribution?...filters`
///
/// # Response
///
/// `[{"application_type": "Direct" | "Indirect", "count": ..., "percentage": ...}]`
pub async fn direct_vs_indirect_distribution_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    debug!("Processing direct vs indirect distribution request");

    let statement = dashboard::direct_vs_indirect_distribution(query.filters())?;
    Ok(ok_json(fetch_json(state.store(), &statement).await?))
}

/// Handler for the distinct publishers behind the publisher dropdown.
///
/// Only `search_position_query` narrows the list.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/available-publishers?search_position_query=...`
pub async fn available_publishers_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    debug!("Processing available publishers request");

    let key = CacheKey::new("available_publishers", "available_publishers")
        .kwarg(
            "search_position_query",
            &query.filters().search_position_query,
        )
        .build();
    let statement = dashboard::available_publishers(query.filters())?;

    let body = fetch_cached(&state, &key, AVAILABLE_PUBLISHERS_TTL, &statement).await?;
    Ok(ok_json(body))
}
