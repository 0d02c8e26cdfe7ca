//! Company analytics handlers.
//!
//! Known job platforms that show up as employers are left out of every
//! company ranking.

use std::time::Duration;

use axum::{extract::State, response::Response};
use hiremetrics_persistence::cache::CacheKey;
use hiremetrics_persistence::core::AnalyticsStore;
use hiremetrics_persistence::dashboard::{
    self, COMPANIES_TIMELINE_LIMIT, COMPANIES_TOP_SKILLS_LIMIT, COMPANY_SKILLS_LIMIT,
    REMOTE_PERCENTAGE_LIMIT, SENIORITY_DISTRIBUTION_LIMIT, TOP_COMPANIES_LIMIT,
};
use tracing::debug;

use super::rows::{fetch_cached, fetch_json, ok_json};
use crate::error::RestResult;
use crate::extractors::DashboardQuery;
use crate::state::AppState;

/// Cache lifetime of the top companies ranking.
pub const TOP_COMPANIES_TTL: Duration = Duration::from_secs(300);

/// Cache lifetime of the company option list.
pub const AVAILABLE_COMPANIES_TTL: Duration = Duration::from_secs(600);

/// Handler for the top companies ranking.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/top-companies?limit=20&...filters`
///
/// # Response
///
/// `[{"employer_name": ..., "job_count": ...}]`, largest first.
pub async fn top_companies_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit = query.limit(TOP_COMPANIES_LIMIT)?;
    debug!(limit, "Processing top companies request");

    let key = CacheKey::new("top_companies", "top_companies")
        .kwarg("limit", &limit)
        .kwarg("filters", query.filters())
        .build();
    let statement = dashboard::top_companies(query.filters(), limit)?;

    let body = fetch_cached(&state, &key, TOP_COMPANIES_TTL, &statement).await?;
    Ok(ok_json(body))
}

/// Handler for the seniority breakdown of the top companies.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/companies-seniority-distribution?limit=10&...filters`
pub async fn companies_seniority_distribution_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit = query.limit(SENIORITY_DISTRIBUTION_LIMIT)?;
    debug!(limit, "Processing companies seniority distribution request");

    let statement = dashboard::companies_seniority_distribution(query.filters(), limit)?;
    Ok(ok_json(fetch_json(state.store(), &statement).await?))
}

/// Handler for the remote share per company.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/companies-remote-percentage?limit=20&...filters`
pub async fn companies_remote_percentage_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit = query.limit(REMOTE_PERCENTAGE_LIMIT)?;
    debug!(limit, "Processing companies remote percentage request");

    let statement = dashboard::companies_remote_percentage(query.filters(), limit)?;
    Ok(ok_json(fetch_json(state.store(), &statement).await?))
}

/// Handler for daily posting counts of the top companies.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/companies-jobs-timeline?limit=5&...filters`
pub async fn companies_jobs_timeline_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit = query.limit(COMPANIES_TIMELINE_LIMIT)?;
    debug!(limit, "Processing companies jobs timeline request");

    let statement = dashboard::companies_jobs_timeline(query.filters(), limit)?;
    Ok(ok_json(fetch_json(state.store(), &statement).await?))
}

/// Handler for the skills word cloud of the top companies.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/companies-top-skills?limit=10&skills_limit=10&...filters`
///
/// # Response
///
/// `[{"name": "<skill>", "value": <postings>}]`
pub async fn companies_top_skills_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit = query.limit(COMPANIES_TOP_SKILLS_LIMIT)?;
    let skills_limit = query.limit(COMPANY_SKILLS_LIMIT)?;
    debug!(limit, skills_limit, "Processing companies top skills request");

    let statement = dashboard::companies_top_skills(query.filters(), limit, skills_limit)?;
    Ok(ok_json(fetch_json(state.store(), &statement).await?))
}

/// Handler for the distinct employers behind the company dropdown.
///
/// Only `search_position_query` narrows the list.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/available-companies?search_position_query=...`
pub async fn available_companies_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    debug!("Processing available companies request");

    let key = CacheKey::new("available_companies", "available_companies")
        .kwarg(
            "search_position_query",
            &query.filters().search_position_query,
        )
        .build();
    let statement = dashboard::available_companies(query.filters())?;

    let body = fetch_cached(&state, &key, AVAILABLE_COMPANIES_TTL, &statement).await?;
    Ok(ok_json(body))
}

/// Handler for the company KPI tiles.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/companies-kpis?...filters`
///
/// # Response
///
/// A single object with `total_jobs`, `remote_percentage`,
/// `avg_skills_per_job` and `distinct_companies`.
pub async fn companies_kpis_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    debug!("Processing companies KPIs request");

    let kpis = dashboard::fetch_company_kpis(state.store(), query.filters()).await?;
    Ok(ok_json(serde_json::to_value(kpis)?))
}
