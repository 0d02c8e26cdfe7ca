//! Skill handlers, including the option lists behind the filter dropdowns.

use std::time::Duration;

use axum::{extract::State, response::Response};
use hiremetrics_persistence::cache::CacheKey;
use hiremetrics_persistence::core::AnalyticsStore;
use hiremetrics_persistence::dashboard::{self, SKILLS_TREND_LIMIT, TOP_SKILLS_LIMIT};
use tracing::debug;

use super::rows::{fetch_cached, fetch_json, ok_json};
use crate::error::RestResult;
use crate::extractors::DashboardQuery;
use crate::state::AppState;

/// Cache lifetime of the top skills ranking.
pub const TOP_SKILLS_TTL: Duration = Duration::from_secs(300);

/// Cache lifetime of the skill and seniority option lists.
pub const OPTIONS_TTL: Duration = Duration::from_secs(600);

/// Cache lifetime of the position option list.
pub const POSITIONS_TTL: Duration = Duration::from_secs(1800);

/// Handler for the skills ranking with its seniority breakdown.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/top-skills?limit=10&...filters`
///
/// # Response
///
/// `[{"skill": ..., "seniority": ..., "skill_count": ...}]`. Without a
/// seniority filter each row also carries the skill's `total_count`.
pub async fn top_skills_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit = query.limit(TOP_SKILLS_LIMIT)?;
    debug!(limit, "Processing top skills request");

    let key = CacheKey::new("top_skills", "top_skills")
        .kwarg("limit", &limit)
        .kwarg("filters", query.filters())
        .build();
    let statement = dashboard::top_skills(query.filters(), limit)?;

    let body = fetch_cached(&state, &key, TOP_SKILLS_TTL, &statement).await?;
    Ok(ok_json(body))
}

/// Handler for daily skill counts.
///
/// Traces the `skills` filter when given, otherwise the top `limit` skills.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/skills-trend?limit=50&...filters`
///
/// # Response
///
/// `[{"job_posted_at_date": ..., "skill": ..., "seniority": ..., "skill_count": ...}]`
pub async fn skills_trend_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    let limit = query.limit(SKILLS_TREND_LIMIT)?;
    debug!(limit, "Processing skills trend request");

    let statement = dashboard::skills_trend(query.filters(), limit)?;
    Ok(ok_json(fetch_json(state.store(), &statement).await?))
}

/// Handler for the distinct skill names.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/available-skills?...filters`
pub async fn available_skills_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    debug!("Processing available skills request");

    let key = CacheKey::new("available_skills", "available_skills")
        .kwarg("filters", query.filters())
        .build();
    let statement = dashboard::available_skills(query.filters())?;

    let body = fetch_cached(&state, &key, OPTIONS_TTL, &statement).await?;
    Ok(ok_json(body))
}

/// Handler for the distinct seniority levels.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/available-seniority-levels?...filters`
pub async fn available_seniority_levels_handler<S>(
    State(state): State<AppState<S>>,
    query: DashboardQuery,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    debug!("Processing available seniority levels request");

    let key = CacheKey::new("available_seniority", "available_seniority_levels")
        .kwarg("filters", query.filters())
        .build();
    let statement = dashboard::available_seniority_levels(query.filters())?;

    let body = fetch_cached(&state, &key, OPTIONS_TTL, &statement).await?;
    Ok(ok_json(body))
}

/// Handler for the distinct search positions.
///
/// Takes no filters.
///
/// # HTTP Request
///
/// `GET [base]/api/dashboard/available-positions`
pub async fn available_positions_handler<S>(
    State(state): State<AppState<S>>,
) -> RestResult<Response>
where
    S: AnalyticsStore,
{
    debug!("Processing available positions request");

    let key = CacheKey::new("available_positions", "available_positions").build();
    let statement = dashboard::available_positions()?;

    let body = fetch_cached(&state, &key, POSITIONS_TTL, &statement).await?;
    Ok(ok_json(body))
}
