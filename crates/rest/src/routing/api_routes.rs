//! API route configuration.
//!
//! Defines all routes for the analytics API.

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};
use hiremetrics_persistence::core::AnalyticsStore;

use crate::error::RestError;
use crate::handlers;
use crate::state::AppState;

/// Creates all analytics API routes.
///
/// # Routes
///
/// ## System
/// - `GET /health` - Health check
///
/// ## Dashboard (`/api/dashboard`)
/// - `GET /top-companies`
/// - `GET /companies-seniority-distribution`
/// - `GET /companies-remote-percentage`
/// - `GET /companies-jobs-timeline`
/// - `GET /companies-top-skills`
/// - `GET /companies-kpis`
/// - `GET /available-companies`
/// - `GET /top-publishers`
/// - `GET /publishers-kpis`
/// - `GET /publishers-seniority-distribution`
/// - `GET /publishers-companies-matrix`
/// - `GET /publishers-timeline`
/// - `GET /direct-vs-indirect-distribution`
/// - `GET /available-publishers`
/// - `GET /top-skills`
/// - `GET /skills-trend`
/// - `GET /available-skills`
/// - `GET /available-seniority-levels`
/// - `GET /available-positions`
/// - `GET /locations`
/// - `GET /job-locations-geo`
/// - `GET /employment-type-distribution`
///
/// ## Cache (`/api/cache`)
/// - `GET /status`
/// - `POST /clear`
///
/// Unmatched paths answer 404 with `{"detail": "Not found"}`.
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: AnalyticsStore + 'static,
{
    Router::new()
        .route("/health", get(handlers::health_handler::<S>))
        .nest("/api/dashboard", dashboard_routes::<S>())
        .nest("/api/cache", cache_routes::<S>())
        .fallback(not_found)
        .with_state(state)
}

/// Any unmatched path, including unknown dashboard endpoints.
async fn not_found(uri: Uri) -> RestError {
    RestError::NotFound {
        path: uri.path().to_string(),
    }
}

fn dashboard_routes<S>() -> Router<AppState<S>>
where
    S: AnalyticsStore + 'static,
{
    Router::new()
        .route("/top-companies", get(handlers::top_companies_handler::<S>))
        .route(
            "/companies-seniority-distribution",
            get(handlers::companies_seniority_distribution_handler::<S>),
        )
        .route(
            "/companies-remote-percentage",
            get(handlers::companies_remote_percentage_handler::<S>),
        )
        .route(
            "/companies-jobs-timeline",
            get(handlers::companies_jobs_timeline_handler::<S>),
        )
        .route(
            "/companies-top-skills",
            get(handlers::companies_top_skills_handler::<S>),
        )
        .route("/companies-kpis", get(handlers::companies_kpis_handler::<S>))
        .route(
            "/available-companies",
            get(handlers::available_companies_handler::<S>),
        )
        .route("/top-publishers", get(handlers::top_publishers_handler::<S>))
        .route("/publishers-kpis", get(handlers::publishers_kpis_handler::<S>))
        .route(
            "/publishers-seniority-distribution",
            get(handlers::publishers_seniority_distribution_handler::<S>),
        )
        .route(
            "/publishers-companies-matrix",
            get(handlers::publishers_companies_matrix_handler::<S>),
        )
        .route(
            "/publishers-timeline",
            get(handlers::publishers_timeline_handler::<S>),
        )
        .route(
            "/direct-vs-indirect-distribution",
            get(handlers::direct_vs_indirect_distribution_handler::<S>),
        )
        .route(
            "/available-publishers",
            get(handlers::available_publishers_handler::<S>),
        )
        .route("/top-skills", get(handlers::top_skills_handler::<S>))
        .route("/skills-trend", get(handlers::skills_trend_handler::<S>))
        .route(
            "/available-skills",
            get(handlers::available_skills_handler::<S>),
        )
        .route(
            "/available-seniority-levels",
            get(handlers::available_seniority_levels_handler::<S>),
        )
        .route(
            "/available-positions",
            get(handlers::available_positions_handler::<S>),
        )
        .route("/locations", get(handlers::locations_handler::<S>))
        .route(
            "/job-locations-geo",
            get(handlers::job_locations_geo_handler::<S>),
        )
        .route(
            "/employment-type-distribution",
            get(handlers::employment_type_distribution_handler::<S>),
        )
}

fn cache_routes<S>() -> Router<AppState<S>>
where
    S: AnalyticsStore + 'static,
{
    Router::new()
        .route("/status", get(handlers::cache_status_handler::<S>))
        .route("/clear", post(handlers::cache_clear_handler::<S>))
}
