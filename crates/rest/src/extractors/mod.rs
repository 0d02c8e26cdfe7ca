//! Axum extractors for dashboard requests.
//!
//! - [`DashboardQuery`] - Extract and validate dashboard filter parameters

mod dashboard_query;

pub use dashboard_query::DashboardQuery;
