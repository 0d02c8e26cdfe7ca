//! HTTP request handlers for the analytics API.
//!
//! This module contains handlers for every endpoint:
//!
//! - [`companies`] - Company rankings, timelines, skills, remote share and KPIs
//! - [`publishers`] - Job board rankings, KPIs, timelines and apply option mix
//! - [`skills`] - Skill rankings, trends and filter option lists
//! - [`geography`] - Locations, map data and employment type breakdown
//! - [`cache`] - Result cache administration
//! - [`health`] - Health check endpoint

pub mod cache;
pub mod companies;
pub mod geography;
pub mod health;
pub mod publishers;
mod rows;
pub mod skills;

// Re-export handlers for convenience
pub use cache::{cache_clear_handler, cache_status_handler};
pub use companies::{
    available_companies_handler, companies_jobs_timeline_handler, companies_kpis_handler,
    companies_remote_percentage_handler, companies_seniority_distribution_handler,
    companies_top_skills_handler, top_companies_handler,
};
pub use geography::{
    employment_type_distribution_handler, job_locations_geo_handler, locations_handler,
};
pub use health::health_handler;
pub use publishers::{
    available_publishers_handler, direct_vs_indirect_distribution_handler,
    publishers_companies_matrix_handler, publishers_kpis_handler,
    publishers_seniority_distribution_handler, publishers_timeline_handler,
    top_publishers_handler,
};
pub use skills::{
    available_positions_handler, available_seniority_levels_handler, available_skills_handler,
    skills_trend_handler, top_skills_handler,
};
