//! HireMetrics Persistence Layer
//!
//! This crate holds everything between an HTTP query string and a database
//! row for the HireMetrics job-market analytics API.
//!
//! # Architecture
//!
//! - [`validation`] - typed validators for untrusted filter values
//! - [`assembly`] - parameterized statement assembly from validated predicates
//! - [`cache`] - in-memory result cache with per-entry TTL
//! - [`dashboard`] - the dashboard query catalogue, one builder per endpoint
//! - [`core`] - the [`AnalyticsStore`](core::AnalyticsStore) trait
//! - [`backends`] - store implementations (SQLite)
//! - [`types`] - job posting records
//! - [`error`] - error types for all operations
//!
//! # Request flow
//!
//! ```text
//! RawFilters ──validate──▶ DashboardFilters ──predicates──▶ FilterSet
//!                                                             │
//!                     base / tail templates ──▶ QueryAssembler ──▶ AssembledQuery
//!                                                                        │
//!                                   ResultCache::get_or_compute ◀── AnalyticsStore::fetch_rows
//! ```
//!
//! Validation and assembly are synchronous and pure; the store call is the
//! only suspension point.
//!
//! # Backend Features
//!
//! - `sqlite` (default) - SQLite with in-memory and file modes
//!
//! # Quick Start
//!
//! ```
//! use hiremetrics_persistence::dashboard::{self, DashboardFilters, RawFilters, TOP_SKILLS_LIMIT};
//!
//! let raw = RawFilters {
//!     job_posted_at_date_from: Some("2024-01-01".to_string()),
//!     skills: Some("Python,SQL".to_string()),
//!     ..Default::default()
//! };
//!
//! let filters = DashboardFilters::from_raw(&raw)?;
//! let limit = TOP_SKILLS_LIMIT.resolve(raw.limit.as_deref())?;
//! let query = dashboard::top_skills(&filters, limit)?;
//!
//! assert!(query.sql.contains("skill IN (:skills_0, :skills_1)"));
//! # Ok::<(), hiremetrics_persistence::StorageError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod assembly;
pub mod backends;
pub mod cache;
pub mod core;
pub mod dashboard;
pub mod error;
pub mod types;
pub mod validation;

// Re-export commonly used types at crate root
pub use assembly::{AssembledQuery, QueryAssembler, SqlParam};
pub use cache::{CacheKey, ResultCache};
pub use core::{AnalyticsStore, Row};
pub use error::{StorageError, StorageResult};
pub use types::JobPosting;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
