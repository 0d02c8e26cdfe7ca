//! SQLite backend implementation.
//!
//! Supports both in-memory databases (for tests) and file-based databases
//! (for development and small deployments).
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use hiremetrics_persistence::backends::sqlite::SqliteStore;
//! use hiremetrics_persistence::types::JobPosting;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::in_memory()?;
//! store.init_schema()?;
//!
//! store.insert_jobs(&[
//!     JobPosting::new("job-1", "Acme", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
//!         .with_skills(["Python", "SQL"]),
//! ])?;
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE job_dashboard_base (
//!     job_id TEXT PRIMARY KEY,
//!     job_title TEXT,
//!     employer_name TEXT NOT NULL,
//!     job_publisher TEXT,
//!     is_job_platform INTEGER NOT NULL DEFAULT 0,
//!     job_employment_type TEXT,
//!     job_is_remote INTEGER NOT NULL DEFAULT 0,
//!     job_posted_at_date TEXT NOT NULL,  -- YYYY-MM-DD
//!     job_city TEXT,
//!     job_state TEXT,
//!     seniority TEXT,
//!     search_position_query TEXT
//! );
//!
//! CREATE TABLE job_skills (
//!     job_id TEXT NOT NULL,
//!     skill TEXT NOT NULL,
//!     seniority TEXT,
//!     search_position_query TEXT,
//!     job_posted_at_date TEXT NOT NULL,
//!     skill_count INTEGER NOT NULL DEFAULT 1,
//!     PRIMARY KEY (job_id, skill)
//! );
//!
//! CREATE TABLE job_apply_options (
//!     job_id TEXT NOT NULL,
//!     publisher TEXT NOT NULL,
//!     is_direct INTEGER NOT NULL DEFAULT 0,
//!     PRIMARY KEY (job_id, publisher)
//! );
//! ```

mod backend;
mod schema;
mod storage;

pub use backend::{SqliteStore, SqliteStoreConfig};
