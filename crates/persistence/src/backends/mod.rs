//! Database backend implementations.
//!
//! Each backend implements [`crate::core::AnalyticsStore`] and is gated
//! behind a feature flag.
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | SQLite | `sqlite` | Embedded database, in-memory or file-based |
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "sqlite")]
//! use hiremetrics_persistence::backends::sqlite::SqliteStore;
//!
//! # #[cfg(feature = "sqlite")]
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::in_memory()?;
//!
//! // Or use a file-based database
//! let store = SqliteStore::open("./data/jobs.db")?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "sqlite")]
pub mod sqlite;
