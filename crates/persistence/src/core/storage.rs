//! Core analytics store trait.
//!
//! This module defines the [`AnalyticsStore`] trait, the single seam between
//! the request path and a database driver. A store executes an already
//! assembled, fully parameterized statement and hands back rows; it never
//! sees raw request input and never builds SQL itself.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::assembly::AssembledQuery;
use crate::error::StorageResult;

/// A result row: column name to value.
pub type Row = Map<String, Value>;

/// Executes assembled statements against a relational database.
///
/// # Example
///
/// ```ignore
/// use hiremetrics_persistence::assembly::QueryAssembler;
/// use hiremetrics_persistence::core::AnalyticsStore;
///
/// async fn count_jobs<S: AnalyticsStore>(store: &S) -> StorageResult<i64> {
///     let query = QueryAssembler::new("SELECT COUNT(*) AS n FROM job_dashboard_base").assemble()?;
///     let rows = store.fetch_rows(&query).await?;
///     Ok(rows[0]["n"].as_i64().unwrap_or(0))
/// }
/// ```
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Returns a human-readable name for this store backend.
    fn backend_name(&self) -> &'static str;

    /// Executes `query` and returns every row it produces.
    ///
    /// Driver failures are returned as [`crate::error::BackendError`];
    /// connectivity problems are classified so that
    /// [`crate::error::StorageError::is_transient`] reports them.
    async fn fetch_rows(&self, query: &AssembledQuery) -> StorageResult<Vec<Row>>;

    /// Checks that the database is reachable.
    async fn ping(&self) -> StorageResult<()>;
}

/// Extracts one column from each row, skipping rows where it is missing.
///
/// Used by endpoints that return a flat list of values, such as the
/// available skills.
pub fn column_values(rows: Vec<Row>, column: &str) -> Vec<Value> {
    rows.into_iter()
        .filter_map(|mut row| row.remove(column))
        .collect()
}
