//! AnalyticsStore implementation for SQLite.

use async_trait::async_trait;
use rusqlite::types::{ToSqlOutput, Value as SqliteValue, ValueRef};
use rusqlite::{ErrorCode, ToSql, params};
use serde_json::{Number, Value};
use tracing::{debug, warn};

use crate::assembly::{AssembledQuery, SqlParam};
use crate::core::{AnalyticsStore, Row};
use crate::error::{BackendError, StorageError, StorageResult};
use crate::types::JobPosting;

use super::SqliteStore;

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::Text(s) => s.to_sql(),
            SqlParam::Integer(i) => i.to_sql(),
            SqlParam::Bool(b) => b.to_sql(),
            SqlParam::Null => Ok(ToSqlOutput::Owned(SqliteValue::Null)),
        }
    }
}

/// Classifies a driver error. Busy or unreachable databases are transient.
fn driver_error(e: rusqlite::Error) -> StorageError {
    match &e {
        rusqlite::Error::SqliteFailure(failure, _)
            if matches!(
                failure.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen
            ) =>
        {
            StorageError::Backend(BackendError::Unavailable {
                backend_name: "sqlite".to_string(),
                message: e.to_string(),
            })
        }
        _ => StorageError::Backend(BackendError::QueryError {
            message: e.to_string(),
        }),
    }
}

/// Converts a column value to JSON. Binary values have no JSON form and
/// are rejected rather than guessed at.
fn to_json(value: ValueRef<'_>, column: &str) -> StorageResult<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(i) => Ok(Value::from(i)),
        ValueRef::Real(f) => Ok(Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)),
        ValueRef::Text(t) => Ok(Value::String(String::from_utf8_lossy(t).into_owned())),
        ValueRef::Blob(_) => Err(StorageError::Backend(BackendError::QueryError {
            message: format!("column {} holds binary data", column),
        })),
    }
}

impl SqliteStore {
    /// Inserts postings together with their skills and apply options.
    ///
    /// Runs in a single transaction; an existing posting with the same
    /// `job_id` is replaced.
    pub fn insert_jobs(&self, jobs: &[JobPosting]) -> StorageResult<usize> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction().map_err(driver_error)?;

        for job in jobs {
            let posted = job.job_posted_at_date.format("%Y-%m-%d").to_string();

            tx.execute(
                "DELETE FROM job_skills WHERE job_id = ?1",
                params![job.job_id],
            )
            .map_err(driver_error)?;
            tx.execute(
                "DELETE FROM job_apply_options WHERE job_id = ?1",
                params![job.job_id],
            )
            .map_err(driver_error)?;

            tx.execute(
                "INSERT OR REPLACE INTO job_dashboard_base (
                    job_id, job_title, employer_name, job_publisher, is_job_platform,
                    job_employment_type, job_is_remote, job_posted_at_date,
                    job_city, job_state, seniority, search_position_query
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    job.job_id,
                    job.job_title,
                    job.employer_name,
                    job.job_publisher,
                    job.is_job_platform,
                    job.job_employment_type,
                    job.job_is_remote,
                    posted,
                    job.job_city,
                    job.job_state,
                    job.seniority,
                    job.search_position_query,
                ],
            )
            .map_err(driver_error)?;

            for skill in &job.skills {
                tx.execute(
                    "INSERT INTO job_skills (
                        job_id, skill, seniority, search_position_query, job_posted_at_date
                    ) VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT (job_id, skill) DO UPDATE SET skill_count = skill_count + 1",
                    params![
                        job.job_id,
                        skill,
                        job.seniority,
                        job.search_position_query,
                        posted,
                    ],
                )
                .map_err(driver_error)?;
            }

            for option in &job.apply_options {
                tx.execute(
                    "INSERT OR REPLACE INTO job_apply_options (job_id, publisher, is_direct)
                     VALUES (?1, ?2, ?3)",
                    params![job.job_id, option.publisher, option.is_direct],
                )
                .map_err(driver_error)?;
            }
        }

        tx.commit().map_err(driver_error)?;
        debug!(count = jobs.len(), "Inserted job postings");
        Ok(jobs.len())
    }
}

#[async_trait]
impl AnalyticsStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_rows(&self, query: &AssembledQuery) -> StorageResult<Vec<Row>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(&query.sql).map_err(|e| {
            warn!(error = %e, "Failed to prepare statement");
            driver_error(e)
        })?;

        let names: Vec<String> = query.params.keys().map(|k| format!(":{}", k)).collect();
        let bound: Vec<(&str, &dyn ToSql)> = names
            .iter()
            .zip(query.params.values())
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect();

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query(bound.as_slice()).map_err(driver_error)?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().map_err(driver_error)? {
            let mut object = Row::new();
            for (i, column) in columns.iter().enumerate() {
                let value = row.get_ref(i).map_err(driver_error)?;
                object.insert(column.clone(), to_json(value, column)?);
            }
            results.push(object);
        }

        debug!(rows = results.len(), "Fetched rows");
        Ok(results)
    }

    async fn ping(&self) -> StorageResult<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| {
                StorageError::Backend(BackendError::Unavailable {
                    backend_name: "sqlite".to_string(),
                    message: e.to_string(),
                })
            })?;
        Ok(())
    }
}
