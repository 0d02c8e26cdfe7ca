//! SQLite schema definitions and migrations.

use rusqlite::Connection;

use crate::error::{BackendError, StorageError, StorageResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_schema_v1(conn)?;
        set_schema_version(conn, 1)?;
        migrate_schema(conn, 1)?;
    } else if current_version < SCHEMA_VERSION {
        migrate_schema(conn, current_version)?;
    }

    Ok(())
}

fn schema_error(what: &str, e: rusqlite::Error) -> StorageError {
    StorageError::Backend(BackendError::Internal {
        backend_name: "sqlite".to_string(),
        message: format!("Failed to {}: {}", what, e),
        source: Some(Box::new(e)),
    })
}

/// Get the current schema version.
fn get_schema_version(conn: &Connection) -> StorageResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| schema_error("create schema_version table", e))?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

/// Set the schema version.
fn set_schema_version(conn: &Connection, version: i32) -> StorageResult<()> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| schema_error("clear schema_version", e))?;

    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )
    .map_err(|e| schema_error("set schema_version", e))?;

    Ok(())
}

/// Create the initial schema (version 1).
fn create_schema_v1(conn: &Connection) -> StorageResult<()> {
    // One row per posting; the table every dashboard aggregate reads
    conn.execute(
        "CREATE TABLE IF NOT EXISTS job_dashboard_base (
            job_id TEXT PRIMARY KEY,
            job_title TEXT,
            employer_name TEXT NOT NULL,
            job_publisher TEXT,
            is_job_platform INTEGER NOT NULL DEFAULT 0,
            job_employment_type TEXT,
            job_is_remote INTEGER NOT NULL DEFAULT 0,
            job_posted_at_date TEXT NOT NULL,
            job_city TEXT,
            job_state TEXT,
            seniority TEXT,
            search_position_query TEXT
        )",
        [],
    )
    .map_err(|e| schema_error("create job_dashboard_base table", e))?;

    // Skills carry the posting's date, seniority and search term so skill
    // aggregates filter without a join
    conn.execute(
        "CREATE TABLE IF NOT EXISTS job_skills (
            job_id TEXT NOT NULL,
            skill TEXT NOT NULL,
            seniority TEXT,
            search_position_query TEXT,
            job_posted_at_date TEXT NOT NULL,
            skill_count INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (job_id, skill),
            FOREIGN KEY (job_id) REFERENCES job_dashboard_base(job_id) ON DELETE CASCADE
        )",
        [],
    )
    .map_err(|e| schema_error("create job_skills table", e))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS job_apply_options (
            job_id TEXT NOT NULL,
            publisher TEXT NOT NULL,
            is_direct INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (job_id, publisher),
            FOREIGN KEY (job_id) REFERENCES job_dashboard_base(job_id) ON DELETE CASCADE
        )",
        [],
    )
    .map_err(|e| schema_error("create job_apply_options table", e))?;

    Ok(())
}

/// Run schema migrations from current version to latest.
fn migrate_schema(conn: &Connection, from_version: i32) -> StorageResult<()> {
    let mut version = from_version;

    while version < SCHEMA_VERSION {
        match version {
            1 => migrate_v1_to_v2(conn)?,
            _ => {
                return Err(StorageError::Backend(BackendError::MigrationError {
                    message: format!("Unknown schema version: {}", version),
                }));
            }
        }
        version += 1;
        set_schema_version(conn, version)?;
    }

    Ok(())
}

/// Migrate from schema version 1 to version 2.
///
/// Adds indexes for the dashboard filter columns.
fn migrate_v1_to_v2(conn: &Connection) -> StorageResult<()> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_jobs_posted ON job_dashboard_base(job_posted_at_date)",
        "CREATE INDEX IF NOT EXISTS idx_jobs_employer ON job_dashboard_base(employer_name)",
        "CREATE INDEX IF NOT EXISTS idx_jobs_position ON job_dashboard_base(search_position_query)",
        "CREATE INDEX IF NOT EXISTS idx_jobs_platform ON job_dashboard_base(is_job_platform, job_publisher)",
        "CREATE INDEX IF NOT EXISTS idx_skills_skill ON job_skills(skill, seniority)",
        "CREATE INDEX IF NOT EXISTS idx_skills_posted ON job_skills(job_posted_at_date)",
        "CREATE INDEX IF NOT EXISTS idx_apply_publisher ON job_apply_options(publisher)",
    ];

    for index_sql in &indexes {
        conn.execute(index_sql, [])
            .map_err(|e| schema_error("create index", e))?;
    }

    Ok(())
}

/// Drop all tables (for testing).
#[cfg(test)]
pub fn drop_all_tables(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS job_apply_options;
         DROP TABLE IF EXISTS job_skills;
         DROP TABLE IF EXISTS job_dashboard_base;
         DROP TABLE IF EXISTS schema_version;",
    )
    .map_err(|e| schema_error("drop tables", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_schema_initialization() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let tables = table_names(&conn);
        assert!(tables.contains(&"job_dashboard_base".to_string()));
        assert!(tables.contains(&"job_skills".to_string()));
        assert!(tables.contains(&"job_apply_options".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_migration_from_v1_adds_indexes() {
        let conn = Connection::open_in_memory().unwrap();
        get_schema_version(&conn).unwrap();
        create_schema_v1(&conn).unwrap();
        set_schema_version(&conn, 1).unwrap();

        initialize_schema(&conn).unwrap();

        let index_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name LIKE 'idx_jobs_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(index_count, 4);
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_drop_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        drop_all_tables(&conn).unwrap();
        assert!(table_names(&conn).is_empty());
    }
}
