//! HireMetrics analytics server.
//!
//! Serves the job-market dashboard API over HTTP.

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use hiremetrics_persistence::types::JobPosting;
use hiremetrics_rest::{ServerConfig, create_app_with_config, init_logging};
use tracing::info;

#[cfg(feature = "sqlite")]
use hiremetrics_persistence::backends::sqlite::{SqliteStore, SqliteStoreConfig};

/// Creates and initializes a SQLite store from the server configuration.
#[cfg(feature = "sqlite")]
fn create_sqlite_store(config: &ServerConfig) -> anyhow::Result<SqliteStore> {
    let db_path = config.database_url.as_deref().unwrap_or(":memory:");
    info!(database = %db_path, "Initializing SQLite store");

    let store_config = SqliteStoreConfig::default().with_max_connections(config.db_max_connections);
    let store = SqliteStore::with_config(db_path, store_config)?;
    store.init_schema()?;

    if let Some(path) = &config.seed_file {
        let loaded = store.insert_jobs(&load_jobs(path)?)?;
        info!(path = %path.display(), jobs = loaded, "Loaded seed postings");
    }

    Ok(store)
}

/// Reads a JSON array of job postings.
fn load_jobs(path: &Path) -> anyhow::Result<Vec<JobPosting>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse seed file {}", path.display()))
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        cache_enabled = config.cache_enabled,
        cache_default_ttl = config.cache_default_ttl,
        "Starting HireMetrics analytics server"
    );

    start(config).await
}

#[cfg(feature = "sqlite")]
async fn start(config: ServerConfig) -> anyhow::Result<()> {
    let store = create_sqlite_store(&config)?;
    let app = create_app_with_config(store, config.clone());
    serve(app, &config).await
}

/// Fallback when sqlite feature is not enabled.
#[cfg(not(feature = "sqlite"))]
async fn start(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The sqlite backend requires the 'sqlite' feature. \
         Build with: cargo build -p hiremetrics-server --features sqlite"
    )
}
