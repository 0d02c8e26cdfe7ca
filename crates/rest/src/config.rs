//! Server configuration for the analytics REST API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `REST_SERVER_PORT` | 8080 | Server port |
//! | `REST_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `REST_LOG_LEVEL` | info | Log level |
//! | `REST_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `REST_ENABLE_CORS` | true | Enable CORS |
//! | `REST_CORS_ORIGINS` | * | Allowed origins |
//! | `REST_CORS_METHODS` | GET,POST,OPTIONS | Allowed methods |
//! | `REST_CORS_HEADERS` | Content-Type,Authorization,Accept | Allowed headers |
//! | `REST_DATABASE_URL` | (in-memory) | SQLite database path |
//! | `REST_DB_MAX_CONNECTIONS` | 10 | Connection pool size |
//! | `REST_SEED_FILE` | (none) | JSON array of job postings loaded at startup |
//! | `REST_CACHE_ENABLED` | true | Cache dashboard results |
//! | `REST_CACHE_DEFAULT_TTL` | 300 | Default cache TTL (seconds) |
//!
//! # Example
//!
//! ```rust
//! use hiremetrics_rest::ServerConfig;
//!
//! // Create from environment
//! let config = ServerConfig::from_env();
//!
//! // Or create programmatically
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     cache_default_ttl: 60,
//!     ..Default::default()
//! };
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Server configuration for the analytics REST API.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "hiremetrics")]
#[command(about = "HireMetrics job-market analytics API")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "REST_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "REST_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "REST_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "REST_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "REST_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "REST_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "REST_CORS_METHODS", default_value = "GET,POST,OPTIONS")]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "REST_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept"
    )]
    pub cors_headers: String,

    /// SQLite database path. An in-memory database is used when unset.
    #[arg(long, env = "REST_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "REST_DB_MAX_CONNECTIONS", default_value = "10")]
    pub db_max_connections: u32,

    /// JSON file with an array of job postings to load at startup.
    #[arg(long, env = "REST_SEED_FILE")]
    pub seed_file: Option<PathBuf>,

    /// Cache dashboard results.
    #[arg(long, env = "REST_CACHE_ENABLED", default_value = "true")]
    pub cache_enabled: bool,

    /// Default cache TTL in seconds.
    #[arg(long, env = "REST_CACHE_DEFAULT_TTL", default_value = "300")]
    pub cache_default_ttl: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept".to_string(),
            database_url: None,
            db_max_connections: 10,
            seed_file: None,
            cache_enabled: true,
            cache_default_ttl: 300,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the default cache TTL.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_default_ttl)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.db_max_connections == 0 {
            errors.push("Database max connections cannot be 0".to_string());
        }

        if self.cache_enabled && self.cache_default_ttl == 0 {
            errors.push("Cache default TTL cannot be 0 when the cache is enabled".to_string());
        }

        if let Some(path) = &self.seed_file
            && !path.is_file()
        {
            errors.push(format!("Seed file not found: {}", path.display()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0 and disables features that might interfere
    /// with tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            database_url: None,
            db_max_connections: 1,
            seed_file: None,
            cache_enabled: true,
            cache_default_ttl: 300,
        }
    }
}
