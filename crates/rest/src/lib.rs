//! # hiremetrics-rest - Job-Market Analytics HTTP API
//!
//! This crate exposes the HireMetrics dashboard queries over HTTP. Every
//! request goes through the same pipeline: the query string is validated
//! into typed filters, a parameterized statement is assembled, and the rows
//! are fetched from the store, optionally through the result cache.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hiremetrics_rest::{create_app, ServerConfig};
//! use hiremetrics_persistence::backends::sqlite::SqliteStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Create a store
//!     let store = SqliteStore::open("jobs.db")?;
//!     store.init_schema()?;
//!
//!     // Create the Axum application
//!     let app = create_app_with_config(store, ServerConfig::default());
//!
//!     // Start the server
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Endpoint | Method | Cached |
//! |----------|--------|--------|
//! | `/health` | GET | no |
//! | `/api/dashboard/top-companies` | GET | 5 min |
//! | `/api/dashboard/companies-seniority-distribution` | GET | no |
//! | `/api/dashboard/companies-remote-percentage` | GET | no |
//! | `/api/dashboard/companies-jobs-timeline` | GET | no |
//! | `/api/dashboard/companies-top-skills` | GET | no |
//! | `/api/dashboard/companies-kpis` | GET | no |
//! | `/api/dashboard/available-companies` | GET | 10 min |
//! | `/api/dashboard/top-publishers` | GET | 5 min |
//! | `/api/dashboard/publishers-kpis` | GET | no |
//! | `/api/dashboard/publishers-seniority-distribution` | GET | no |
//! | `/api/dashboard/publishers-companies-matrix` | GET | no |
//! | `/api/dashboard/publishers-timeline` | GET | no |
//! | `/api/dashboard/direct-vs-indirect-distribution` | GET | no |
//! | `/api/dashboard/available-publishers` | GET | 10 min |
//! | `/api/dashboard/top-skills` | GET | 5 min |
//! | `/api/dashboard/skills-trend` | GET | no |
//! | `/api/dashboard/available-skills` | GET | 10 min |
//! | `/api/dashboard/available-seniority-levels` | GET | 10 min |
//! | `/api/dashboard/available-positions` | GET | 30 min |
//! | `/api/dashboard/locations` | GET | no |
//! | `/api/dashboard/job-locations-geo` | GET | no |
//! | `/api/dashboard/employment-type-distribution` | GET | no |
//! | `/api/cache/status` | GET | - |
//! | `/api/cache/clear` | POST | - |
//!
//! ## Error Handling
//!
//! Errors are returned as `{"detail": "..."}` with these status codes:
//!
//! | HTTP Status | Cause |
//! |-------------|-------|
//! | 400 | A filter value failed validation |
//! | 404 | No such endpoint |
//! | 500 | Unexpected failure (details are logged, never returned) |
//! | 503 | The database cannot be reached |
//!
//! ## Architecture
//!
//! - [`error`] - Error types and response mapping
//! - [`config`] - Server configuration
//! - [`state`] - Application state (store, cache, configuration)
//! - [`handlers`] - HTTP request handlers for each endpoint
//! - [`middleware`] - Axum middleware (security headers)
//! - [`extractors`] - Axum extractors for validated filters
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use hiremetrics_persistence::core::AnalyticsStore;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// This is a convenience function that creates the app with default settings.
/// For more control, use [`create_app_with_config`].
pub fn create_app<S>(store: S) -> Router
where
    S: AnalyticsStore + 'static,
{
    create_app_with_config(store, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// The result cache is created here, enabled or disabled per
/// `config.cache_enabled`.
///
/// # Example
///
/// ```rust,ignore
/// use hiremetrics_rest::{create_app_with_config, ServerConfig};
/// use hiremetrics_persistence::backends::sqlite::SqliteStore;
///
/// let store = SqliteStore::in_memory()?;
/// let config = ServerConfig {
///     port: 3000,
///     cache_enabled: false,
///     ..Default::default()
/// };
/// let app = create_app_with_config(store, config);
/// ```
pub fn create_app_with_config<S>(store: S, config: ServerConfig) -> Router
where
    S: AnalyticsStore + 'static,
{
    info!(
        "Creating analytics API server with backend: {}",
        store.backend_name()
    );

    let state = AppState::new(Arc::new(store), config);
    create_app_with_state(state)
}

/// Creates the Axum application from an existing state.
///
/// Useful when the caller needs a handle on the cache or store after the
/// router has been built.
pub fn create_app_with_state<S>(state: AppState<S>) -> Router
where
    S: AnalyticsStore + 'static,
{
    let config = state.config().clone();

    // Build the router with all API routes
    let router = routing::create_routes(state);

    // Build middleware stack
    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = router.layer(axum::middleware::from_fn(
        middleware::security_headers_middleware,
    ));

    // Add CORS if enabled
    let router = if config.enable_cors {
        let cors = build_cors_layer(&config);
        router.layer(cors)
    } else {
        router
    };

    // Apply remaining middleware
    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    // Configure origins
    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    // Configure methods
    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    // Configure headers
    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over `level` when set.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "hiremetrics_rest={level},hiremetrics_persistence={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
