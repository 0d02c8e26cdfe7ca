//! Common test utilities for REST API testing.
//!
//! - [`fixtures`] - Seeded job postings and stores
//! - [`stores`] - Store wrappers that count or fail calls

#![allow(dead_code)]

pub mod fixtures;
pub mod stores;

use std::sync::Arc;

use axum_test::TestServer;
use hiremetrics_persistence::core::AnalyticsStore;
use hiremetrics_rest::{AppState, ServerConfig, create_app_with_state};

/// Builds a test server around `store` with the testing configuration.
pub fn test_server<S: AnalyticsStore + 'static>(store: S) -> TestServer {
    test_server_with_config(store, ServerConfig::for_testing())
}

/// Builds a test server around `store` with a custom configuration.
pub fn test_server_with_config<S: AnalyticsStore + 'static>(
    store: S,
    config: ServerConfig,
) -> TestServer {
    let state = AppState::new(Arc::new(store), config);
    TestServer::new(create_app_with_state(state)).expect("Failed to create test server")
}
