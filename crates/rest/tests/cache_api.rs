//! Integration tests for result caching and the cache admin endpoints.

mod common;

use std::sync::atomic::Ordering;

use serde_json::Value;

use common::fixtures::seeded_store;
use common::stores::CountingStore;
use common::{test_server, test_server_with_config};
use hiremetrics_rest::ServerConfig;

#[tokio::test]
async fn test_identical_requests_compute_once() {
    let (store, calls) = CountingStore::new(seeded_store());
    let server = test_server(store);

    let first: Value = server
        .get("/api/dashboard/top-companies")
        .add_query_param("limit", "2")
        .await
        .json();
    let second: Value = server
        .get("/api/dashboard/top-companies")
        .add_query_param("limit", "2")
        .await
        .json();

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_differing_arguments_compute_again() {
    let (store, calls) = CountingStore::new(seeded_store());
    let server = test_server(store);

    server
        .get("/api/dashboard/top-skills")
        .await
        .assert_status_ok();
    server
        .get("/api/dashboard/top-skills")
        .add_query_param("limit", "3")
        .await
        .assert_status_ok();
    server
        .get("/api/dashboard/top-skills")
        .add_query_param("seniority", "Senior")
        .await
        .assert_status_ok();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_absent_and_missing_filters_share_entry() {
    let (store, calls) = CountingStore::new(seeded_store());
    let server = test_server(store);

    server
        .get("/api/dashboard/available-skills")
        .await
        .assert_status_ok();
    server
        .get("/api/dashboard/available-skills")
        .add_query_param("employer_name", "null")
        .await
        .assert_status_ok();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_option_lists_key_on_position_only() {
    let (store, calls) = CountingStore::new(seeded_store());
    let server = test_server(store);

    for path in [
        "/api/dashboard/available-publishers",
        "/api/dashboard/available-companies",
    ] {
        server.get(path).await.assert_status_ok();
        server
            .get(path)
            .add_query_param("employer_name", "Acme")
            .await
            .assert_status_ok();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let analyst: Value = server
        .get("/api/dashboard/available-publishers")
        .add_query_param("search_position_query", "data analyst")
        .await
        .json();
    assert_eq!(analyst, serde_json::json!([{"publisher": "Indeed"}]));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_uncached_endpoint_always_computes() {
    let (store, calls) = CountingStore::new(seeded_store());
    let server = test_server(store);

    for _ in 0..2 {
        server
            .get("/api/dashboard/locations")
            .await
            .assert_status_ok();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_disabled_cache_always_computes() {
    let (store, calls) = CountingStore::new(seeded_store());
    let config = ServerConfig {
        cache_enabled: false,
        ..ServerConfig::for_testing()
    };
    let server = test_server_with_config(store, config);

    for _ in 0..2 {
        server
            .get("/api/dashboard/top-publishers")
            .await
            .assert_status_ok();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let status: Value = server.get("/api/cache/status").await.json();
    assert_eq!(status["cache_enabled"], false);
    assert_eq!(status["cache_size"], 0);
}

#[tokio::test]
async fn test_cache_status() {
    let server = test_server(seeded_store());

    let status: Value = server.get("/api/cache/status").await.json();
    assert_eq!(status["cache_size"], 0);
    assert_eq!(status["cache_enabled"], true);
    assert_eq!(status["default_ttl"], 300);

    server.get("/api/dashboard/available-positions").await;
    server.get("/api/dashboard/available-positions").await;

    let status: Value = server.get("/api/cache/status").await.json();
    assert_eq!(status["cache_size"], 1);
    assert_eq!(status["hits"], 1);
    assert_eq!(status["misses"], 1);
}

#[tokio::test]
async fn test_cache_clear() {
    let (store, calls) = CountingStore::new(seeded_store());
    let server = test_server(store);

    server.get("/api/dashboard/top-companies").await;

    let response = server.post("/api/cache/clear").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Cache cleared successfully");

    let status: Value = server.get("/api/cache/status").await.json();
    assert_eq!(status["cache_size"], 0);

    server.get("/api/dashboard/top-companies").await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
