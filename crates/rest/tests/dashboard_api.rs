//! Integration tests for the dashboard endpoints.
//!
//! Each test runs against an in-memory SQLite store seeded with
//! [`common::fixtures::sample_jobs`].

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::fixtures::seeded_store;
use common::test_server;

fn column(body: &Value, name: &str) -> Vec<Value> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|row| row[name].clone())
        .collect()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let server = test_server(seeded_store());

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "sqlite");
}

// ============================================================================
// Companies
// ============================================================================

#[tokio::test]
async fn test_top_companies() {
    let server = test_server(seeded_store());

    let response = server.get("/api/dashboard/top-companies").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        column(&body, "employer_name"),
        [json!("Acme"), json!("Globex"), json!("Initech")]
    );
    assert_eq!(body[0]["job_count"], 2);
}

#[tokio::test]
async fn test_top_companies_with_filters() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/top-companies")
        .add_query_param("skills", "Tableau,Python")
        .add_query_param("job_is_remote", "true")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        column(&body, "employer_name"),
        [json!("Acme"), json!("Globex")]
    );
}

#[tokio::test]
async fn test_absent_filter_values_are_ignored() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/top-companies")
        .add_query_param("employer_name", "")
        .add_query_param("seniority", "null")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_companies_seniority_distribution() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/companies-seniority-distribution")
        .add_query_param("limit", "1")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(column(&body, "employer_name"), [json!("Acme"), json!("Acme")]);
    assert_eq!(
        column(&body, "seniority"),
        [json!("Senior"), json!("Junior")]
    );
}

#[tokio::test]
async fn test_companies_remote_percentage() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/companies-remote-percentage")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        column(&body, "employer_name"),
        [json!("Globex"), json!("Acme")]
    );
    assert_eq!(body[1]["remote_percentage"], 50.0);
}

#[tokio::test]
async fn test_companies_remote_percentage_for_one_employer() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/companies-remote-percentage")
        .add_query_param("employer_name", "Initech")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!([{
            "employer_name": "Initech",
            "total_jobs": 1,
            "remote_jobs": 0,
            "remote_percentage": 0.0
        }])
    );
}

#[tokio::test]
async fn test_companies_jobs_timeline() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/companies-jobs-timeline")
        .add_query_param("limit", "1")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!([
            {"job_posted_at_date": "2024-01-05", "employer_name": "Acme", "job_count": 1},
            {"job_posted_at_date": "2024-01-10", "employer_name": "Acme", "job_count": 1}
        ])
    );
}

#[tokio::test]
async fn test_companies_top_skills() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/companies-top-skills")
        .add_query_param("limit", "1")
        .add_query_param("skills_limit", "5")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!([{"name": "Python", "value": 2}, {"name": "SQL", "value": 1}])
    );
}

#[tokio::test]
async fn test_available_companies() {
    let server = test_server(seeded_store());

    let response = server.get("/api/dashboard/available-companies").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        column(&body, "employer_name"),
        [json!("Acme"), json!("Globex"), json!("Initech")]
    );
}

#[tokio::test]
async fn test_companies_kpis() {
    let server = test_server(seeded_store());

    let response = server.get("/api/dashboard/companies-kpis").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "total_jobs": 5,
            "remote_percentage": 40.0,
            "avg_skills_per_job": 1.2,
            "distinct_companies": 4
        })
    );
}

// ============================================================================
// Publishers and Skills
// ============================================================================

#[tokio::test]
async fn test_top_publishers() {
    let server = test_server(seeded_store());

    let response = server.get("/api/dashboard/top-publishers").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        column(&body, "publisher"),
        [json!("LinkedIn"), json!("Acme Careers"), json!("Indeed")]
    );
    assert_eq!(body[0]["unique_jobs_count"], 3);
}

#[tokio::test]
async fn test_publishers_kpis() {
    let server = test_server(seeded_store());

    let response = server.get("/api/dashboard/publishers-kpis").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "total_publishers": 3,
            "avg_publishers_per_job": 1.0,
            "biggest_coverage_publisher": "LinkedIn",
            "biggest_coverage_count": 3,
            "direct_percentage": 25.0
        })
    );
}

#[tokio::test]
async fn test_publishers_seniority_distribution() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/publishers-seniority-distribution")
        .add_query_param("limit", "1")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        column(&body, "seniority"),
        [json!("Senior"), json!("Mid"), json!("Junior")]
    );
    assert!(column(&body, "publisher").iter().all(|p| p == "LinkedIn"));
}

#[tokio::test]
async fn test_publishers_companies_matrix() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/publishers-companies-matrix")
        .add_query_param("publisher", "LinkedIn")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!([
            {"publisher": "LinkedIn", "employer_name": "Acme", "job_count": 2},
            {"publisher": "LinkedIn", "employer_name": "LinkedIn Jobs", "job_count": 1}
        ])
    );
}

#[tokio::test]
async fn test_publishers_timeline() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/publishers-timeline")
        .add_query_param("publisher", "Indeed")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!([{"job_posted_at_date": "2024-02-01", "publisher": "Indeed", "job_count": 1}])
    );
}

#[tokio::test]
async fn test_direct_vs_indirect_distribution() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/direct-vs-indirect-distribution")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!([
            {"application_type": "Direct", "count": 1, "percentage": 20.0},
            {"application_type": "Indirect", "count": 4, "percentage": 80.0}
        ])
    );
}

#[tokio::test]
async fn test_available_publishers() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/available-publishers")
        .add_query_param("search_position_query", "data analyst")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body, json!([{"publisher": "Indeed"}]));
}

#[tokio::test]
async fn test_skills_trend() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/skills-trend")
        .add_query_param("skills", "Tableau")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!([{
            "job_posted_at_date": "2024-02-01",
            "skill": "Tableau",
            "seniority": "Senior",
            "skill_count": 1
        }])
    );
}

#[tokio::test]
async fn test_top_skills_for_seniority() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/top-skills")
        .add_query_param("seniority", "Senior")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        column(&body, "skill"),
        [json!("SQL"), json!("Python"), json!("Tableau")]
    );
    assert_eq!(body[0]["skill_count"], 2);
}

#[tokio::test]
async fn test_available_skills() {
    let server = test_server(seeded_store());

    let response = server.get("/api/dashboard/available-skills").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        column(&body, "skill"),
        [json!("Python"), json!("SQL"), json!("Tableau")]
    );
}

#[tokio::test]
async fn test_available_seniority_levels() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/available-seniority-levels")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        column(&body, "seniority"),
        [json!("Senior"), json!("Mid"), json!("Junior")]
    );
}

#[tokio::test]
async fn test_available_positions() {
    let server = test_server(seeded_store());

    let response = server.get("/api/dashboard/available-positions").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        column(&body, "search_position_query"),
        [json!("data analyst"), json!("data engineer")]
    );
}

// ============================================================================
// Geography
// ============================================================================

#[tokio::test]
async fn test_locations() {
    let server = test_server(seeded_store());

    let response = server.get("/api/dashboard/locations").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!([
            {"title": "Austin", "state": "TX"},
            {"title": "Denver", "state": "CO"},
            {"title": "Seattle", "state": "WA"}
        ])
    );
}

#[tokio::test]
async fn test_locations_by_state() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/locations")
        .add_query_param("states", "CO, WA")
        .add_query_param("limit", "1")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body, json!([{"title": "Denver", "state": "CO"}]));
}

#[tokio::test]
async fn test_employment_type_distribution() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/employment-type-distribution")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        column(&body, "job_employment_type"),
        [json!("Full-time"), json!("Contract"), json!("Part-time")]
    );
    assert_eq!(body[0]["percentage"], 60.0);
}

#[tokio::test]
async fn test_job_locations_geo() {
    let server = test_server(seeded_store());

    let response = server
        .get("/api/dashboard/job-locations-geo")
        .add_query_param("limit", "1")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!([{"job_city": "Austin", "job_state": "TX", "job_count": 2}])
    );
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_unknown_route() {
    let server = test_server(seeded_store());

    let response = server.get("/api/dashboard/unknown").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body, json!({"detail": "Not found"}));

    let response = server.get("/nowhere").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body, json!({"detail": "Not found"}));
}

// ============================================================================
// File-backed store
// ============================================================================

#[tokio::test]
async fn test_file_backed_store() {
    use hiremetrics_persistence::backends::sqlite::SqliteStore;

    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("jobs.db")).unwrap();
    store.init_schema().unwrap();
    store
        .insert_jobs(&common::fixtures::sample_jobs())
        .unwrap();

    let server = test_server(store);

    let response = server.get("/api/dashboard/companies-kpis").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["total_jobs"], 5);
}
