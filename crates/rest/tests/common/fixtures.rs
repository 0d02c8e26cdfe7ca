//! Test data fixtures.

use chrono::NaiveDate;
use hiremetrics_persistence::backends::sqlite::SqliteStore;
use hiremetrics_persistence::types::JobPosting;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Five postings across three employers and one job board repost.
///
/// | id | employer | seniority | remote | city | type | skills |
/// |----|----------|-----------|--------|------|------|--------|
/// | j1 | Acme | Senior | yes | Austin | Full-time | Python, SQL |
/// | j2 | Acme | Junior | no | Austin | Full-time | Python |
/// | j3 | Globex | Senior | yes | Denver | Contract | SQL, Tableau |
/// | j4 | LinkedIn Jobs (platform) | Mid | no | Seattle | Full-time | Python |
/// | j5 | Initech | Senior | no | - | Part-time | - |
pub fn sample_jobs() -> Vec<JobPosting> {
    vec![
        JobPosting::new("j1", "Acme", date(2024, 1, 5))
            .with_title("Senior Data Engineer")
            .with_seniority("Senior")
            .with_position_query("data engineer")
            .with_remote(true)
            .with_location("Austin", "TX")
            .with_employment_type("Full-time")
            .with_skills(["Python", "SQL"])
            .with_apply_option("LinkedIn", false)
            .with_apply_option("Acme Careers", true),
        JobPosting::new("j2", "Acme", date(2024, 1, 10))
            .with_seniority("Junior")
            .with_position_query("data engineer")
            .with_location("Austin", "TX")
            .with_employment_type("Full-time")
            .with_skills(["Python"])
            .with_apply_option("LinkedIn", false),
        JobPosting::new("j3", "Globex", date(2024, 2, 1))
            .with_seniority("Senior")
            .with_position_query("data analyst")
            .with_remote(true)
            .with_location("Denver", "CO")
            .with_employment_type("Contract")
            .with_skills(["SQL", "Tableau"])
            .with_apply_option("Indeed", false),
        JobPosting::new("j4", "LinkedIn Jobs", date(2024, 2, 3))
            .with_publisher("LinkedIn", true)
            .with_seniority("Mid")
            .with_position_query("data engineer")
            .with_location("Seattle", "WA")
            .with_employment_type("Full-time")
            .with_skills(["Python"])
            .with_apply_option("LinkedIn", false),
        JobPosting::new("j5", "Initech", date(2024, 3, 1))
            .with_seniority("Senior")
            .with_position_query("data engineer")
            .with_employment_type("Part-time"),
    ]
}

/// An in-memory store seeded with [`sample_jobs`].
pub fn seeded_store() -> SqliteStore {
    let store = SqliteStore::in_memory().expect("Failed to create SQLite store");
    store.init_schema().expect("Failed to initialize schema");
    store
        .insert_jobs(&sample_jobs())
        .expect("Failed to seed jobs");
    store
}
