//! Job posting types.
//!
//! This module defines [`JobPosting`], the row shape the dashboard queries
//! aggregate over, together with its child records.

// Field names mirror the serving table columns
#![allow(missing_docs)]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A job posting as stored in the serving tables.
///
/// A posting is one row of `job_dashboard_base`. Its skills become rows of
/// `job_skills` and its apply options rows of `job_apply_options`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hiremetrics_persistence::types::JobPosting;
///
/// let job = JobPosting::new("job-1", "Acme", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
///     .with_title("Data Engineer")
///     .with_seniority("Senior")
///     .with_remote(true)
///     .with_skills(["Python", "SQL"])
///     .with_apply_option("LinkedIn", false);
///
/// assert_eq!(job.skills.len(), 2);
/// assert_eq!(job.apply_options[0].publisher, "LinkedIn");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_id: String,
    #[serde(default)]
    pub job_title: Option<String>,
    pub employer_name: String,
    /// The site the posting was collected from.
    #[serde(default)]
    pub job_publisher: Option<String>,
    /// Whether `job_publisher` is a job board rather than an employer site.
    #[serde(default)]
    pub is_job_platform: bool,
    #[serde(default)]
    pub job_employment_type: Option<String>,
    #[serde(default)]
    pub job_is_remote: bool,
    pub job_posted_at_date: NaiveDate,
    #[serde(default)]
    pub job_city: Option<String>,
    #[serde(default)]
    pub job_state: Option<String>,
    #[serde(default)]
    pub seniority: Option<String>,
    /// The search term the posting was collected under.
    #[serde(default)]
    pub search_position_query: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub apply_options: Vec<ApplyOption>,
}

/// A place where a job can be applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOption {
    pub publisher: String,
    /// True when the option applies directly on the employer's site.
    #[serde(default)]
    pub is_direct: bool,
}

impl JobPosting {
    /// Creates a posting with the required fields and everything else empty.
    pub fn new(
        job_id: impl Into<String>,
        employer_name: impl Into<String>,
        job_posted_at_date: NaiveDate,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            job_title: None,
            employer_name: employer_name.into(),
            job_publisher: None,
            is_job_platform: false,
            job_employment_type: None,
            job_is_remote: false,
            job_posted_at_date,
            job_city: None,
            job_state: None,
            seniority: None,
            search_position_query: None,
            skills: Vec::new(),
            apply_options: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.job_title = Some(title.into());
        self
    }

    /// Sets the collecting site and whether it is a job board.
    pub fn with_publisher(mut self, publisher: impl Into<String>, is_job_platform: bool) -> Self {
        self.job_publisher = Some(publisher.into());
        self.is_job_platform = is_job_platform;
        self
    }

    pub fn with_employment_type(mut self, employment_type: impl Into<String>) -> Self {
        self.job_employment_type = Some(employment_type.into());
        self
    }

    pub fn with_remote(mut self, remote: bool) -> Self {
        self.job_is_remote = remote;
        self
    }

    pub fn with_location(mut self, city: impl Into<String>, state: impl Into<String>) -> Self {
        self.job_city = Some(city.into());
        self.job_state = Some(state.into());
        self
    }

    pub fn with_seniority(mut self, seniority: impl Into<String>) -> Self {
        self.seniority = Some(seniority.into());
        self
    }

    pub fn with_position_query(mut self, query: impl Into<String>) -> Self {
        self.search_position_query = Some(query.into());
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills.extend(skills.into_iter().map(Into::into));
        self
    }

    pub fn with_apply_option(mut self, publisher: impl Into<String>, is_direct: bool) -> Self {
        self.apply_options.push(ApplyOption {
            publisher: publisher.into(),
            is_direct,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let job: JobPosting = serde_json::from_str(
            r#"{"job_id": "j1", "employer_name": "Acme", "job_posted_at_date": "2024-01-15"}"#,
        )
        .unwrap();
        assert_eq!(job.job_id, "j1");
        assert!(!job.job_is_remote);
        assert!(job.skills.is_empty());
        assert_eq!(
            job.job_posted_at_date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }
}
