//! Dashboard query catalogue.
//!
//! Each dashboard endpoint has one builder here that turns validated
//! [`DashboardFilters`] and a limit into an [`AssembledQuery`]. Builders only
//! combine developer-authored templates with [`Predicate`]s; request values
//! reach the driver exclusively as bound parameters.
//!
//! Filters are validated once, up front, by [`DashboardFilters::from_raw`].
//! Validation fails fast on the first bad field, so a partially validated
//! filter list is never executed.
//!
//! # Example
//!
//! ```
//! use hiremetrics_persistence::dashboard::{self, DashboardFilters, RawFilters, TOP_COMPANIES_LIMIT};
//!
//! let raw = RawFilters {
//!     seniority: Some("Senior".to_string()),
//!     job_is_remote: Some("true".to_string()),
//!     ..Default::default()
//! };
//! let filters = DashboardFilters::from_raw(&raw)?;
//! let limit = TOP_COMPANIES_LIMIT.resolve(raw.limit.as_deref())?;
//! let query = dashboard::top_companies(&filters, limit)?;
//!
//! assert!(query.sql.contains("seniority = :seniority"));
//! assert_eq!(query.params.len(), 3);
//! # Ok::<(), hiremetrics_persistence::error::StorageError>(())
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assembly::{AssembledQuery, Column, FilterSet, Predicate, QueryAssembler, SqlParam};
use crate::core::{AnalyticsStore, Row};
use crate::error::{AssemblyError, StorageResult, ValidationError};
use crate::validation::{
    DEFAULT_MAX_LIST_ITEMS, DEFAULT_MAX_TEXT_LENGTH, is_absent, validate_boolean, validate_date,
    validate_integer, validate_list, validate_text,
};

const JOB_ID: Column = Column::new("job_id");
const POSTED_AT: Column = Column::new("job_posted_at_date");
const EMPLOYER: Column = Column::new("employer_name");
const SENIORITY: Column = Column::new("seniority");
const POSITION: Column = Column::new("search_position_query");
const REMOTE: Column = Column::new("job_is_remote");
const CITY: Column = Column::new("job_city");
const STATE: Column = Column::new("job_state");
const EMPLOYMENT_TYPE: Column = Column::new("job_employment_type");
const SKILL: Column = Column::new("skill");
const PUBLISHER: Column = Column::new("publisher");

/// Excludes employers whose name contains a known job-board publisher.
///
/// Job boards show up as "employers" on reposted listings and would
/// otherwise dominate company rankings.
const EXCLUDE_JOB_PLATFORMS: &str = "NOT EXISTS (\
    SELECT 1 FROM job_dashboard_base platforms \
    WHERE platforms.is_job_platform = 1 \
    AND platforms.job_publisher IS NOT NULL AND platforms.job_publisher != '' \
    AND INSTR(LOWER(job_dashboard_base.employer_name), LOWER(platforms.job_publisher)) > 0)";

/// Bounds for one of an endpoint's limit parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitBounds {
    /// Query parameter name, `limit` unless the endpoint takes several.
    pub param: &'static str,
    /// Used when the parameter is absent.
    pub default: i64,
    /// Smallest accepted value.
    pub min: i64,
    /// Largest accepted value.
    pub max: i64,
}

impl LimitBounds {
    /// Creates bounds for `limit`; `min <= default <= max` is assumed.
    pub const fn new(default: i64, min: i64, max: i64) -> Self {
        Self::named("limit", default, min, max)
    }

    /// Creates bounds for a differently named parameter.
    pub const fn named(param: &'static str, default: i64, min: i64, max: i64) -> Self {
        Self {
            param,
            default,
            min,
            max,
        }
    }

    /// Returns the default when `raw` is absent, otherwise the validated value.
    pub fn resolve(&self, raw: Option<&str>) -> Result<i64, ValidationError> {
        match raw {
            Some(value) if !is_absent(Some(value)) => {
                validate_integer(value, self.param, Some(self.min), Some(self.max))
            }
            _ => Ok(self.default),
        }
    }
}

/// `limit` bounds for `/top-companies`.
pub const TOP_COMPANIES_LIMIT: LimitBounds = LimitBounds::new(20, 1, 100);
/// `limit` bounds for `/companies-seniority-distribution`.
pub const SENIORITY_DISTRIBUTION_LIMIT: LimitBounds = LimitBounds::new(10, 1, 50);
/// `limit` bounds for `/companies-remote-percentage`.
pub const REMOTE_PERCENTAGE_LIMIT: LimitBounds = LimitBounds::new(20, 1, 100);
/// `limit` bounds for `/top-publishers`.
pub const TOP_PUBLISHERS_LIMIT: LimitBounds = LimitBounds::new(20, 1, 100);
/// `limit` bounds for `/top-skills`.
pub const TOP_SKILLS_LIMIT: LimitBounds = LimitBounds::new(10, 1, 1000);
/// `limit` bounds for `/locations`.
pub const LOCATIONS_LIMIT: LimitBounds = LimitBounds::new(100, 1, 500);
/// `limit` bounds for `/job-locations-geo`.
pub const LOCATIONS_GEO_LIMIT: LimitBounds = LimitBounds::new(500, 1, 1000);
/// `limit` bounds for `/companies-jobs-timeline`.
pub const COMPANIES_TIMELINE_LIMIT: LimitBounds = LimitBounds::new(5, 1, 20);
/// `limit` bounds for `/companies-top-skills`.
pub const COMPANIES_TOP_SKILLS_LIMIT: LimitBounds = LimitBounds::new(10, 1, 50);
/// `skills_limit` bounds for `/companies-top-skills`.
pub const COMPANY_SKILLS_LIMIT: LimitBounds = LimitBounds::named("skills_limit", 10, 5, 50);
/// `limit` bounds for `/skills-trend`.
pub const SKILLS_TREND_LIMIT: LimitBounds = LimitBounds::new(50, 1, 100);
/// `limit` bounds for `/publishers-seniority-distribution`.
pub const PUBLISHERS_SENIORITY_LIMIT: LimitBounds = LimitBounds::new(10, 1, 50);
/// `limit` bounds for `/publishers-timeline`.
pub const PUBLISHERS_TIMELINE_LIMIT: LimitBounds = LimitBounds::new(10, 1, 20);
/// `limit_publishers` bounds for `/publishers-companies-matrix`.
pub const MATRIX_PUBLISHERS_LIMIT: LimitBounds = LimitBounds::named("limit_publishers", 15, 5, 50);
/// `limit_companies` bounds for `/publishers-companies-matrix`.
pub const MATRIX_COMPANIES_LIMIT: LimitBounds = LimitBounds::named("limit_companies", 15, 5, 50);

/// Dashboard filters exactly as received from the query string.
///
/// Field names are the query parameter names. Text fields are undocumented
/// where the name says it all.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawFilters {
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub job_posted_at_date_from: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub job_posted_at_date_to: Option<String>,
    pub employer_name: Option<String>,
    pub seniority: Option<String>,
    pub search_position_query: Option<String>,
    /// `true`/`false`/`1`/`0`, any case.
    pub job_is_remote: Option<String>,
    /// Matches any apply option of the posting.
    pub publisher: Option<String>,
    /// Comma-separated.
    pub skills: Option<String>,
    /// Comma-separated.
    pub cities: Option<String>,
    /// Comma-separated.
    pub states: Option<String>,
    /// Comma-separated.
    pub employment_types: Option<String>,
    /// Resolved per endpoint with [`LimitBounds::resolve`].
    pub limit: Option<String>,
    pub skills_limit: Option<String>,
    pub limit_publishers: Option<String>,
    pub limit_companies: Option<String>,
}

impl RawFilters {
    /// Returns the raw value of the limit parameter `bounds` applies to.
    pub fn limit_for(&self, bounds: LimitBounds) -> Option<&str> {
        match bounds.param {
            "skills_limit" => self.skills_limit.as_deref(),
            "limit_publishers" => self.limit_publishers.as_deref(),
            "limit_companies" => self.limit_companies.as_deref(),
            _ => self.limit.as_deref(),
        }
    }

    /// Validates the limit parameter `bounds` applies to.
    pub fn resolve_limit(&self, bounds: LimitBounds) -> Result<i64, ValidationError> {
        bounds.resolve(self.limit_for(bounds))
    }
}

/// Validated dashboard filters. `None` means the filter was not supplied.
///
/// Each field holds the validated counterpart of the [`RawFilters`] field
/// with the same (or `job_posted_at_`-stripped) name.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardFilters {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub employer_name: Option<String>,
    pub seniority: Option<String>,
    pub search_position_query: Option<String>,
    pub job_is_remote: Option<bool>,
    pub publisher: Option<String>,
    pub skills: Option<Vec<String>>,
    pub cities: Option<Vec<String>>,
    pub states: Option<Vec<String>>,
    pub employment_types: Option<Vec<String>>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !is_absent(Some(v)))
}

impl DashboardFilters {
    /// Validates every supplied filter. Absent values (missing, empty or
    /// `"null"`) are skipped.
    pub fn from_raw(raw: &RawFilters) -> Result<Self, ValidationError> {
        let text = |value: &Option<String>, field: &str| {
            present(value)
                .map(|v| validate_text(v, field, DEFAULT_MAX_TEXT_LENGTH))
                .transpose()
        };
        let list = |value: &Option<String>, field: &str| {
            present(value)
                .map(|v| validate_list(v, field, DEFAULT_MAX_LIST_ITEMS))
                .transpose()
        };

        Ok(Self {
            date_from: present(&raw.job_posted_at_date_from)
                .map(|v| validate_date(v, "job_posted_at_date_from"))
                .transpose()?,
            date_to: present(&raw.job_posted_at_date_to)
                .map(|v| validate_date(v, "job_posted_at_date_to"))
                .transpose()?,
            employer_name: text(&raw.employer_name, "employer_name")?,
            seniority: text(&raw.seniority, "seniority")?,
            search_position_query: text(&raw.search_position_query, "search_position_query")?,
            job_is_remote: present(&raw.job_is_remote)
                .map(|v| validate_boolean(v, "job_is_remote"))
                .transpose()?,
            publisher: text(&raw.publisher, "publisher")?,
            skills: list(&raw.skills, "skills")?,
            cities: list(&raw.cities, "cities")?,
            states: list(&raw.states, "states")?,
            employment_types: list(&raw.employment_types, "employment_types")?,
        })
    }

    fn date_predicates(&self, set: &mut FilterSet) {
        if let Some(value) = &self.date_from {
            set.push(Predicate::DateFrom {
                column: POSTED_AT,
                param: "job_posted_at_date_from",
                value: value.clone(),
            });
        }
        if let Some(value) = &self.date_to {
            set.push(Predicate::DateTo {
                column: POSTED_AT,
                param: "job_posted_at_date_to",
                value: value.clone(),
            });
        }
    }

    fn seniority_and_position(&self, set: &mut FilterSet) {
        if let Some(value) = &self.seniority {
            set.push(text_equals(SENIORITY, "seniority", value));
        }
        if let Some(value) = &self.search_position_query {
            set.push(text_equals(POSITION, "search_position_query", value));
        }
    }

    /// Predicates that only apply to columns of `job_dashboard_base`.
    fn posting_only(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(value) = &self.employer_name {
            predicates.push(text_equals(EMPLOYER, "employer_name", value));
        }
        if let Some(value) = self.job_is_remote {
            predicates.push(Predicate::BoolEquals {
                column: REMOTE,
                param: "job_is_remote",
                value,
            });
        }
        for (column, param, values) in [
            (CITY, "cities", &self.cities),
            (STATE, "states", &self.states),
            (EMPLOYMENT_TYPE, "employment_types", &self.employment_types),
        ] {
            if let Some(values) = values {
                predicates.push(Predicate::InList {
                    column,
                    param,
                    values: values.clone(),
                });
            }
        }
        predicates
    }

    fn publisher_predicate(&self) -> Option<Predicate> {
        self.publisher.as_ref().map(|value| {
            Predicate::within(
                JOB_ID,
                "job_apply_options",
                text_equals(PUBLISHER, "publisher", value),
            )
        })
    }

    fn skills_list(&self) -> Option<Predicate> {
        self.skills.as_ref().map(|values| Predicate::InList {
            column: SKILL,
            param: "skills",
            values: values.clone(),
        })
    }

    fn posting_filters(&self, position: PositionMatch, by_publisher: bool) -> FilterSet {
        let mut set = FilterSet::new();
        self.date_predicates(&mut set);
        if let Some(value) = &self.seniority {
            set.push(text_equals(SENIORITY, "seniority", value));
        }
        if let Some(value) = &self.search_position_query {
            set.push(match position {
                PositionMatch::Exact => text_equals(POSITION, "search_position_query", value),
                PositionMatch::Contains => Predicate::TextILike {
                    column: POSITION,
                    param: "search_position_query",
                    value: value.clone(),
                },
            });
        }
        set.extend(self.posting_only());
        if by_publisher {
            set.extend(self.publisher_predicate());
        }
        if let Some(skills) = self.skills_list() {
            set.push(Predicate::within(JOB_ID, "job_skills", skills));
        }
        set
    }

    /// Filters for statements over `job_dashboard_base`.
    pub fn job_filters(&self) -> FilterSet {
        self.posting_filters(PositionMatch::Exact, true)
    }

    /// Filters for statements that expand apply options.
    ///
    /// The publisher filter is left out; those statements match it against
    /// each option instead of the whole posting.
    pub fn option_filters(&self) -> FilterSet {
        self.posting_filters(PositionMatch::Exact, false)
    }

    /// Like [`job_filters`](Self::job_filters), but the position matches
    /// as a case-insensitive substring.
    pub fn location_filters(&self) -> FilterSet {
        self.posting_filters(PositionMatch::Contains, true)
    }

    /// Only the position filter. Dropdown option lists narrow by nothing else.
    pub fn position_filter(&self) -> FilterSet {
        let mut set = FilterSet::new();
        if let Some(value) = &self.search_position_query {
            set.push(text_equals(POSITION, "search_position_query", value));
        }
        set
    }

    /// True when the caller narrowed the selection to one company, one
    /// remote mode or one seniority level.
    fn is_narrowed(&self) -> bool {
        self.employer_name.is_some() || self.job_is_remote.is_some() || self.seniority.is_some()
    }

    /// Filters for statements over `job_skills`.
    ///
    /// Posting-level filters are applied through the posting's `job_id`.
    pub fn skill_filters(&self) -> FilterSet {
        let mut set = FilterSet::new();
        self.date_predicates(&mut set);
        self.seniority_and_position(&mut set);
        set.extend(self.skills_list());
        set.extend(
            self.posting_only()
                .into_iter()
                .map(|p| Predicate::within(JOB_ID, "job_dashboard_base", p)),
        );
        set.extend(self.publisher_predicate());
        set
    }
}

#[derive(Debug, Clone, Copy)]
enum PositionMatch {
    Exact,
    Contains,
}

fn text_equals(column: Column, param: &'static str, value: &str) -> Predicate {
    Predicate::TextEquals {
        column,
        param,
        value: value.to_string(),
    }
}

fn company_filters(filters: &DashboardFilters) -> FilterSet {
    filters
        .job_filters()
        .with(Predicate::Static(EXCLUDE_JOB_PLATFORMS))
}

/// Binds to `:publisher` in statements that match options by publisher;
/// NULL matches every option.
fn publisher_param(filters: &DashboardFilters) -> SqlParam {
    filters
        .publisher
        .clone()
        .map(SqlParam::Text)
        .unwrap_or(SqlParam::Null)
}

/// Companies ranked by number of postings.
pub fn top_companies(
    filters: &DashboardFilters,
    limit: i64,
) -> Result<AssembledQuery, AssemblyError> {
    let set = company_filters(filters);
    QueryAssembler::new(
        "SELECT employer_name, COUNT(job_id) AS job_count FROM job_dashboard_base",
    )
    .filters(&set)
    .tail("GROUP BY employer_name ORDER BY job_count DESC, employer_name LIMIT :limit")
    .bind("limit", SqlParam::Integer(limit))
    .assemble()
}

/// Posting counts per seniority level for the top companies.
pub fn companies_seniority_distribution(
    filters: &DashboardFilters,
    limit: i64,
) -> Result<AssembledQuery, AssemblyError> {
    let set = company_filters(filters);
    QueryAssembler::new("WITH filtered AS (SELECT * FROM job_dashboard_base")
        .filters(&set)
        .tail(
            "), top_companies AS (\
                SELECT employer_name FROM filtered \
                GROUP BY employer_name \
                ORDER BY COUNT(job_id) DESC, employer_name \
                LIMIT :limit\
            ) \
            SELECT f.employer_name, f.seniority, COUNT(f.job_id) AS job_count \
            FROM filtered f \
            INNER JOIN top_companies t ON f.employer_name = t.employer_name \
            GROUP BY f.employer_name, f.seniority \
            ORDER BY f.employer_name, f.seniority DESC",
        )
        .bind("limit", SqlParam::Integer(limit))
        .assemble()
}

/// Share of remote postings per company.
///
/// On the unfiltered view, companies with a single on-site posting are left
/// out; a 0% from one posting says nothing. Once the selection is narrowed
/// to an employer, a remote mode or a seniority level every company is kept.
pub fn companies_remote_percentage(
    filters: &DashboardFilters,
    limit: i64,
) -> Result<AssembledQuery, AssemblyError> {
    let set = company_filters(filters);
    let tail = if filters.is_narrowed() {
        "GROUP BY employer_name \
         ORDER BY remote_percentage DESC, total_jobs DESC, employer_name \
         LIMIT :limit"
    } else {
        "GROUP BY employer_name \
         HAVING COUNT(job_id) >= 2 OR SUM(CASE WHEN job_is_remote = 1 THEN 1 ELSE 0 END) > 0 \
         ORDER BY remote_percentage DESC, total_jobs DESC, employer_name \
         LIMIT :limit"
    };
    QueryAssembler::new(
        "SELECT employer_name, \
            COUNT(job_id) AS total_jobs, \
            SUM(CASE WHEN job_is_remote = 1 THEN 1 ELSE 0 END) AS remote_jobs, \
            ROUND(SUM(CASE WHEN job_is_remote = 1 THEN 1 ELSE 0 END) * 100.0 / COUNT(job_id), 2) \
                AS remote_percentage \
         FROM job_dashboard_base",
    )
    .filters(&set)
    .tail(tail)
    .bind("limit", SqlParam::Integer(limit))
    .assemble()
}

/// Postings per day for the top companies.
///
/// When one employer is selected its own timeline is returned, platform or
/// not.
pub fn companies_jobs_timeline(
    filters: &DashboardFilters,
    limit: i64,
) -> Result<AssembledQuery, AssemblyError> {
    let set = if filters.employer_name.is_some() {
        filters.job_filters()
    } else {
        company_filters(filters)
    };
    QueryAssembler::new("WITH filtered AS (SELECT * FROM job_dashboard_base")
        .filters(&set)
        .tail(
            "), top_companies AS (\
                SELECT employer_name FROM filtered \
                GROUP BY employer_name \
                ORDER BY COUNT(job_id) DESC, employer_name \
                LIMIT :limit\
            ) \
            SELECT f.job_posted_at_date, f.employer_name, COUNT(f.job_id) AS job_count \
            FROM filtered f \
            INNER JOIN top_companies t ON f.employer_name = t.employer_name \
            GROUP BY f.job_posted_at_date, f.employer_name \
            ORDER BY f.job_posted_at_date, f.employer_name",
        )
        .bind("limit", SqlParam::Integer(limit))
        .assemble()
}

/// Skill frequencies over the postings of the top `limit` companies, as
/// word-cloud `name`/`value` pairs.
pub fn companies_top_skills(
    filters: &DashboardFilters,
    limit: i64,
    skills_limit: i64,
) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.job_filters();
    QueryAssembler::new("WITH filtered AS (SELECT * FROM job_dashboard_base")
        .filters(&set)
        .tail(
            "), top_companies AS (\
                SELECT employer_name FROM filtered \
                GROUP BY employer_name \
                ORDER BY COUNT(job_id) DESC, employer_name \
                LIMIT :limit\
            ) \
            SELECT s.skill AS name, COUNT(*) AS value \
            FROM job_skills s \
            INNER JOIN filtered f ON f.job_id = s.job_id \
            INNER JOIN top_companies t ON f.employer_name = t.employer_name \
            GROUP BY s.skill \
            ORDER BY value DESC, s.skill \
            LIMIT :skills_limit",
        )
        .bind("limit", SqlParam::Integer(limit))
        .bind("skills_limit", SqlParam::Integer(skills_limit))
        .assemble()
}

/// The four statements behind the company KPI tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyKpiQueries {
    /// Distinct postings.
    pub total_jobs: AssembledQuery,
    /// Share of remote postings.
    pub remote_percentage: AssembledQuery,
    /// Mean skill count per posting.
    pub avg_skills_per_job: AssembledQuery,
    /// Distinct employers.
    pub distinct_companies: AssembledQuery,
}

/// Headline company figures for the filtered postings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyKpis {
    /// Number of postings.
    pub total_jobs: i64,
    /// Percentage of remote postings, two decimals.
    pub remote_percentage: f64,
    /// Mean skills per posting, two decimals.
    pub avg_skills_per_job: f64,
    /// Number of employers.
    pub distinct_companies: i64,
}

/// Builds the KPI statements. Job platforms are not excluded here.
pub fn companies_kpis(filters: &DashboardFilters) -> Result<CompanyKpiQueries, AssemblyError> {
    let set = filters.job_filters();

    let total_jobs = QueryAssembler::new(
        "SELECT COUNT(DISTINCT job_id) AS total_jobs FROM job_dashboard_base",
    )
    .filters(&set)
    .assemble()?;

    let remote_percentage = QueryAssembler::new(
        "SELECT ROUND(\
            COUNT(DISTINCT CASE WHEN job_is_remote = 1 THEN job_id END) * 100.0 \
            / NULLIF(COUNT(DISTINCT job_id), 0), 2) AS remote_percentage \
         FROM job_dashboard_base",
    )
    .filters(&set)
    .assemble()?;

    let avg_skills_per_job = QueryAssembler::new(
        "SELECT ROUND(AVG(skills_per_job), 2) AS avg_skills_per_job FROM (\
            SELECT job_dashboard_base.job_id, \
                (SELECT COUNT(*) FROM job_skills s WHERE s.job_id = job_dashboard_base.job_id) \
                    AS skills_per_job \
            FROM job_dashboard_base",
    )
    .filters(&set)
    .tail(") AS job_skill_counts")
    .assemble()?;

    let distinct_set = set
        .clone()
        .with(Predicate::Static("employer_name IS NOT NULL"));
    let distinct_companies = QueryAssembler::new(
        "SELECT COUNT(DISTINCT employer_name) AS distinct_companies FROM job_dashboard_base",
    )
    .filters(&distinct_set)
    .assemble()?;

    Ok(CompanyKpiQueries {
        total_jobs,
        remote_percentage,
        avg_skills_per_job,
        distinct_companies,
    })
}

fn first_value(rows: Vec<Row>, column: &str) -> Value {
    rows.into_iter()
        .next()
        .and_then(|mut row| row.remove(column))
        .unwrap_or(Value::Null)
}

/// Runs the KPI statements and combines them. Empty aggregates read as zero.
pub async fn fetch_company_kpis<S: AnalyticsStore + ?Sized>(
    store: &S,
    filters: &DashboardFilters,
) -> StorageResult<CompanyKpis> {
    let queries = companies_kpis(filters)?;

    let total_jobs = first_value(store.fetch_rows(&queries.total_jobs).await?, "total_jobs");
    let remote_percentage = first_value(
        store.fetch_rows(&queries.remote_percentage).await?,
        "remote_percentage",
    );
    let avg_skills_per_job = first_value(
        store.fetch_rows(&queries.avg_skills_per_job).await?,
        "avg_skills_per_job",
    );
    let distinct_companies = first_value(
        store.fetch_rows(&queries.distinct_companies).await?,
        "distinct_companies",
    );

    Ok(CompanyKpis {
        total_jobs: total_jobs.as_i64().unwrap_or(0),
        remote_percentage: remote_percentage.as_f64().unwrap_or(0.0),
        avg_skills_per_job: avg_skills_per_job.as_f64().unwrap_or(0.0),
        distinct_companies: distinct_companies.as_i64().unwrap_or(0),
    })
}

/// Publishers ranked by the number of distinct postings they list.
pub fn top_publishers(
    filters: &DashboardFilters,
    limit: i64,
) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.job_filters();
    QueryAssembler::new("WITH filtered AS (SELECT job_id FROM job_dashboard_base")
        .filters(&set)
        .tail(
            ") \
            SELECT o.publisher AS publisher, \
                COUNT(*) AS publication_count, \
                COUNT(DISTINCT o.job_id) AS unique_jobs_count \
            FROM job_apply_options o \
            INNER JOIN filtered f ON f.job_id = o.job_id \
            WHERE o.publisher != '' \
            GROUP BY o.publisher \
            ORDER BY unique_jobs_count DESC, o.publisher \
            LIMIT :limit",
        )
        .bind("limit", SqlParam::Integer(limit))
        .assemble()
}

/// The four statements behind the publisher KPI tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct PublisherKpiQueries {
    /// Distinct publishers.
    pub total_publishers: AssembledQuery,
    /// Mean apply options per posting.
    pub avg_publishers_per_job: AssembledQuery,
    /// The publisher listing the most postings.
    pub biggest_coverage: AssembledQuery,
    /// Share of postings with a direct apply option.
    pub direct_percentage: AssembledQuery,
}

/// Headline publisher figures for the filtered postings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublisherKpis {
    /// Number of distinct publishers.
    pub total_publishers: i64,
    /// Two decimals.
    pub avg_publishers_per_job: f64,
    /// `None` when no posting has an apply option.
    pub biggest_coverage_publisher: Option<String>,
    /// Postings listed by that publisher.
    pub biggest_coverage_count: i64,
    /// Percentage of postings that can be applied to directly, two decimals.
    pub direct_percentage: f64,
}

/// Builds the publisher KPI statements.
///
/// A publisher filter narrows the options counted, not the postings, so the
/// per-posting average ignores it.
pub fn publishers_kpis(filters: &DashboardFilters) -> Result<PublisherKpiQueries, AssemblyError> {
    let set = filters.option_filters();

    let total_publishers = QueryAssembler::new(
        "WITH filtered AS (SELECT job_id FROM job_dashboard_base",
    )
    .filters(&set)
    .tail(
        ") \
        SELECT COUNT(DISTINCT o.publisher) AS total_publishers \
        FROM job_apply_options o \
        INNER JOIN filtered f ON f.job_id = o.job_id \
        WHERE o.publisher != '' AND (:publisher IS NULL OR o.publisher = :publisher)",
    )
    .bind("publisher", publisher_param(filters))
    .assemble()?;

    let avg_publishers_per_job = QueryAssembler::new(
        "SELECT ROUND(AVG(option_count), 2) AS avg_publishers_per_job FROM (\
            SELECT job_dashboard_base.job_id, \
                (SELECT COUNT(*) FROM job_apply_options o WHERE o.job_id = job_dashboard_base.job_id) \
                    AS option_count \
            FROM job_dashboard_base",
    )
    .filters(&set)
    .tail(") AS job_option_counts")
    .assemble()?;

    let biggest_coverage = QueryAssembler::new(
        "WITH filtered AS (SELECT job_id FROM job_dashboard_base",
    )
    .filters(&set)
    .tail(
        ") \
        SELECT o.publisher AS publisher, COUNT(DISTINCT o.job_id) AS job_count \
        FROM job_apply_options o \
        INNER JOIN filtered f ON f.job_id = o.job_id \
        WHERE o.publisher != '' AND (:publisher IS NULL OR o.publisher = :publisher) \
        GROUP BY o.publisher \
        ORDER BY job_count DESC, o.publisher \
        LIMIT 1",
    )
    .bind("publisher", publisher_param(filters))
    .assemble()?;

    let direct_percentage = QueryAssembler::new(
        "WITH filtered AS (SELECT job_id FROM job_dashboard_base",
    )
    .filters(&set)
    .tail(
        "), direct_stats AS (\
            SELECT o.job_id, MAX(o.is_direct) AS has_direct \
            FROM job_apply_options o \
            INNER JOIN filtered f ON f.job_id = o.job_id \
            WHERE :publisher IS NULL OR o.publisher = :publisher \
            GROUP BY o.job_id\
        ) \
        SELECT CASE WHEN COUNT(*) = 0 THEN 0 \
            ELSE ROUND(SUM(CASE WHEN has_direct = 1 THEN 1 ELSE 0 END) * 100.0 / COUNT(*), 2) \
            END AS direct_percentage \
        FROM direct_stats",
    )
    .bind("publisher", publisher_param(filters))
    .assemble()?;

    Ok(PublisherKpiQueries {
        total_publishers,
        avg_publishers_per_job,
        biggest_coverage,
        direct_percentage,
    })
}

/// Runs the publisher KPI statements and combines them.
pub async fn fetch_publisher_kpis<S: AnalyticsStore + ?Sized>(
    store: &S,
    filters: &DashboardFilters,
) -> StorageResult<PublisherKpis> {
    let queries = publishers_kpis(filters)?;

    let total_publishers = first_value(
        store.fetch_rows(&queries.total_publishers).await?,
        "total_publishers",
    );
    let avg_publishers_per_job = first_value(
        store.fetch_rows(&queries.avg_publishers_per_job).await?,
        "avg_publishers_per_job",
    );
    let coverage = store
        .fetch_rows(&queries.biggest_coverage)
        .await?
        .into_iter()
        .next()
        .unwrap_or_default();
    let direct_percentage = first_value(
        store.fetch_rows(&queries.direct_percentage).await?,
        "direct_percentage",
    );

    Ok(PublisherKpis {
        total_publishers: total_publishers.as_i64().unwrap_or(0),
        avg_publishers_per_job: avg_publishers_per_job.as_f64().unwrap_or(0.0),
        biggest_coverage_publisher: coverage
            .get("publisher")
            .and_then(Value::as_str)
            .map(str::to_string),
        biggest_coverage_count: coverage
            .get("job_count")
            .and_then(Value::as_i64)
            .unwrap_or(0),
        direct_percentage: direct_percentage.as_f64().unwrap_or(0.0),
    })
}

/// Posting counts per seniority level for the top publishers.
pub fn publishers_seniority_distribution(
    filters: &DashboardFilters,
    limit: i64,
) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.option_filters();
    QueryAssembler::new("WITH filtered AS (SELECT job_id, seniority FROM job_dashboard_base")
        .filters(&set)
        .tail(
            "), options AS (\
                SELECT o.publisher, f.job_id, f.seniority \
                FROM job_apply_options o \
                INNER JOIN filtered f ON f.job_id = o.job_id \
                WHERE o.publisher != '' AND (:publisher IS NULL OR o.publisher = :publisher)\
            ), top_publishers AS (\
                SELECT publisher FROM options \
                GROUP BY publisher \
                ORDER BY COUNT(*) DESC, publisher \
                LIMIT :limit\
            ) \
            SELECT p.publisher, p.seniority, COUNT(DISTINCT p.job_id) AS job_count \
            FROM options p \
            INNER JOIN top_publishers t ON p.publisher = t.publisher \
            WHERE p.seniority IS NOT NULL \
            GROUP BY p.publisher, p.seniority \
            ORDER BY p.publisher, p.seniority DESC",
        )
        .bind("publisher", publisher_param(filters))
        .bind("limit", SqlParam::Integer(limit))
        .assemble()
}

/// Publisher by company posting counts, over the top publishers and the
/// top companies.
pub fn publishers_companies_matrix(
    filters: &DashboardFilters,
    limit_publishers: i64,
    limit_companies: i64,
) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.option_filters();
    QueryAssembler::new("WITH filtered AS (SELECT job_id, employer_name FROM job_dashboard_base")
        .filters(&set)
        .tail(
            "), options AS (\
                SELECT o.publisher, f.employer_name, f.job_id \
                FROM job_apply_options o \
                INNER JOIN filtered f ON f.job_id = o.job_id \
                WHERE o.publisher != '' AND (:publisher IS NULL OR o.publisher = :publisher)\
            ), top_publishers AS (\
                SELECT publisher FROM options \
                GROUP BY publisher \
                ORDER BY COUNT(*) DESC, publisher \
                LIMIT :limit_publishers\
            ), top_companies AS (\
                SELECT employer_name FROM filtered \
                GROUP BY employer_name \
                ORDER BY COUNT(*) DESC, employer_name \
                LIMIT :limit_companies\
            ) \
            SELECT p.publisher, p.employer_name, COUNT(p.job_id) AS job_count \
            FROM options p \
            INNER JOIN top_publishers tp ON p.publisher = tp.publisher \
            INNER JOIN top_companies tc ON p.employer_name = tc.employer_name \
            GROUP BY p.publisher, p.employer_name \
            ORDER BY p.publisher, p.employer_name",
        )
        .bind("publisher", publisher_param(filters))
        .bind("limit_publishers", SqlParam::Integer(limit_publishers))
        .bind("limit_companies", SqlParam::Integer(limit_companies))
        .assemble()
}

/// Postings per day for the top publishers.
pub fn publishers_timeline(
    filters: &DashboardFilters,
    limit: i64,
) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.option_filters();
    QueryAssembler::new(
        "WITH filtered AS (SELECT job_id, job_posted_at_date FROM job_dashboard_base",
    )
    .filters(&set)
    .tail(
        "), options AS (\
            SELECT o.publisher, f.job_id, f.job_posted_at_date \
            FROM job_apply_options o \
            INNER JOIN filtered f ON f.job_id = o.job_id \
            WHERE o.publisher != '' AND (:publisher IS NULL OR o.publisher = :publisher)\
        ), top_publishers AS (\
            SELECT publisher FROM options \
            GROUP BY publisher \
            ORDER BY COUNT(*) DESC, publisher \
            LIMIT :limit\
        ) \
        SELECT p.job_posted_at_date, p.publisher, COUNT(DISTINCT p.job_id) AS job_count \
        FROM options p \
        INNER JOIN top_publishers t ON p.publisher = t.publisher \
        GROUP BY p.job_posted_at_date, p.publisher \
        ORDER BY p.job_posted_at_date, p.publisher",
    )
    .bind("publisher", publisher_param(filters))
    .bind("limit", SqlParam::Integer(limit))
    .assemble()
}

/// Apply options split into direct and indirect, with their share.
pub fn direct_vs_indirect_distribution(
    filters: &DashboardFilters,
) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.option_filters();
    QueryAssembler::new("WITH filtered AS (SELECT job_id FROM job_dashboard_base")
        .filters(&set)
        .tail(
            "), application_types AS (\
                SELECT o.is_direct AS is_direct, COUNT(*) AS option_count \
                FROM job_apply_options o \
                INNER JOIN filtered f ON f.job_id = o.job_id \
                WHERE :publisher IS NULL OR o.publisher = :publisher \
                GROUP BY o.is_direct\
            ) \
            SELECT CASE WHEN is_direct = 1 THEN 'Direct' ELSE 'Indirect' END AS application_type, \
                option_count AS \"count\", \
                ROUND(option_count * 100.0 / SUM(option_count) OVER (), 2) AS percentage \
            FROM application_types \
            ORDER BY is_direct DESC",
        )
        .bind("publisher", publisher_param(filters))
        .assemble()
}

/// Most requested skills, broken down by seniority.
///
/// Without a seniority filter the top skills are picked by total count
/// first and every seniority level of those skills is returned, so the
/// breakdown for each skill is complete.
pub fn top_skills(
    filters: &DashboardFilters,
    limit: i64,
) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.skill_filters();

    if filters.seniority.is_some() {
        return QueryAssembler::new(
            "SELECT skill, seniority, SUM(skill_count) AS skill_count FROM job_skills",
        )
        .filters(&set)
        .tail("GROUP BY skill, seniority ORDER BY skill_count DESC, skill LIMIT :limit")
        .bind("limit", SqlParam::Integer(limit))
        .assemble();
    }

    QueryAssembler::new("WITH filtered AS (SELECT * FROM job_skills")
        .filters(&set)
        .tail(
            "), top_skills AS (\
                SELECT skill, SUM(skill_count) AS total_count FROM filtered \
                GROUP BY skill \
                ORDER BY total_count DESC, skill \
                LIMIT :limit\
            ) \
            SELECT f.skill, f.seniority, \
                SUM(f.skill_count) AS skill_count, \
                MAX(t.total_count) AS total_count \
            FROM filtered f \
            INNER JOIN top_skills t ON f.skill = t.skill \
            GROUP BY f.skill, f.seniority \
            ORDER BY total_count DESC, f.skill, skill_count DESC",
        )
        .bind("limit", SqlParam::Integer(limit))
        .assemble()
}

/// Daily skill counts per seniority level.
///
/// With a skills filter exactly those skills are traced; otherwise the top
/// `limit` skills by total count.
pub fn skills_trend(filters: &DashboardFilters, limit: i64) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.skill_filters();

    if filters.skills.is_some() {
        return QueryAssembler::new(
            "SELECT job_posted_at_date, skill, seniority, SUM(skill_count) AS skill_count \
             FROM job_skills",
        )
        .filters(&set)
        .tail(
            "GROUP BY job_posted_at_date, skill, seniority \
             ORDER BY job_posted_at_date, skill, seniority",
        )
        .assemble();
    }

    QueryAssembler::new("WITH filtered AS (SELECT * FROM job_skills")
        .filters(&set)
        .tail(
            "), top_skills AS (\
                SELECT skill FROM filtered \
                GROUP BY skill \
                ORDER BY SUM(skill_count) DESC, skill \
                LIMIT :limit\
            ) \
            SELECT f.job_posted_at_date, f.skill, f.seniority, SUM(f.skill_count) AS skill_count \
            FROM filtered f \
            INNER JOIN top_skills t ON f.skill = t.skill \
            GROUP BY f.job_posted_at_date, f.skill, f.seniority \
            ORDER BY f.job_posted_at_date, f.skill, f.seniority",
        )
        .bind("limit", SqlParam::Integer(limit))
        .assemble()
}

/// Distinct skill names.
pub fn available_skills(filters: &DashboardFilters) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.skill_filters();
    QueryAssembler::new("SELECT DISTINCT skill FROM job_skills")
        .filters(&set)
        .tail("ORDER BY skill")
        .assemble()
}

/// Distinct seniority levels, highest first.
pub fn available_seniority_levels(
    filters: &DashboardFilters,
) -> Result<AssembledQuery, AssemblyError> {
    let set = filters
        .skill_filters()
        .with(Predicate::Static("seniority IS NOT NULL AND seniority != ''"));
    QueryAssembler::new("SELECT DISTINCT seniority FROM job_skills")
        .filters(&set)
        .tail("ORDER BY seniority DESC")
        .assemble()
}

/// Distinct search terms postings were collected under.
pub fn available_positions() -> Result<AssembledQuery, AssemblyError> {
    let set = FilterSet::new().with(Predicate::Static(
        "search_position_query IS NOT NULL AND search_position_query != ''",
    ));
    QueryAssembler::new("SELECT DISTINCT search_position_query FROM job_dashboard_base")
        .filters(&set)
        .tail("ORDER BY search_position_query")
        .assemble()
}

/// Distinct publishers found in apply options. Narrowed by position only.
pub fn available_publishers(filters: &DashboardFilters) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.position_filter();
    QueryAssembler::new("WITH filtered AS (SELECT job_id FROM job_dashboard_base")
        .filters(&set)
        .tail(
            ") \
            SELECT DISTINCT o.publisher AS publisher \
            FROM job_apply_options o \
            INNER JOIN filtered f ON f.job_id = o.job_id \
            WHERE o.publisher IS NOT NULL AND o.publisher != '' \
            ORDER BY o.publisher",
        )
        .assemble()
}

/// Distinct employers, job platforms excluded. Narrowed by position only.
pub fn available_companies(filters: &DashboardFilters) -> Result<AssembledQuery, AssemblyError> {
    let set = filters
        .position_filter()
        .with(Predicate::Static("employer_name IS NOT NULL AND employer_name != ''"))
        .with(Predicate::Static(EXCLUDE_JOB_PLATFORMS));
    QueryAssembler::new("SELECT DISTINCT employer_name FROM job_dashboard_base")
        .filters(&set)
        .tail("ORDER BY employer_name")
        .assemble()
}

/// Distinct city/state pairs, as `title` and `state`.
pub fn locations(filters: &DashboardFilters, limit: i64) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.job_filters().with(Predicate::Static(
        "job_city IS NOT NULL AND job_city != '' AND job_state IS NOT NULL AND job_state != ''",
    ));
    QueryAssembler::new("SELECT DISTINCT job_city AS title, job_state AS state FROM job_dashboard_base")
        .filters(&set)
        .tail("ORDER BY title, state LIMIT :limit")
        .bind("limit", SqlParam::Integer(limit))
        .assemble()
}

/// Posting counts per city/state pair for the map view, busiest first.
///
/// The position filter matches as a substring here. Placeholder locations
/// are dropped.
pub fn job_locations_geo(
    filters: &DashboardFilters,
    limit: i64,
) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.location_filters().with(Predicate::Static(
        "job_city IS NOT NULL AND job_city != '' AND job_city != 'Brasil (N/A)' \
         AND job_state IS NOT NULL AND job_state != '' AND job_state != 'Brasil (N/A)'",
    ));
    QueryAssembler::new("SELECT job_city, job_state, COUNT(*) AS job_count FROM job_dashboard_base")
        .filters(&set)
        .tail("GROUP BY job_city, job_state ORDER BY job_count DESC, job_city, job_state LIMIT :limit")
        .bind("limit", SqlParam::Integer(limit))
        .assemble()
}

/// Posting counts and share per employment type.
pub fn employment_type_distribution(
    filters: &DashboardFilters,
) -> Result<AssembledQuery, AssemblyError> {
    let set = filters.job_filters();
    QueryAssembler::new(
        "SELECT job_employment_type, \
            COUNT(job_id) AS job_count, \
            ROUND(COUNT(job_id) * 100.0 / SUM(COUNT(job_id)) OVER (), 2) AS percentage \
         FROM job_dashboard_base",
    )
    .filters(&set)
    .tail("GROUP BY job_employment_type ORDER BY job_count DESC, job_employment_type")
    .assemble()
}
