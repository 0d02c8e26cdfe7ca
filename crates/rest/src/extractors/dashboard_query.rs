//! Dashboard query extractor.
//!
//! Extracts and validates the dashboard filter parameters from the query
//! string.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use hiremetrics_persistence::dashboard::{DashboardFilters, LimitBounds, RawFilters};

use crate::error::{RestError, RestResult};

/// Axum extractor for validated dashboard filters.
///
/// Every supplied filter is validated before the handler runs, so a
/// rejected value fails the whole request with a 400. Limit parameters are
/// kept raw because their bounds differ per endpoint; resolve them with
/// [`DashboardQuery::limit`].
///
/// # Example
///
/// ```rust,ignore
/// use hiremetrics_persistence::dashboard::TOP_COMPANIES_LIMIT;
/// use hiremetrics_rest::extractors::DashboardQuery;
///
/// async fn handler(query: DashboardQuery) -> RestResult<()> {
///     let limit = query.limit(TOP_COMPANIES_LIMIT)?;
///     let filters = query.filters();
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DashboardQuery {
    filters: DashboardFilters,
    raw: RawFilters,
}

impl DashboardQuery {
    /// Validates raw query parameters.
    pub fn from_raw(raw: RawFilters) -> RestResult<Self> {
        let filters = DashboardFilters::from_raw(&raw)?;
        Ok(Self { filters, raw })
    }

    /// Returns the validated filters.
    pub fn filters(&self) -> &DashboardFilters {
        &self.filters
    }

    /// Resolves the limit parameter named by `bounds`.
    pub fn limit(&self, bounds: LimitBounds) -> RestResult<i64> {
        Ok(self.raw.resolve_limit(bounds)?)
    }
}

impl<S> FromRequestParts<S> for DashboardQuery
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<RawFilters>::from_request_parts(parts, state)
            .await
            .map_err(|e| RestError::BadRequest {
                message: e.body_text(),
            })?;

        Self::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiremetrics_persistence::dashboard::{
        COMPANIES_TOP_SKILLS_LIMIT, COMPANY_SKILLS_LIMIT, TOP_SKILLS_LIMIT,
    };

    #[test]
    fn test_defaults_when_empty() {
        let query = DashboardQuery::from_raw(RawFilters::default()).unwrap();
        assert_eq!(query.filters(), &DashboardFilters::default());
        assert_eq!(query.limit(TOP_SKILLS_LIMIT).unwrap(), 10);
    }

    #[test]
    fn test_limit_out_of_range() {
        let query = DashboardQuery::from_raw(RawFilters {
            limit: Some("5000".to_string()),
            ..Default::default()
        })
        .unwrap();

        let err = query.limit(TOP_SKILLS_LIMIT).unwrap_err();
        assert!(matches!(err, RestError::BadRequest { .. }));
    }

    #[test]
    fn test_named_limits_resolve_independently() {
        let query = DashboardQuery::from_raw(RawFilters {
            limit: Some("3".to_string()),
            skills_limit: Some("4".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(query.limit(COMPANIES_TOP_SKILLS_LIMIT).unwrap(), 3);
        match query.limit(COMPANY_SKILLS_LIMIT).unwrap_err() {
            RestError::BadRequest { message } => {
                assert_eq!(message, "skills_limit must be at least 5");
            }
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let result = DashboardQuery::from_raw(RawFilters {
            job_is_remote: Some("maybe".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(RestError::BadRequest { .. })));
    }

    #[test]
    fn test_skills_split() {
        let query = DashboardQuery::from_raw(RawFilters {
            skills: Some("Python, SQL".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            query.filters().skills,
            Some(vec!["Python".to_string(), "SQL".to_string()])
        );
    }
}
