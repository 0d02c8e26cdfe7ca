//! Parameterized statement assembly.
//!
//! A statement is built from three developer-authored pieces and one
//! user-sourced piece:
//!
//! - a base template (`&'static str`), e.g. `SELECT ... FROM job_dashboard_base`
//! - an optional tail template (`&'static str`), e.g. `GROUP BY ... LIMIT :limit`
//! - explicit binds for placeholders that appear in those templates
//! - a [`FilterSet`] of [`Predicate`]s whose *values* came from the request
//!
//! Predicate expression text is rendered only from [`Column`]s and placeholder
//! names, both of which are `&'static str`. Request data never becomes part of
//! the SQL grammar; it only ever reaches the driver as a bound [`SqlParam`].
//!
//! # Example
//!
//! ```
//! use hiremetrics_persistence::assembly::{Column, FilterSet, Predicate, QueryAssembler, SqlParam};
//!
//! let mut filters = FilterSet::new();
//! filters.push(Predicate::date_from(Column::new("job_posted_at_date"), "date_from", "2024-01-01")?);
//! filters.push(Predicate::in_list(Column::new("skill"), "skill", "Python,SQL")?);
//!
//! let query = QueryAssembler::new("SELECT skill, COUNT(*) AS n FROM job_skills")
//!     .filters(&filters)
//!     .tail("GROUP BY skill LIMIT :limit")
//!     .bind("limit", SqlParam::Integer(10))
//!     .assemble()?;
//!
//! assert_eq!(
//!     query.sql,
//!     "SELECT skill, COUNT(*) AS n FROM job_skills WHERE job_posted_at_date >= :date_from \
//!      AND skill IN (:skill_0, :skill_1) GROUP BY skill LIMIT :limit"
//! );
//! assert_eq!(query.params.len(), 4);
//! # Ok::<(), hiremetrics_persistence::error::StorageError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::error::{AssemblyError, ValidationError};
use crate::validation::{
    DEFAULT_MAX_LIST_ITEMS, DEFAULT_MAX_TEXT_LENGTH, RawValue, validate_boolean, validate_date,
    validate_list, validate_text,
};

/// Characters that betray a template built with string formatting.
const UNSAFE_TEMPLATE_CHARS: [char; 3] = ['%', '{', '}'];

/// A column (or developer-authored column expression) a predicate applies to.
///
/// Only constructible from `&'static str`, so column text is always part of
/// the compiled program and never sourced from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column(&'static str);

impl Column {
    /// Creates a column reference.
    pub const fn new(name: &'static str) -> Self {
        Column(name)
    }

    /// Returns the column text.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A value bound to a named placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    /// Text parameter (also used for `YYYY-MM-DD` dates).
    Text(String),
    /// Integer parameter.
    Integer(i64),
    /// Boolean parameter.
    Bool(bool),
    /// Null parameter.
    Null,
}

impl SqlParam {
    /// Creates a text parameter.
    pub fn text(s: impl Into<String>) -> Self {
        SqlParam::Text(s.into())
    }
}

/// A SQL boolean sub-expression together with the values it binds.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column >= :param`
    DateFrom {
        column: Column,
        param: &'static str,
        value: String,
    },
    /// `column <= :param`
    DateTo {
        column: Column,
        param: &'static str,
        value: String,
    },
    /// `column = :param`
    TextEquals {
        column: Column,
        param: &'static str,
        value: String,
    },
    /// Case-insensitive substring match.
    TextILike {
        column: Column,
        param: &'static str,
        value: String,
    },
    /// `column = :param` for a boolean column.
    BoolEquals {
        column: Column,
        param: &'static str,
        value: bool,
    },
    /// `column IN (:param_0, :param_1, ...)`
    InList {
        column: Column,
        param: &'static str,
        values: Vec<String>,
    },
    /// `column IN (SELECT column FROM source WHERE inner)`
    ///
    /// Used to filter a parent table by rows of a child table, e.g. jobs that
    /// require one of the requested skills.
    Within {
        column: Column,
        source: &'static str,
        inner: Box<Predicate>,
    },
    /// A fixed, parameterless condition.
    Static(&'static str),
}

impl Predicate {
    /// Validates `raw` as a date and builds a lower-bound predicate.
    ///
    /// The placeholder name doubles as the field name in validation errors.
    pub fn date_from(
        column: Column,
        param: &'static str,
        raw: impl Into<RawValue>,
    ) -> Result<Self, ValidationError> {
        Ok(Predicate::DateFrom {
            column,
            param,
            value: validate_date(raw, param)?,
        })
    }

    /// Validates `raw` as a date and builds an upper-bound predicate.
    pub fn date_to(
        column: Column,
        param: &'static str,
        raw: impl Into<RawValue>,
    ) -> Result<Self, ValidationError> {
        Ok(Predicate::DateTo {
            column,
            param,
            value: validate_date(raw, param)?,
        })
    }

    /// Validates `raw` as text and builds an equality predicate.
    pub fn text_equals(
        column: Column,
        param: &'static str,
        raw: impl Into<RawValue>,
    ) -> Result<Self, ValidationError> {
        Ok(Predicate::TextEquals {
            column,
            param,
            value: validate_text(raw, param, DEFAULT_MAX_TEXT_LENGTH)?,
        })
    }

    /// Validates `raw` as text and builds a case-insensitive contains predicate.
    pub fn text_ilike(
        column: Column,
        param: &'static str,
        raw: impl Into<RawValue>,
    ) -> Result<Self, ValidationError> {
        Ok(Predicate::TextILike {
            column,
            param,
            value: validate_text(raw, param, DEFAULT_MAX_TEXT_LENGTH)?,
        })
    }

    /// Validates `raw` as a boolean and builds an equality predicate.
    pub fn bool_equals(
        column: Column,
        param: &'static str,
        raw: impl Into<RawValue>,
    ) -> Result<Self, ValidationError> {
        Ok(Predicate::BoolEquals {
            column,
            param,
            value: validate_boolean(raw, param)?,
        })
    }

    /// Validates `raw` as a list and builds a membership predicate.
    pub fn in_list(
        column: Column,
        param: &'static str,
        raw: impl Into<RawValue>,
    ) -> Result<Self, ValidationError> {
        Ok(Predicate::InList {
            column,
            param,
            values: validate_list(raw, param, DEFAULT_MAX_LIST_ITEMS)?,
        })
    }

    /// Wraps a predicate on a child table as a filter on the parent table.
    pub fn within(column: Column, source: &'static str, inner: Predicate) -> Self {
        Predicate::Within {
            column,
            source,
            inner: Box::new(inner),
        }
    }

    /// Renders the expression text and appends its bound values to `params`.
    ///
    /// Fails if a placeholder name is already present in `params`.
    pub fn render(
        &self,
        params: &mut BTreeMap<String, SqlParam>,
    ) -> Result<String, AssemblyError> {
        match self {
            Predicate::DateFrom {
                column,
                param,
                value,
            } => {
                insert_param(params, param, SqlParam::text(value))?;
                Ok(format!("{} >= :{}", column, param))
            }
            Predicate::DateTo {
                column,
                param,
                value,
            } => {
                insert_param(params, param, SqlParam::text(value))?;
                Ok(format!("{} <= :{}", column, param))
            }
            Predicate::TextEquals {
                column,
                param,
                value,
            } => {
                insert_param(params, param, SqlParam::text(value))?;
                Ok(format!("{} = :{}", column, param))
            }
            Predicate::TextILike {
                column,
                param,
                value,
            } => {
                let pattern = format!("%{}%", escape_like(value));
                insert_param(params, param, SqlParam::Text(pattern))?;
                Ok(format!(
                    "LOWER({}) LIKE LOWER(:{}) ESCAPE '\\'",
                    column, param
                ))
            }
            Predicate::BoolEquals {
                column,
                param,
                value,
            } => {
                insert_param(params, param, SqlParam::Bool(*value))?;
                Ok(format!("{} = :{}", column, param))
            }
            Predicate::InList {
                column,
                param,
                values,
            } => {
                if values.is_empty() {
                    return Ok("1 = 0".to_string());
                }
                let mut placeholders = Vec::with_capacity(values.len());
                for (i, value) in values.iter().enumerate() {
                    let name = format!("{}_{}", param, i);
                    insert_param(params, &name, SqlParam::text(value))?;
                    placeholders.push(format!(":{}", name));
                }
                Ok(format!("{} IN ({})", column, placeholders.join(", ")))
            }
            Predicate::Within {
                column,
                source,
                inner,
            } => {
                let inner_sql = inner.render(params)?;
                Ok(format!(
                    "{} IN (SELECT {} FROM {} WHERE {})",
                    column, column, source, inner_sql
                ))
            }
            Predicate::Static(sql) => Ok((*sql).to_string()),
        }
    }
}

fn insert_param(
    params: &mut BTreeMap<String, SqlParam>,
    name: &str,
    value: SqlParam,
) -> Result<(), AssemblyError> {
    if params.contains_key(name) {
        return Err(AssemblyError::DuplicatePlaceholder {
            name: name.to_string(),
        });
    }
    params.insert(name.to_string(), value);
    Ok(())
}

/// Escapes LIKE wildcards so user text matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// An ordered collection of accepted predicates, joined with `AND`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a predicate.
    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    /// Appends a predicate, builder style.
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.push(predicate);
        self
    }

    /// Returns the number of predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns true if there are no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Iterates over the predicates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter()
    }

    /// Renders the `AND`-joined condition, or `None` when empty.
    pub fn render(
        &self,
        params: &mut BTreeMap<String, SqlParam>,
    ) -> Result<Option<String>, AssemblyError> {
        if self.predicates.is_empty() {
            return Ok(None);
        }
        let conditions = self
            .predicates
            .iter()
            .map(|p| p.render(params))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(conditions.join(" AND ")))
    }
}

impl Extend<Predicate> for FilterSet {
    fn extend<T: IntoIterator<Item = Predicate>>(&mut self, iter: T) {
        self.predicates.extend(iter);
    }
}

/// An executable statement: SQL text plus named parameter values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledQuery {
    /// The statement text with `:name` placeholders.
    pub sql: String,
    /// Values for every placeholder, keyed by name (without the colon).
    pub params: BTreeMap<String, SqlParam>,
}

impl AssembledQuery {
    /// Returns the value bound to `name`, if any.
    pub fn param(&self, name: &str) -> Option<&SqlParam> {
        self.params.get(name)
    }
}

/// Builds an [`AssembledQuery`] from templates, filters and binds.
#[derive(Debug)]
pub struct QueryAssembler<'a> {
    base: &'static str,
    filters: Option<&'a FilterSet>,
    tail: Option<&'static str>,
    binds: Vec<(&'static str, SqlParam)>,
}

impl<'a> QueryAssembler<'a> {
    /// Starts a statement from a base template.
    pub fn new(base: &'static str) -> Self {
        Self {
            base,
            filters: None,
            tail: None,
            binds: Vec::new(),
        }
    }

    /// Sets the filters rendered into the `WHERE` clause.
    pub fn filters(mut self, filters: &'a FilterSet) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Sets the template appended after the `WHERE` clause.
    pub fn tail(mut self, tail: &'static str) -> Self {
        self.tail = Some(tail);
        self
    }

    /// Binds a value to a placeholder that appears in the base or tail.
    pub fn bind(mut self, name: &'static str, value: SqlParam) -> Self {
        self.binds.push((name, value));
        self
    }

    /// Assembles the statement.
    ///
    /// Fails fast if a template looks like it was built with string
    /// formatting or if any placeholder name is claimed twice.
    pub fn assemble(self) -> Result<AssembledQuery, AssemblyError> {
        check_template(self.base)?;
        if let Some(tail) = self.tail {
            check_template(tail)?;
        }

        let mut params = BTreeMap::new();
        for (name, value) in self.binds {
            insert_param(&mut params, name, value)?;
        }

        let mut sql = self.base.trim().to_string();
        if let Some(filters) = self.filters {
            if let Some(condition) = filters.render(&mut params)? {
                sql.push_str(" WHERE ");
                sql.push_str(&condition);
            }
        }
        if let Some(tail) = self.tail {
            sql.push(' ');
            sql.push_str(tail.trim());
        }

        trace!(sql = %sql, param_count = params.len(), "Assembled query");

        Ok(AssembledQuery { sql, params })
    }
}

fn check_template(template: &str) -> Result<(), AssemblyError> {
    if template.trim().is_empty() {
        return Err(AssemblyError::EmptyTemplate);
    }
    if let Some(character) = template
        .chars()
        .find(|c| UNSAFE_TEMPLATE_CHARS.contains(c))
    {
        return Err(AssemblyError::UnsafeTemplate { character });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "SELECT employer_name, COUNT(job_id) AS job_count FROM job_dashboard_base";
    const DATE: Column = Column::new("job_posted_at_date");
    const EMPLOYER: Column = Column::new("employer_name");
    const REMOTE: Column = Column::new("job_is_remote");

    #[test]
    fn test_no_predicates_is_where_free() {
        let filters = FilterSet::new();
        let query = QueryAssembler::new(BASE).filters(&filters).assemble().unwrap();
        assert_eq!(query.sql, BASE);
        assert!(!query.sql.contains("WHERE"));
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_n_predicates_join_with_n_minus_one_and() {
        let filters = FilterSet::new()
            .with(Predicate::date_from(DATE, "date_from", "2024-01-01").unwrap())
            .with(Predicate::date_to(DATE, "date_to", "2024-06-30").unwrap())
            .with(Predicate::text_equals(EMPLOYER, "employer_name", "Acme").unwrap())
            .with(Predicate::bool_equals(REMOTE, "job_is_remote", "true").unwrap());

        let query = QueryAssembler::new(BASE).filters(&filters).assemble().unwrap();

        assert_eq!(query.sql.matches(" AND ").count(), 3);
        assert_eq!(query.params.len(), 4);
        assert_eq!(
            query.sql,
            format!(
                "{} WHERE job_posted_at_date >= :date_from AND job_posted_at_date <= :date_to \
                 AND employer_name = :employer_name AND job_is_remote = :job_is_remote",
                BASE
            )
        );
        assert_eq!(query.param("date_from"), Some(&SqlParam::text("2024-01-01")));
        assert_eq!(query.param("job_is_remote"), Some(&SqlParam::Bool(true)));
    }

    #[test]
    fn test_values_never_appear_in_sql_text() {
        let filters = FilterSet::new()
            .with(Predicate::text_equals(EMPLOYER, "employer_name", "Acme Widgets").unwrap());
        let query = QueryAssembler::new(BASE).filters(&filters).assemble().unwrap();
        assert!(!query.sql.contains("Acme"));
        assert_eq!(
            query.param("employer_name"),
            Some(&SqlParam::text("Acme Widgets"))
        );
    }

    #[test]
    fn test_in_list_generates_unique_placeholders() {
        let filters = FilterSet::new().with(
            Predicate::in_list(Column::new("skill"), "skill", vec!["Python", "SQL", "Rust"])
                .unwrap(),
        );
        let query = QueryAssembler::new("SELECT skill FROM job_skills")
            .filters(&filters)
            .assemble()
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT skill FROM job_skills WHERE skill IN (:skill_0, :skill_1, :skill_2)"
        );
        assert_eq!(query.param("skill_1"), Some(&SqlParam::text("SQL")));
    }

    #[test]
    fn test_empty_in_list_matches_nothing() {
        let mut params = BTreeMap::new();
        let predicate = Predicate::in_list(Column::new("skill"), "skill", "").unwrap();
        assert_eq!(predicate.render(&mut params).unwrap(), "1 = 0");
        assert!(params.is_empty());
    }

    #[test]
    fn test_ilike_escapes_wildcards() {
        let mut params = BTreeMap::new();
        let predicate =
            Predicate::text_ilike(Column::new("search_position_query"), "position", "100%_data")
                .unwrap();
        let sql = predicate.render(&mut params).unwrap();
        assert_eq!(
            sql,
            "LOWER(search_position_query) LIKE LOWER(:position) ESCAPE '\\'"
        );
        assert_eq!(params["position"], SqlParam::text("%100\\%\\_data%"));
    }

    #[test]
    fn test_within_wraps_child_predicate() {
        let inner = Predicate::in_list(Column::new("skill"), "skills", "Python").unwrap();
        let predicate = Predicate::within(Column::new("job_id"), "job_skills", inner);
        let mut params = BTreeMap::new();
        assert_eq!(
            predicate.render(&mut params).unwrap(),
            "job_id IN (SELECT job_id FROM job_skills WHERE skill IN (:skills_0))"
        );
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_static_predicate_binds_nothing() {
        let filters = FilterSet::new().with(Predicate::Static("seniority IS NOT NULL"));
        let query = QueryAssembler::new("SELECT DISTINCT seniority FROM job_skills")
            .filters(&filters)
            .assemble()
            .unwrap();
        assert!(query.sql.ends_with("WHERE seniority IS NOT NULL"));
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_tail_and_binds() {
        let filters = FilterSet::new();
        let query = QueryAssembler::new(BASE)
            .filters(&filters)
            .tail("GROUP BY employer_name ORDER BY job_count DESC LIMIT :limit")
            .bind("limit", SqlParam::Integer(20))
            .assemble()
            .unwrap();
        assert_eq!(
            query.sql,
            format!(
                "{} GROUP BY employer_name ORDER BY job_count DESC LIMIT :limit",
                BASE
            )
        );
        assert_eq!(query.param("limit"), Some(&SqlParam::Integer(20)));
    }

    #[test]
    fn test_unsafe_template_fails_fast() {
        for template in [
            "SELECT * FROM jobs {where_clause}",
            "SELECT * FROM jobs WHERE name LIKE '%x%'",
            "SELECT * FROM jobs }",
        ] {
            let err = QueryAssembler::new(template).assemble().unwrap_err();
            assert!(matches!(err, AssemblyError::UnsafeTemplate { .. }));
        }

        let err = QueryAssembler::new(BASE)
            .tail("LIMIT {limit}")
            .assemble()
            .unwrap_err();
        assert_eq!(err, AssemblyError::UnsafeTemplate { character: '{' });
    }

    #[test]
    fn test_empty_template_fails() {
        let err = QueryAssembler::new("   ").assemble().unwrap_err();
        assert_eq!(err, AssemblyError::EmptyTemplate);
    }

    #[test]
    fn test_duplicate_placeholder_fails() {
        let filters = FilterSet::new()
            .with(Predicate::text_equals(EMPLOYER, "name", "Acme").unwrap())
            .with(Predicate::text_equals(Column::new("job_publisher"), "name", "LinkedIn").unwrap());
        let err = QueryAssembler::new(BASE).filters(&filters).assemble().unwrap_err();
        assert_eq!(
            err,
            AssemblyError::DuplicatePlaceholder {
                name: "name".to_string()
            }
        );

        let filters = FilterSet::new()
            .with(Predicate::text_equals(EMPLOYER, "limit", "Acme").unwrap());
        let err = QueryAssembler::new(BASE)
            .filters(&filters)
            .bind("limit", SqlParam::Integer(1))
            .assemble()
            .unwrap_err();
        assert!(matches!(err, AssemblyError::DuplicatePlaceholder { .. }));
    }

    #[test]
    fn test_constructors_validate_values() {
        let err = Predicate::date_from(DATE, "job_posted_at_date_from", "2023-02-29").unwrap_err();
        assert_eq!(err.field(), "job_posted_at_date_from");

        let err = Predicate::text_equals(EMPLOYER, "employer_name", "x' OR '1'='1").unwrap_err();
        assert!(matches!(err, ValidationError::SuspiciousPattern { .. }));

        let err = Predicate::bool_equals(REMOTE, "job_is_remote", "maybe").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidBoolean { .. }));
    }
}
