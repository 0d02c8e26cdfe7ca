//! Filter validation for untrusted query parameters.
//!
//! Every dashboard filter passes through one of the validators in this module
//! before it is bound to a statement. The validators are pure functions: the
//! same input and bounds always produce the same output or the same
//! [`ValidationError`] variant.
//!
//! Text is checked against two layers:
//!
//! 1. A denylist of SQL-injection idioms (keywords, boolean tautologies,
//!    stacked statements and comment terminators), matched case-insensitively.
//! 2. An allow-list of characters: word characters, whitespace, common
//!    punctuation and the Latin-1 Supplement / Latin Extended letters used in
//!    international place and company names.
//!
//! The allow-list on its own accepts payloads such as `admin' OR 1=1` that use
//! only ordinary characters, which is why the denylist runs first. Neither
//! layer replaces parameter binding; values are always bound by the driver.
//!
//! # Example
//!
//! ```
//! use hiremetrics_persistence::validation::{validate_integer, validate_text};
//!
//! assert_eq!(validate_text("  São Paulo ", "job_city", 255).unwrap(), "São Paulo");
//! assert!(validate_text("x' OR '1'='1", "employer_name", 255).is_err());
//! assert_eq!(validate_integer("100", "limit", Some(1), Some(100)).unwrap(), 100);
//! ```

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Regex, RegexSet};
use serde::Deserialize;

use crate::error::ValidationError;

/// Default maximum length (in characters) for text filters.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 255;

/// Default maximum number of elements in a list filter.
pub const DEFAULT_MAX_LIST_ITEMS: usize = 100;

static SAFE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[\w\s\-_.,@\#$%\&*()+=!?/:;<>\[\]{}|\~`"'\u{00C0}-\u{017F}\u{0100}-\u{024F}]*$"#)
        .expect("safe text regex")
});

static INJECTION_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)\b(union|select|insert|update|delete|drop|create|alter|exec|execute|script)\b",
        r"(?i)\b(and|or)\b\s+\d+\s*[=<>]",
        r#"(?i)\b(and|or)\b\s+'[^']*'\s*[=<>]"#,
        r#"(?i)\b(and|or)\b\s+"[^"]*"\s*[=<>]"#,
        r"(?i)\b(and|or)\b\s+(true|false|null)\s*[=<>]",
        r";\s*--",
        r"'\s*(--|\#|/\*)",
        r"(?s)/\*.*?\*/",
    ])
    .expect("injection pattern set")
});

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date regex"));

static BOOLEAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(true|false|1|0)$").expect("boolean regex"));

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("integer regex"));

/// An untrusted input value as received from the HTTP layer.
///
/// Query strings only ever produce [`RawValue::Text`], but JSON bodies and
/// programmatic callers can hand over native values, and each validator
/// decides which shapes it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A native boolean.
    Bool(bool),
    /// A native integer.
    Integer(i64),
    /// A string.
    Text(String),
    /// A list of strings.
    List(Vec<String>),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<&String> for RawValue {
    fn from(value: &String) -> Self {
        RawValue::Text(value.clone())
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(value: Vec<String>) -> Self {
        RawValue::List(value)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(value: Vec<&str>) -> Self {
        RawValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Returns true when an optional query parameter should be treated as absent.
///
/// Browsers and chart libraries send `""` or the literal `"null"` for cleared
/// filters; both mean the same as not sending the parameter at all.
pub fn is_absent(value: Option<&str>) -> bool {
    matches!(value, None | Some("") | Some("null"))
}

/// Validates free text and returns it trimmed.
pub fn validate_text(
    value: impl Into<RawValue>,
    field_name: &str,
    max_length: usize,
) -> Result<String, ValidationError> {
    let RawValue::Text(text) = value.into() else {
        return Err(ValidationError::NotText {
            field: field_name.to_string(),
        });
    };

    if text.chars().count() > max_length {
        return Err(ValidationError::TooLong {
            field: field_name.to_string(),
            max_length,
        });
    }

    if INJECTION_PATTERNS.is_match(&text) {
        return Err(ValidationError::SuspiciousPattern {
            field: field_name.to_string(),
        });
    }

    if !SAFE_TEXT.is_match(&text) {
        return Err(ValidationError::InvalidCharacters {
            field: field_name.to_string(),
        });
    }

    Ok(text.trim().to_string())
}

/// Validates a `YYYY-MM-DD` calendar date and returns it unchanged.
pub fn validate_date(
    value: impl Into<RawValue>,
    field_name: &str,
) -> Result<String, ValidationError> {
    let RawValue::Text(text) = value.into() else {
        return Err(ValidationError::NotText {
            field: field_name.to_string(),
        });
    };

    if !DATE.is_match(&text) {
        return Err(ValidationError::InvalidDateFormat {
            field: field_name.to_string(),
        });
    }

    NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field: field_name.to_string(),
    })?;

    Ok(text)
}

/// Validates a boolean given natively or as `true/false/1/0`.
pub fn validate_boolean(
    value: impl Into<RawValue>,
    field_name: &str,
) -> Result<bool, ValidationError> {
    match value.into() {
        RawValue::Bool(b) => Ok(b),
        RawValue::Text(text) => {
            if !BOOLEAN.is_match(&text) {
                return Err(ValidationError::InvalidBoolean {
                    field: field_name.to_string(),
                });
            }
            let lowered = text.to_ascii_lowercase();
            Ok(lowered == "true" || lowered == "1")
        }
        _ => Err(ValidationError::NotBoolean {
            field: field_name.to_string(),
        }),
    }
}

/// Validates an integer given natively or as a string of ASCII digits.
///
/// `min` and `max` are inclusive bounds; the error names the violated bound.
pub fn validate_integer(
    value: impl Into<RawValue>,
    field_name: &str,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<i64, ValidationError> {
    let result = match value.into() {
        RawValue::Integer(i) => i,
        RawValue::Text(text) => {
            if !INTEGER.is_match(&text) {
                return Err(ValidationError::InvalidInteger {
                    field: field_name.to_string(),
                });
            }
            text.parse::<i64>()
                .map_err(|_| ValidationError::InvalidInteger {
                    field: field_name.to_string(),
                })?
        }
        _ => {
            return Err(ValidationError::NotInteger {
                field: field_name.to_string(),
            });
        }
    };

    if let Some(min) = min {
        if result < min {
            return Err(ValidationError::BelowMinimum {
                field: field_name.to_string(),
                min,
            });
        }
    }

    if let Some(max) = max {
        if result > max {
            return Err(ValidationError::AboveMaximum {
                field: field_name.to_string(),
                max,
            });
        }
    }

    Ok(result)
}

/// Validates a list given natively or as a comma-separated string.
///
/// Each element is validated with [`validate_text`] under the field name
/// `"<field_name> item"`.
pub fn validate_list(
    value: impl Into<RawValue>,
    field_name: &str,
    max_items: usize,
) -> Result<Vec<String>, ValidationError> {
    let items: Vec<String> = match value.into() {
        RawValue::Text(text) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        RawValue::List(items) => items,
        _ => {
            return Err(ValidationError::NotList {
                field: field_name.to_string(),
            });
        }
    };

    if items.len() > max_items {
        return Err(ValidationError::TooManyItems {
            field: field_name.to_string(),
            max_items,
        });
    }

    let item_field = format!("{} item", field_name);
    items
        .into_iter()
        .map(|item| validate_text(item, &item_field, DEFAULT_MAX_TEXT_LENGTH))
        .collect()
}
