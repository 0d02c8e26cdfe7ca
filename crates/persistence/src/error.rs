//! Error types for the persistence layer.
//!
//! Errors are split by who is at fault:
//!
//! - [`ValidationError`] - the caller supplied bad input (recoverable, client error)
//! - [`AssemblyError`] - a developer-authored query template is unsafe (defect)
//! - [`BackendError`] - the database driver failed (propagated unchanged in kind)

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Input validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Query template errors
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Returns true if retrying the operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::Backend(
                BackendError::ConnectionFailed { .. }
                    | BackendError::PoolExhausted { .. }
                    | BackendError::Unavailable { .. }
            )
        )
    }
}

/// Errors raised by the filter validator.
///
/// Every variant names the offending field so the message can be shown to
/// the client as is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be a string")]
    NotText { field: String },

    #[error("{field} exceeds maximum length of {max_length}")]
    TooLong { field: String, max_length: usize },

    #[error("Invalid input detected in {field}")]
    SuspiciousPattern { field: String },

    #[error("Invalid characters in {field}")]
    InvalidCharacters { field: String },

    #[error("{field} must be in YYYY-MM-DD format")]
    InvalidDateFormat { field: String },

    #[error("{field} is not a valid date")]
    InvalidDate { field: String },

    #[error("{field} must be a string or boolean")]
    NotBoolean { field: String },

    #[error("{field} must be true/false or 1/0")]
    InvalidBoolean { field: String },

    #[error("{field} must be an integer")]
    NotInteger { field: String },

    #[error("{field} must be a valid integer")]
    InvalidInteger { field: String },

    #[error("{field} must be at least {min}")]
    BelowMinimum { field: String, min: i64 },

    #[error("{field} must be at most {max}")]
    AboveMaximum { field: String, max: i64 },

    #[error("{field} must be a list or comma-separated string")]
    NotList { field: String },

    #[error("{field} cannot have more than {max_items} items")]
    TooManyItems { field: String, max_items: usize },
}

impl ValidationError {
    /// Returns the name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::NotText { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::SuspiciousPattern { field }
            | ValidationError::InvalidCharacters { field }
            | ValidationError::InvalidDateFormat { field }
            | ValidationError::InvalidDate { field }
            | ValidationError::NotBoolean { field }
            | ValidationError::InvalidBoolean { field }
            | ValidationError::NotInteger { field }
            | ValidationError::InvalidInteger { field }
            | ValidationError::BelowMinimum { field, .. }
            | ValidationError::AboveMaximum { field, .. }
            | ValidationError::NotList { field }
            | ValidationError::TooManyItems { field, .. } => field,
        }
    }
}

/// Errors raised while assembling a statement.
///
/// These indicate a mistake in a developer-authored template, never bad
/// user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("query template contains potentially unsafe character '{character}'")]
    UnsafeTemplate { character: char },

    #[error("query template is empty")]
    EmptyTemplate,

    #[error("placeholder :{name} is bound more than once")]
    DuplicatePlaceholder { name: String },
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Connection pool exhausted.
    #[error("connection pool exhausted for {backend_name}")]
    PoolExhausted { backend_name: String },

    /// Schema migration error.
    #[error("schema migration failed: {message}")]
    MigrationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
