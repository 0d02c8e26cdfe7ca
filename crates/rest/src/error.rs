//! Error types for the analytics REST API.
//!
//! This module defines [`RestError`], the error type returned by every
//! handler. Each error renders as a JSON body of the form
//! `{"detail": "<message>"}` with a matching HTTP status code.
//!
//! Messages never contain SQL text or driver output; those details go to the
//! log instead.

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hiremetrics_persistence::error::{AssemblyError, BackendError, StorageError, ValidationError};
use tracing::error;

/// Message returned when the database cannot be reached.
pub const UNAVAILABLE_DETAIL: &str = "Database temporarily unavailable. Please try again.";

/// Message returned for every unexpected failure.
pub const INTERNAL_DETAIL: &str = "Internal server error";

/// REST API error type.
///
/// # HTTP Status Code Mapping
///
/// | Error | Status Code |
/// |-------|-------------|
/// | `BadRequest` | 400 |
/// | `NotFound` | 404 |
/// | `InternalError` | 500 |
/// | `ServiceUnavailable` | 503 |
#[derive(Debug)]
pub enum RestError {
    /// The client supplied an invalid filter value.
    BadRequest {
        /// Reason shown to the client.
        message: String,
    },

    /// No route matched the request path.
    NotFound {
        /// The requested path.
        path: String,
    },

    /// An unexpected failure. The message is logged, not returned.
    InternalError {
        /// Internal description of the failure.
        message: String,
    },

    /// The database is temporarily unreachable.
    ServiceUnavailable {
        /// Internal description of the failure.
        message: String,
    },
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::BadRequest { message } => write!(f, "Invalid input: {}", message),
            RestError::NotFound { path } => write!(f, "Not found: {}", path),
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
            RestError::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {}", message)
            }
        }
    }
}

impl std::error::Error for RestError {}

impl RestError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns the message placed in the response body.
    pub fn detail(&self) -> String {
        match self {
            RestError::BadRequest { message } => format!("Invalid input: {}", message),
            RestError::NotFound { .. } => "Not found".to_string(),
            RestError::InternalError { .. } => INTERNAL_DETAIL.to_string(),
            RestError::ServiceUnavailable { .. } => UNAVAILABLE_DETAIL.to_string(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        match &self {
            RestError::InternalError { message } => {
                error!(error = %message, "Request failed");
            }
            RestError::ServiceUnavailable { message } => {
                error!(error = %message, "Database unavailable");
            }
            _ => {}
        }

        let body = serde_json::json!({ "detail": self.detail() });
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        if err.is_transient() {
            return RestError::ServiceUnavailable {
                message: err.to_string(),
            };
        }
        match &err {
            StorageError::Validation(e) => RestError::BadRequest {
                message: e.to_string(),
            },
            _ => RestError::InternalError {
                message: err.to_string(),
            },
        }
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        StorageError::from(err).into()
    }
}

impl From<AssemblyError> for RestError {
    fn from(err: AssemblyError) -> Self {
        StorageError::from(err).into()
    }
}

impl From<BackendError> for RestError {
    fn from(err: BackendError) -> Self {
        StorageError::from(err).into()
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::InternalError {
            message: format!("response encoding failed: {}", err),
        }
    }
}

/// Result type alias for REST operations.
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: RestError = StorageError::from(ValidationError::BelowMinimum {
            field: "limit".to_string(),
            min: 1,
        })
        .into();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail(), "Invalid input: limit must be at least 1");
    }

    #[test]
    fn test_assembly_maps_to_internal_error() {
        let err: RestError = AssemblyError::UnsafeTemplate { character: '%' }.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail(), INTERNAL_DETAIL);
    }

    #[test]
    fn test_connection_failure_maps_to_unavailable() {
        let err: RestError = BackendError::ConnectionFailed {
            backend_name: "sqlite".to_string(),
            message: "pool timed out".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.detail(), UNAVAILABLE_DETAIL);
    }

    #[test]
    fn test_transient_backend_errors_map_to_unavailable() {
        let busy = StorageError::from(BackendError::Unavailable {
            backend_name: "sqlite".to_string(),
            message: "database is locked".to_string(),
        });
        assert!(busy.is_transient());
        assert_eq!(
            RestError::from(busy).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let exhausted: RestError = BackendError::PoolExhausted {
            backend_name: "sqlite".to_string(),
        }
        .into();
        assert_eq!(exhausted.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_query_error_hides_sql() {
        let err: RestError = BackendError::QueryError {
            message: "no such column: secret_column".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.detail().contains("secret_column"));
    }

    #[test]
    fn test_display() {
        let err = RestError::BadRequest {
            message: "employer_name exceeds maximum length of 255".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid input: employer_name exceeds maximum length of 255"
        );
    }
}
