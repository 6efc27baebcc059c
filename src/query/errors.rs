//! # Query Errors
//!
//! Failures while compiling request parameters into a plan. All of them are
//! the caller's fault and are never retried.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Result type for query compilation
pub type QueryResult<T> = Result<T, QueryError>;

/// Query compilation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Collection is not known to the catalog
    #[error("Collection not found: {0}")]
    UnknownCollection(String),

    /// Field is not declared by the collection
    #[error("Unknown field '{field}' on collection {collection}")]
    UnknownField { collection: String, field: String },

    /// Control parameter with a value that does not parse
    #[error("Invalid value '{value}' for control parameter c:{param}")]
    InvalidControlParam { param: String, value: String },

    /// `c:` parameter that does not exist
    #[error("Unknown control parameter: c:{0}")]
    UnknownControlParam(String),

    /// Operand cannot be converted to the field's type
    #[error("Invalid operand '{operand}' for field '{field}': expected {expected}")]
    InvalidOperand {
        field: String,
        operand: String,
        expected: &'static str,
    },
}

impl QueryError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::UnknownCollection(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub(crate) fn unknown_field(collection: &str, field: &str) -> Self {
        QueryError::UnknownField {
            collection: collection.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_control(param: &str, value: &str) -> Self {
        QueryError::InvalidControlParam {
            param: param.to_string(),
            value: value.to_string(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, error: impl ToString) -> Self {
        Self {
            code: status.as_u16(),
            error: error.to_string(),
        }
    }
}

impl From<QueryError> for ErrorResponse {
    fn from(err: QueryError) -> Self {
        Self::new(err.status_code(), err)
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
