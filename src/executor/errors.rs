//! # Execution Errors
//!
//! Failures raised at the plan executor boundary. They surface as request
//! failures and are never retried here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::query::ErrorResponse;

/// Result type for plan execution
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Plan execution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The document store cannot be reached
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store rejected the plan
    #[error("Plan rejected by the document store: {0}")]
    Rejected(String),

    /// The collection has not been built yet
    #[error("Collection not yet available: {0}")]
    CollectionUnavailable(String),

    /// A regex operand this store cannot evaluate
    #[error("Unsupported pattern '{pattern}': {reason}")]
    UnsupportedPattern { pattern: String, reason: String },
}

impl ExecutionError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ExecutionError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ExecutionError::CollectionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ExecutionError::Rejected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ExecutionError::UnsupportedPattern { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ExecutionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(status, self));
        (status, body).into_response()
    }
}
