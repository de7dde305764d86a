//! # REST API Errors
//!
//! Request errors caught before the engine runs. Engine failures never show
//! up here: they arrive as outcomes.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type for REST request handling
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestError {
    /// Paging or other query parameter is malformed
    #[error("Invalid query parameter: {0}")]
    InvalidQueryParam(String),

    /// Limit exceeds maximum
    #[error("Limit {0} exceeds maximum {1}")]
    LimitExceeded(u64, u32),

    /// Request body is not JSON
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl RestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::InvalidQueryParam(_)
            | RestError::LimitExceeded(_, _)
            | RestError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
