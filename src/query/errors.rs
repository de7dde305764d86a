//! # Query Errors
//!
//! Error types for filter compilation and translation.

use thiserror::Error;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Diagnostic produced by the filter compiler.
///
/// `position` is the byte offset of the offending token in the raw
/// expression, so the caller sees exactly where compilation stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Query translation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The filter expression did not compile
    #[error("CQL parse error: {0}")]
    Parse(#[from] ParseError),

    /// Table name is not a valid storage identifier
    #[error("Invalid table name: {0}")]
    InvalidTable(String),
}

impl QueryError {
    /// True when the failure came from the caller's expression rather than
    /// from server-side configuration.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, QueryError::Parse(_))
    }
}
