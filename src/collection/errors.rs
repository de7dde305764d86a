//! # Engine Errors
//!
//! Single failure shape for everything an entity operation can hit.

use thiserror::Error;

use crate::query::QueryError;
use crate::storage::StorageError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Translation, storage and input failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Create or update body was not a JSON object
    #[error("record body is not a JSON object")]
    InvalidBody,
}

impl EngineError {
    pub fn is_parse_error(&self) -> bool {
        matches!(self, EngineError::Query(err) if err.is_parse_error())
    }

    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, EngineError::Storage(err) if err.is_invalid_identifier())
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, EngineError::Storage(err) if err.is_constraint_violation())
    }
}
