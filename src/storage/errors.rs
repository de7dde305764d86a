//! # Storage Errors

use thiserror::Error;

/// Message fragment the storage engine uses for malformed identifiers.
///
/// Error text from an external engine may only be available as a string, so
/// classification also recognises the fragment inside arbitrary messages.
pub const INVALID_UUID_SIGNATURE: &str = "invalid input syntax for type uuid";

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Key is not a syntactically valid UUID
    #[error("invalid input syntax for type uuid: \"{0}\"")]
    InvalidIdentifier(String),

    /// A constraint rejected the write
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Stored document could not be decoded or encoded
    #[error("malformed document: {0}")]
    Document(String),

    /// Engine-level failure
    #[error("database error: {0}")]
    Database(String),

    /// Background storage task failed to complete
    #[error("storage task failed: {0}")]
    Task(String),
}

impl StorageError {
    /// True when the failure means the identifier cannot name any record
    pub fn is_invalid_identifier(&self) -> bool {
        match self {
            StorageError::InvalidIdentifier(_) => true,
            other => other.to_string().contains(INVALID_UUID_SIGNATURE),
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StorageError::Constraint(_))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::Constraint(err.to_string())
            }
            _ => StorageError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Document(err.to_string())
    }
}
