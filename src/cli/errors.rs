//! CLI-specific error types
//!
//! All CLI errors are fatal: `main` prints them and exits non-zero.

use thiserror::Error;

use crate::config::ConfigError;
use crate::query::QueryError;
use crate::storage::StorageError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error("ORGSTORE_CLI_CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),

    #[error("ORGSTORE_CLI_STORAGE_ERROR: {0}")]
    Storage(#[from] StorageError),

    #[error("ORGSTORE_CLI_QUERY_ERROR: {0}")]
    Query(#[from] QueryError),

    #[error("ORGSTORE_CLI_BOOT_FAILED: {0}")]
    BootFailed(String),
}

impl CliError {
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        CliError::BootFailed(msg.into())
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "ORGSTORE_CLI_CONFIG_ERROR",
            CliError::Storage(_) => "ORGSTORE_CLI_STORAGE_ERROR",
            CliError::Query(_) => "ORGSTORE_CLI_QUERY_ERROR",
            CliError::BootFailed(_) => "ORGSTORE_CLI_BOOT_FAILED",
        }
    }
}
