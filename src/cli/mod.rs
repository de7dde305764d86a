//! CLI module for orgstore
//!
//! Provides command-line interface for:
//! - start: Load configuration and serve HTTP
//! - explain: Print the SQL for a filter expression

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{build_service, explain, open_storage, run, run_command, start};
pub use errors::{CliError, CliResult};
