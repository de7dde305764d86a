//! CLI argument definitions using clap
//!
//! Commands:
//! - orgstore start --config <path>
//! - orgstore explain --table <table> --query <cql> [--offset] [--limit] [--tenant]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::rest_api::DEFAULT_LIMIT;

/// orgstore - tenant-scoped JSON document storage over HTTP
#[derive(Parser, Debug)]
#[command(name = "orgstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./orgstore.json")]
        config: PathBuf,
    },

    /// Print the SQL a filter expression compiles to
    Explain {
        /// Entity table
        #[arg(long)]
        table: String,

        /// Filter expression
        #[arg(long, default_value = "")]
        query: String,

        #[arg(long, default_value_t = 0)]
        offset: u32,

        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,

        /// Tenant token; omitted means the module namespace
        #[arg(long)]
        tenant: Option<String>,

        /// Module name used to build the namespace
        #[arg(long, default_value = "mod_organizations_storage")]
        module_name: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_default_config() {
        let cli = Cli::try_parse_from(["orgstore", "start"]).unwrap();
        match cli.command {
            Command::Start { config } => assert_eq!(config, PathBuf::from("./orgstore.json")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_explain_args() {
        let cli = Cli::try_parse_from([
            "orgstore", "explain", "--table", "phone_number", "--query", "phoneNumber=1978*",
            "--limit", "5", "--tenant", "diku",
        ])
        .unwrap();
        match cli.command {
            Command::Explain { table, query, offset, limit, tenant, .. } => {
                assert_eq!(table, "phone_number");
                assert_eq!(query, "phoneNumber=1978*");
                assert_eq!((offset, limit), (0, 5));
                assert_eq!(tenant.as_deref(), Some("diku"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_explain_requires_table() {
        assert!(Cli::try_parse_from(["orgstore", "explain"]).is_err());
    }
}
