//! CLI command implementations
//!
//! `start` loads the configuration, installs logging, opens the storage
//! backend and serves HTTP until interrupted. `explain` is a one-shot
//! translation of a filter expression to SQL.

use std::path::Path;
use std::sync::Arc;

use super::args::Command;
use super::errors::{CliError, CliResult};
use crate::collection::CollectionService;
use crate::config::{Config, StorageConfig};
use crate::messages::Messages;
use crate::observability::init_logging;
use crate::query::{translate, QueryDescriptor};
use crate::rest_api::RestServer;
use crate::storage::sql;
use crate::storage::sqlite::table_ident;
use crate::storage::{MemoryStorage, SqliteStorage, StorageEngine};
use crate::tenant::TenantResolver;

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Start { config } => start(&config),
        Command::Explain {
            table,
            query,
            offset,
            limit,
            tenant,
            module_name,
        } => {
            let descriptor = QueryDescriptor::new(query, offset, limit);
            let resolver = TenantResolver::new(module_name);
            println!("{}", explain(&resolver, tenant.as_deref(), &table, &descriptor)?);
            Ok(())
        }
    }
}

/// Open the configured storage backend
pub fn open_storage(config: &StorageConfig) -> CliResult<Arc<dyn StorageEngine>> {
    Ok(match config {
        StorageConfig::Memory => Arc::new(MemoryStorage::new()),
        StorageConfig::Sqlite { path } => Arc::new(SqliteStorage::open(path)?),
    })
}

/// Build the collection service described by `config`
pub fn build_service(config: &Config) -> CliResult<CollectionService> {
    let engine = open_storage(&config.storage)?;
    Ok(CollectionService::new(
        config.entities.clone(),
        TenantResolver::new(config.module_name.clone()),
        engine,
        Arc::new(Messages::new(config.default_locale.clone())),
    ))
}

/// Load configuration and serve HTTP
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    init_logging(config.log_format);

    let service = build_service(&config)?;
    let addr = config.socket_addr()?;
    tracing::info!(
        config = %config_path.display(),
        module = %config.module_name,
        storage = ?config.storage,
        entities = config.entities.len(),
        "Starting orgstore"
    );
    for entity in &config.entities {
        tracing::info!(table = %entity.table, path = %entity.base_path(), "Entity routes registered");
    }

    let server = RestServer::new(addr, service, &config.router_options());

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// SQL and bound parameters for a collection query against `table`
pub fn explain(
    resolver: &TenantResolver,
    tenant: Option<&str>,
    table: &str,
    descriptor: &QueryDescriptor,
) -> CliResult<String> {
    let filter = translate(table, descriptor)?;
    let ident = table_ident(&resolver.resolve(tenant), table);
    Ok(sql::explain(&ident, &filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_explain_names_tenant_table() {
        let resolver = TenantResolver::new("mod_orgs");
        let out = explain(
            &resolver,
            Some("diku"),
            "phone_number",
            &QueryDescriptor::new("phoneNumber==1978", 5, 20),
        )
        .unwrap();
        assert!(out.contains("\"diku_mod_orgs.phone_number\""));
        assert!(out.ends_with("-- params: ['1978', 20, 5]"));
    }

    #[test]
    fn test_explain_parse_error() {
        let resolver = TenantResolver::new("mod_orgs");
        let err = explain(&resolver, None, "t", &QueryDescriptor::new("a=", 0, 10)).unwrap_err();
        assert_eq!(err.code(), "ORGSTORE_CLI_QUERY_ERROR");
    }

    #[test]
    fn test_start_rejects_bad_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("orgstore.json");
        fs::write(&config_path, json!({"module_name": "Bad Name"}).to_string()).unwrap();

        let err = start(&config_path).unwrap_err();
        assert_eq!(err.code(), "ORGSTORE_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_build_service_with_sqlite() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_json(
            &json!({"storage": {"kind": "sqlite", "path": temp_dir.path().join("db.sqlite")}})
                .to_string(),
        )
        .unwrap();
        let service = build_service(&config).unwrap();
        assert_eq!(service.entities().len(), 3);
        assert!(temp_dir.path().join("db.sqlite").exists());
    }
}
