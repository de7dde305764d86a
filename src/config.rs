//! # Configuration
//!
//! JSON configuration file. Every field has a default, so `{}` is a valid
//! configuration serving the built-in entities from memory.

use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collection::{default_entities, EntityDescriptor};
use crate::messages::DEFAULT_LOCALE;
use crate::observability::LogFormat;
use crate::query::validate_table_name;
use crate::rest_api::{RouterOptions, DEFAULT_TENANT_HEADER};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Storage backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,
    Sqlite { path: PathBuf },
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins; empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Suffix of every tenant namespace
    #[serde(default = "default_module_name")]
    pub module_name: String,

    /// Request header carrying the tenant token
    #[serde(default = "default_tenant_header")]
    pub tenant_header: String,

    /// Locale used when a request has no `lang`
    #[serde(default = "default_locale")]
    pub default_locale: String,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default = "default_entities")]
    pub entities: Vec<EntityDescriptor>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_module_name() -> String {
    "mod_organizations_storage".to_string()
}

fn default_tenant_header() -> String {
    DEFAULT_TENANT_HEADER.to_string()
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            module_name: default_module_name(),
            tenant_header: default_tenant_header(),
            default_locale: default_locale(),
            log_format: LogFormat::default(),
            storage: StorageConfig::default(),
            entities: default_entities(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.socket_addr()?;

        if validate_table_name(&self.module_name).is_err() {
            return Err(ConfigError::Invalid(format!(
                "module_name '{}' must be a lowercase identifier",
                self.module_name
            )));
        }

        if HeaderName::from_bytes(self.tenant_header.as_bytes()).is_err() {
            return Err(ConfigError::Invalid(format!(
                "tenant_header '{}' is not a valid header name",
                self.tenant_header
            )));
        }

        if self.default_locale.trim().is_empty() {
            return Err(ConfigError::Invalid("default_locale must not be empty".to_string()));
        }

        if let StorageConfig::Sqlite { path } = &self.storage {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("storage.path must not be empty".to_string()));
            }
        }

        self.validate_entities()
    }

    fn validate_entities(&self) -> ConfigResult<()> {
        if self.entities.is_empty() {
            return Err(ConfigError::Invalid("at least one entity is required".to_string()));
        }

        let mut tables = HashSet::new();
        let mut paths = HashSet::new();

        for entity in &self.entities {
            if validate_table_name(&entity.table).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "entity table '{}' must be a lowercase identifier",
                    entity.table
                )));
            }
            if !entity.path.starts_with('/') || entity.base_path() == "/" {
                return Err(ConfigError::Invalid(format!(
                    "entity path '{}' must be an absolute, non-root path",
                    entity.path
                )));
            }
            if entity.path.contains(':') || entity.path.contains('*') {
                return Err(ConfigError::Invalid(format!(
                    "entity path '{}' must not contain route parameters",
                    entity.path
                )));
            }
            if entity.base_path() == "/health" {
                return Err(ConfigError::Invalid("entity path '/health' is reserved".to_string()));
            }
            if entity.collection_key.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "entity '{}' needs a collection_key",
                    entity.table
                )));
            }
            if !tables.insert(entity.table.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate entity table '{}'", entity.table)));
            }
            if !paths.insert(entity.base_path()) {
                return Err(ConfigError::Invalid(format!("duplicate entity path '{}'", entity.path)));
            }
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> ConfigResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("invalid host/port: {}", e)))
    }

    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            tenant_header: self.tenant_header.clone(),
            default_locale: self.default_locale.clone(),
            cors_origins: self.cors_origins.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.tenant_header, "X-Okapi-Tenant");
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.entities, default_entities());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("orgstore.json");
        let db_path = temp_dir.path().join("orgstore.db");

        let config = json!({
            "port": 9130,
            "module_name": "mod_vendors",
            "log_format": "json",
            "storage": {"kind": "sqlite", "path": db_path},
            "entities": [
                {"table": "contact", "path": "/vendor-storage/contacts", "collection_key": "contacts"}
            ]
        });
        fs::write(&config_path, config.to_string()).unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.socket_addr().unwrap().port(), 9130);
        assert_eq!(config.storage, StorageConfig::Sqlite { path: db_path });
        assert_eq!(config.entities.len(), 1);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(&temp_dir.path().join("nope.json"));
        assert!(matches!(result, Err(ConfigError::Read(_))));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Config::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_rejects_bad_values() {
        for bad in [
            json!({"module_name": "Mod-Orgs"}),
            json!({"tenant_header": "bad header"}),
            json!({"host": "not a host"}),
            json!({"default_locale": " "}),
            json!({"entities": []}),
            json!({"entities": [{"table": "a", "path": "/x", "collection_key": "xs"},
                                {"table": "a", "path": "/y", "collection_key": "ys"}]}),
            json!({"entities": [{"table": "a", "path": "/x", "collection_key": "xs"},
                                {"table": "b", "path": "/x/", "collection_key": "ys"}]}),
            json!({"entities": [{"table": "a", "path": "relative", "collection_key": "xs"}]}),
            json!({"entities": [{"table": "a", "path": "/health", "collection_key": "xs"}]}),
            json!({"entities": [{"table": "a", "path": "/x/:id", "collection_key": "xs"}]}),
        ] {
            let result = Config::from_json(&bad.to_string());
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "accepted {}", bad);
        }
    }
}
