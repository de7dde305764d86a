//! # Storage Module
//!
//! Tenant-scoped document storage. A [`StorageEngine`] hands out a
//! [`StorageClient`] bound to one namespace; callers pass that client
//! explicitly to every operation.
//!
//! Every client call is asynchronous, single-shot and never retried.

pub mod errors;
pub mod memory;
pub mod sql;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::query::StorageFilter;
use crate::tenant::Namespace;

pub use errors::{StorageError, StorageResult, INVALID_UUID_SIGNATURE};
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// One page of a filtered query plus the unpaginated match count
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub rows: Vec<Value>,
    pub total_records: u64,
}

/// Document operations scoped to one namespace
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Namespace this client is bound to
    fn namespace(&self) -> &Namespace;

    /// Matching rows for the filter's page and the total match count, in one
    /// round trip
    async fn query(&self, filter: &StorageFilter) -> StorageResult<QueryPage>;

    /// Point lookup by key
    async fn get_by_key(&self, table: &str, id: &str) -> StorageResult<Option<Value>>;

    /// Insert or replace the document under `id`; returns the persisted key
    async fn save(&self, table: &str, id: &str, document: &Value) -> StorageResult<String>;

    /// Replace the document under `id`; returns the number of rows modified
    async fn update(&self, table: &str, document: &Value, id: &str) -> StorageResult<u64>;

    /// Remove the document under `id`
    async fn delete(&self, table: &str, id: &str) -> StorageResult<()>;
}

/// Source of namespace-scoped clients
pub trait StorageEngine: Send + Sync {
    fn client(&self, namespace: &Namespace) -> Arc<dyn StorageClient>;
}

/// Keys are UUIDs; anything else is rejected the way the engine rejects a
/// malformed `uuid` literal.
///
/// Returns the canonical lowercase hyphenated form, so every accepted
/// spelling of one UUID names the same record.
pub fn validate_key(id: &str) -> StorageResult<String> {
    Uuid::parse_str(id)
        .map(|uuid| uuid.hyphenated().to_string())
        .map_err(|_| StorageError::InvalidIdentifier(id.to_string()))
}
