//! # In-Memory Storage
//!
//! Process-local backend. Evaluates filter programs directly against stored
//! documents. Default ordering is insertion order; a replaced document keeps
//! its original position.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use super::errors::{StorageError, StorageResult};
use super::{validate_key, QueryPage, StorageClient, StorageEngine};
use crate::query::eval;
use crate::query::StorageFilter;
use crate::tenant::Namespace;

/// Documents of one table, in insertion order
type Table = Vec<(String, Value)>;

/// Tables keyed by (namespace, table)
type Tables = HashMap<(String, String), Table>;

/// In-memory storage engine
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageEngine for MemoryStorage {
    fn client(&self, namespace: &Namespace) -> Arc<dyn StorageClient> {
        Arc::new(MemoryClient {
            namespace: namespace.clone(),
            tables: Arc::clone(&self.tables),
        })
    }
}

/// Client bound to one namespace
pub struct MemoryClient {
    namespace: Namespace,
    tables: Arc<RwLock<Tables>>,
}

impl MemoryClient {
    fn key(&self, table: &str) -> (String, String) {
        (self.namespace.as_str().to_string(), table.to_string())
    }

    fn read<T>(&self, table: &str, f: impl FnOnce(Option<&Table>) -> T) -> StorageResult<T> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::Database("Lock poisoned".to_string()))?;
        Ok(f(tables.get(&self.key(table))))
    }

    fn write<T>(&self, table: &str, f: impl FnOnce(&mut Table) -> T) -> StorageResult<T> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::Database("Lock poisoned".to_string()))?;
        Ok(f(tables.entry(self.key(table)).or_default()))
    }
}

#[async_trait]
impl StorageClient for MemoryClient {
    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    async fn query(&self, filter: &StorageFilter) -> StorageResult<QueryPage> {
        let mut matched: Vec<Value> = self.read(&filter.table, |table| {
            table
                .map(|rows| {
                    rows.iter()
                        .filter(|(_, doc)| eval::matches(&filter.program.predicate, doc))
                        .map(|(_, doc)| doc.clone())
                        .collect()
                })
                .unwrap_or_default()
        })?;

        let total_records = matched.len() as u64;

        // Stable sort keeps insertion order among equal keys
        if !filter.program.sort.is_empty() {
            matched.sort_by(|a, b| eval::compare_documents(&filter.program, a, b));
        }

        let rows = matched
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect();

        Ok(QueryPage {
            rows,
            total_records,
        })
    }

    async fn get_by_key(&self, table: &str, id: &str) -> StorageResult<Option<Value>> {
        let id = validate_key(id)?;
        self.read(table, |rows| {
            rows.and_then(|rows| {
                rows.iter()
                    .find(|(key, _)| *key == id)
                    .map(|(_, doc)| doc.clone())
            })
        })
    }

    async fn save(&self, table: &str, id: &str, document: &Value) -> StorageResult<String> {
        let id = validate_key(id)?;
        self.write(table, |rows| {
            match rows.iter_mut().find(|(key, _)| *key == id) {
                Some((_, existing)) => *existing = document.clone(),
                None => rows.push((id.clone(), document.clone())),
            }
            id
        })
    }

    async fn update(&self, table: &str, document: &Value, id: &str) -> StorageResult<u64> {
        let id = validate_key(id)?;
        self.write(table, |rows| match rows.iter_mut().find(|(key, _)| *key == id) {
            Some((_, existing)) => {
                *existing = document.clone();
                1
            }
            None => 0,
        })
    }

    async fn delete(&self, table: &str, id: &str) -> StorageResult<()> {
        let id = validate_key(id)?;
        self.write(table, |rows| rows.retain(|(key, _)| *key != id))
    }
}
