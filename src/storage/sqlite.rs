//! # SQLite Storage
//!
//! Relational backend. Each (namespace, table) pair maps to one SQLite table
//! `"<namespace>.<table>"` holding `id TEXT PRIMARY KEY` and the document in a
//! `jsonb TEXT` column. Tables are created on first use.
//!
//! All blocking work runs on the tokio blocking pool. A dropped request does
//! not cancel a statement that has already been handed to the pool; its
//! result is simply discarded.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;

use super::errors::{StorageError, StorageResult};
use super::sql::{quote_ident, render, select_page_statement};
use super::{validate_key, QueryPage, StorageClient, StorageEngine};
use crate::query::StorageFilter;
use crate::tenant::Namespace;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite storage engine sharing one connection across namespaces
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Database(format!(
                        "cannot create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Self::from_connection(conn)
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl StorageEngine for SqliteStorage {
    fn client(&self, namespace: &Namespace) -> Arc<dyn StorageClient> {
        Arc::new(SqliteClient {
            namespace: namespace.clone(),
            conn: Arc::clone(&self.conn),
        })
    }
}

/// Client bound to one namespace
pub struct SqliteClient {
    namespace: Namespace,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteClient {
    /// Quoted SQLite identifier for a table in this namespace
    pub fn table_ident(&self, table: &str) -> String {
        table_ident(&self.namespace, table)
    }

    /// Run `f` on the blocking pool with the table created
    async fn run<T, F>(&self, table: &str, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let ident = self.table_ident(table);

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StorageError::Database("Lock poisoned".to_string()))?;
            ensure_table(&conn, &ident)?;
            f(&*conn, &ident)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

/// Quoted SQLite identifier for `table` inside `namespace`.
///
/// Neither namespaces nor table names contain `.`, so distinct pairs never
/// share a table.
pub fn table_ident(namespace: &Namespace, table: &str) -> String {
    quote_ident(&format!("{}.{}", namespace, table))
}

fn ensure_table(conn: &Connection, ident: &str) -> StorageResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY NOT NULL, jsonb TEXT NOT NULL);",
        ident
    ))?;
    Ok(())
}

fn decode(text: &str) -> StorageResult<Value> {
    Ok(serde_json::from_str(text)?)
}

#[async_trait]
impl StorageClient for SqliteClient {
    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    async fn query(&self, filter: &StorageFilter) -> StorageResult<QueryPage> {
        let sql = render(&filter.program);
        let limit = i64::from(filter.limit);
        let offset = i64::from(filter.offset);

        self.run(&filter.table, move |conn, ident| {
            let statement = select_page_statement(ident, &sql);
            let mut bound = sql.params;
            bound.push(SqlValue::Integer(limit));
            bound.push(SqlValue::Integer(offset));

            let mut stmt = conn.prepare(&statement)?;
            let mut rows = stmt.query(params_from_iter(bound.iter()))?;

            let mut page = QueryPage {
                rows: Vec::new(),
                total_records: 0,
            };
            while let Some(row) = rows.next()? {
                let total: i64 = row.get(0)?;
                page.total_records = u64::try_from(total).unwrap_or(0);
                let document: Option<String> = row.get(1)?;
                if let Some(document) = document {
                    page.rows.push(decode(&document)?);
                }
            }
            Ok(page)
        })
        .await
    }

    async fn get_by_key(&self, table: &str, id: &str) -> StorageResult<Option<Value>> {
        let id = validate_key(id)?;

        self.run(table, move |conn, ident| {
            let document: Option<String> = conn
                .query_row(
                    &format!("SELECT jsonb FROM {} WHERE id = ?1", ident),
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            document.as_deref().map(decode).transpose()
        })
        .await
    }

    async fn save(&self, table: &str, id: &str, document: &Value) -> StorageResult<String> {
        let id = validate_key(id)?;
        let body = serde_json::to_string(document)?;

        self.run(table, move |conn, ident| {
            conn.execute(
                &format!(
                    "INSERT INTO {} (id, jsonb) VALUES (?1, ?2) \
                     ON CONFLICT(id) DO UPDATE SET jsonb = excluded.jsonb",
                    ident
                ),
                params![id, body],
            )?;
            Ok(id)
        })
        .await
    }

    async fn update(&self, table: &str, document: &Value, id: &str) -> StorageResult<u64> {
        let id = validate_key(id)?;
        let body = serde_json::to_string(document)?;

        self.run(table, move |conn, ident| {
            let changed = conn.execute(
                &format!("UPDATE {} SET jsonb = ?1 WHERE id = ?2", ident),
                params![body, id],
            )?;
            Ok(changed as u64)
        })
        .await
    }

    async fn delete(&self, table: &str, id: &str) -> StorageResult<()> {
        let id = validate_key(id)?;

        self.run(table, move |conn, ident| {
            conn.execute(&format!("DELETE FROM {} WHERE id = ?1", ident), params![id])?;
            Ok(())
        })
        .await
    }
}
