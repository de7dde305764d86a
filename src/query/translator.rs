//! # Query Translator
//!
//! Turns a [`QueryDescriptor`] (raw expression plus paging) into a
//! table-scoped [`StorageFilter`].

use super::ast::FilterProgram;
use super::compiler::compile;
use super::errors::{QueryError, QueryResult};

/// Raw collection query as received from the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    raw_expression: String,
    offset: u32,
    limit: u32,
}

impl QueryDescriptor {
    pub fn new(raw_expression: impl Into<String>, offset: u32, limit: u32) -> Self {
        Self {
            raw_expression: raw_expression.into(),
            offset,
            limit,
        }
    }

    /// Match everything on one page
    pub fn all(offset: u32, limit: u32) -> Self {
        Self::new(String::new(), offset, limit)
    }

    pub fn raw_expression(&self) -> &str {
        &self.raw_expression
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

/// Engine-level filter: compiled program, target table and paging
#[derive(Debug, Clone, PartialEq)]
pub struct StorageFilter {
    pub table: String,
    pub program: FilterProgram,
    pub limit: u32,
    pub offset: u32,
}

/// Check that a table name is a plain lowercase identifier
pub fn validate_table_name(table: &str) -> QueryResult<()> {
    let mut chars = table.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(QueryError::InvalidTable(table.to_string()))
    }
}

/// Translate a query descriptor into a storage filter for `table`.
///
/// Pure: no caching, no side effects. A `limit` of zero is valid and asks
/// for the match count only.
pub fn translate(table: &str, descriptor: &QueryDescriptor) -> QueryResult<StorageFilter> {
    validate_table_name(table)?;
    let program = compile(descriptor.raw_expression())?;

    Ok(StorageFilter {
        table: table.to_string(),
        program,
        limit: descriptor.limit(),
        offset: descriptor.offset(),
    })
}
