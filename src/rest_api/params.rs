//! # Query Parameters
//!
//! Parses collection and single-record query parameters.

use std::collections::HashMap;

use serde_json::Value;

use super::errors::{RestError, RestResult};
use crate::query::QueryDescriptor;

/// Maximum number of records a page may hold
pub const MAX_LIMIT: u32 = 1000;

/// Page size when `limit` is absent
pub const DEFAULT_LIMIT: u32 = 10;

/// Parameters of a collection read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionParams {
    pub descriptor: QueryDescriptor,
    pub lang: Option<String>,
}

impl CollectionParams {
    /// Parse `query`, `offset`, `limit` and `lang`; other keys are ignored
    pub fn parse(params: &HashMap<String, String>) -> RestResult<Self> {
        let query = params.get("query").cloned().unwrap_or_default();
        let offset = match params.get("offset") {
            Some(value) => parse_offset(value)?,
            None => 0,
        };
        let limit = match params.get("limit") {
            Some(value) => parse_limit(value)?,
            None => DEFAULT_LIMIT,
        };

        Ok(Self {
            descriptor: QueryDescriptor::new(query, offset, limit),
            lang: lang(params),
        })
    }
}

/// `lang` parameter, if present and non-empty
pub fn lang(params: &HashMap<String, String>) -> Option<String> {
    params
        .get("lang")
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Parse limit parameter
fn parse_limit(value: &str) -> RestResult<u32> {
    let limit: u64 = value
        .trim()
        .parse()
        .map_err(|_| RestError::InvalidQueryParam(format!("Invalid limit: {}", value)))?;
    if limit > u64::from(MAX_LIMIT) {
        return Err(RestError::LimitExceeded(limit, MAX_LIMIT));
    }
    Ok(limit as u32)
}

/// Parse offset parameter
fn parse_offset(value: &str) -> RestResult<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| RestError::InvalidQueryParam(format!("Invalid offset: {}", value)))
}

/// Parse a JSON request body
pub fn parse_body(bytes: &[u8]) -> RestResult<Value> {
    serde_json::from_slice(bytes).map_err(|e| RestError::InvalidBody(e.to_string()))
}
