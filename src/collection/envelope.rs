//! # Collection Envelope
//!
//! Paginated collection responses.

use serde_json::{Map, Value};

/// One page of records plus paging metadata.
///
/// `first` and `last` are 1-based positions of the page within the full
/// result set, both zero when the page is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEnvelope {
    pub items: Vec<Value>,
    pub total_records: u64,
    pub first: u64,
    pub last: u64,
}

impl CollectionEnvelope {
    /// Build an envelope from a storage page.
    ///
    /// Positions are derived from the requested offset, not from
    /// `total_records`, so an offset past the end yields an empty page with
    /// `first = last = 0`.
    pub fn assemble(items: Vec<Value>, total_records: u64, offset: u32) -> Self {
        let (first, last) = if items.is_empty() {
            (0, 0)
        } else {
            let offset = u64::from(offset);
            (offset + 1, offset + items.len() as u64)
        };

        Self {
            items,
            total_records,
            first,
            last,
        }
    }

    /// JSON body with the items under the entity's collection key
    pub fn to_json(&self, collection_key: &str) -> Value {
        let mut body = Map::new();
        body.insert(collection_key.to_string(), Value::Array(self.items.clone()));
        body.insert("totalRecords".to_string(), Value::from(self.total_records));
        body.insert("first".to_string(), Value::from(self.first));
        body.insert("last".to_string(), Value::from(self.last));
        Value::Object(body)
    }
}
