//! # Entity Descriptors
//!
//! Entities are configured, not coded: each one is a table, a base path and
//! the key its collection payload is published under.

use serde::{Deserialize, Serialize};

/// Configuration of one document entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Storage table name, a lowercase identifier
    pub table: String,

    /// Base path, e.g. `/organization-storage/phone-numbers`
    pub path: String,

    /// Key of the item array in collection payloads
    pub collection_key: String,
}

impl EntityDescriptor {
    pub fn new(
        table: impl Into<String>,
        path: impl Into<String>,
        collection_key: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            path: path.into(),
            collection_key: collection_key.into(),
        }
    }

    /// Base path without a trailing slash
    pub fn base_path(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        if trimmed.is_empty() {
            "/"
        } else {
            trimmed
        }
    }

    /// Location of a record
    pub fn location(&self, id: &str) -> String {
        format!("{}/{}", self.base_path().trim_end_matches('/'), id)
    }
}

/// Phone numbers, interfaces and agreements
pub fn default_entities() -> Vec<EntityDescriptor> {
    vec![
        EntityDescriptor::new(
            "phone_number",
            "/organization-storage/phone-numbers",
            "phoneNumbers",
        ),
        EntityDescriptor::new("interface", "/vendor-storage/interfaces", "interfaces"),
        EntityDescriptor::new(
            "agreement",
            "/organization-storage/agreements",
            "agreements",
        ),
    ]
}
