//! # Tenant Context
//!
//! Derives the storage namespace for a request from its tenant token.
//!
//! Namespaces have the form `<tenant>_<module>`. Tokens are raw header bytes
//! and need not be UTF-8. Bytes outside `[a-z0-9]` are escaped as `_`
//! followed by two lowercase hex digits, so distinct tokens never share a
//! namespace and the result is always a safe storage identifier. A missing
//! or empty token resolves to the bare module namespace.

use std::fmt;

/// Isolated storage namespace for one tenant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps tenant tokens to namespaces for one module
#[derive(Debug, Clone)]
pub struct TenantResolver {
    module: String,
}

impl TenantResolver {
    /// `module` is expected to be a validated lowercase identifier
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }

    /// Resolve the namespace for a tenant token. Never fails.
    pub fn resolve<T: AsRef<[u8]>>(&self, token: Option<T>) -> Namespace {
        let token: Option<&[u8]> = token.as_ref().map(|t| t.as_ref());
        match token {
            Some(token) if !token.is_empty() => {
                Namespace(format!("{}_{}", escape_tenant(token), self.module))
            }
            _ => self.default_namespace(),
        }
    }

    /// Namespace used when the request carries no tenant
    pub fn default_namespace(&self) -> Namespace {
        Namespace(self.module.clone())
    }
}

fn escape_tenant(token: &[u8]) -> String {
    let mut escaped = String::with_capacity(token.len());
    for &byte in token {
        if byte.is_ascii_lowercase() || byte.is_ascii_digit() {
            escaped.push(char::from(byte));
        } else {
            escaped.push_str(&format!("_{:02x}", byte));
        }
    }
    escaped
}
