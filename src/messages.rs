//! # Messages
//!
//! Localized outward-facing messages. Lookup never fails: an unknown locale
//! falls back to its primary language subtag, then to the default locale,
//! then to the message key itself.

use std::collections::HashMap;
use std::fmt;

/// Message catalog keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    InternalServerError,
    NoRecordsUpdated,
    InvalidRecordBody,
}

impl MessageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::InternalServerError => "InternalServerError",
            MessageKey::NoRecordsUpdated => "NoRecordsUpdated",
            MessageKey::InvalidRecordBody => "InvalidRecordBody",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Localization provider
pub trait MessageSource: Send + Sync {
    fn lookup(&self, locale: &str, key: MessageKey) -> String;
}

/// Locale used when the server is not configured otherwise
pub const DEFAULT_LOCALE: &str = "en";

const EN: &[(MessageKey, &str)] = &[
    (MessageKey::InternalServerError, "Internal Server Error, Please contact System Administrator or try again"),
    (MessageKey::NoRecordsUpdated, "No records updated"),
    (MessageKey::InvalidRecordBody, "Record body must be a JSON object"),
];

const DE: &[(MessageKey, &str)] = &[
    (MessageKey::InternalServerError, "Interner Serverfehler, bitte wenden Sie sich an den Systemadministrator oder versuchen Sie es erneut"),
    (MessageKey::NoRecordsUpdated, "Keine Datensätze aktualisiert"),
    (MessageKey::InvalidRecordBody, "Der Datensatz muss ein JSON-Objekt sein"),
];

const ES: &[(MessageKey, &str)] = &[
    (MessageKey::InternalServerError, "Error interno del servidor, contacte con el administrador del sistema o vuelva a intentarlo"),
    (MessageKey::NoRecordsUpdated, "No se actualizó ningún registro"),
    (MessageKey::InvalidRecordBody, "El registro debe ser un objeto JSON"),
];

/// Built-in message catalogs
#[derive(Debug, Clone)]
pub struct Messages {
    default_locale: String,
    catalogs: HashMap<String, HashMap<MessageKey, String>>,
}

impl Messages {
    /// Built-in catalogs with `default_locale` as the last-resort locale
    pub fn new(default_locale: impl Into<String>) -> Self {
        let mut messages = Self {
            default_locale: normalize(&default_locale.into()),
            catalogs: HashMap::new(),
        };
        for (locale, entries) in [("en", EN), ("de", DE), ("es", ES)] {
            for (key, text) in entries {
                messages.insert(locale, *key, *text);
            }
        }
        messages
    }

    /// Add or replace one translation
    pub fn insert(&mut self, locale: &str, key: MessageKey, text: impl Into<String>) {
        self.catalogs
            .entry(normalize(locale))
            .or_default()
            .insert(key, text.into());
    }

    fn find(&self, locale: &str, key: MessageKey) -> Option<&str> {
        self.catalogs
            .get(locale)
            .and_then(|catalog| catalog.get(&key))
            .map(String::as_str)
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl MessageSource for Messages {
    fn lookup(&self, locale: &str, key: MessageKey) -> String {
        candidates(locale)
            .iter()
            .chain(std::iter::once(&self.default_locale))
            .find_map(|candidate| self.find(candidate, key))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }
}

/// Lowercase and use `-` as the subtag separator (`de_AT` is `de-at`)
fn normalize(locale: &str) -> String {
    locale.trim().replace('_', "-").to_ascii_lowercase()
}

/// Exact tag, then primary language subtag
fn candidates(locale: &str) -> Vec<String> {
    let exact = normalize(locale);
    if exact.is_empty() {
        return Vec::new();
    }
    let mut out = vec![exact.clone()];
    if let Some((primary, _)) = exact.split_once('-') {
        out.push(primary.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_locale() {
        let messages = Messages::default();
        assert_eq!(messages.lookup("de", MessageKey::NoRecordsUpdated), "Keine Datensätze aktualisiert");
        assert_eq!(messages.lookup("en", MessageKey::NoRecordsUpdated), "No records updated");
    }

    #[test]
    fn test_region_falls_back_to_language() {
        let messages = Messages::default();
        assert_eq!(
            messages.lookup("es-MX", MessageKey::InvalidRecordBody),
            "El registro debe ser un objeto JSON"
        );
        assert_eq!(
            messages.lookup("de_AT", MessageKey::InvalidRecordBody),
            "Der Datensatz muss ein JSON-Objekt sein"
        );
    }

    #[test]
    fn test_unknown_locale_uses_default() {
        let messages = Messages::new("de");
        assert_eq!(messages.lookup("fr", MessageKey::NoRecordsUpdated), "Keine Datensätze aktualisiert");
        assert_eq!(messages.lookup("", MessageKey::NoRecordsUpdated), "Keine Datensätze aktualisiert");
    }

    #[test]
    fn test_missing_translation_falls_back_to_key() {
        let messages = Messages {
            default_locale: "xx".to_string(),
            catalogs: HashMap::new(),
        };
        assert_eq!(messages.lookup("en", MessageKey::InternalServerError), "InternalServerError");
    }

    #[test]
    fn test_partial_catalog_falls_through() {
        let mut messages = Messages::default();
        messages.insert("fr", MessageKey::NoRecordsUpdated, "Aucun enregistrement mis à jour");
        assert_eq!(messages.lookup("fr-CA", MessageKey::NoRecordsUpdated), "Aucun enregistrement mis à jour");
        assert_eq!(messages.lookup("fr", MessageKey::InvalidRecordBody), "Record body must be a JSON object");
        assert_eq!(messages.lookup("it", MessageKey::NoRecordsUpdated), "No records updated");
    }
}
