//! # Error Classifier
//!
//! Maps engine failures onto the closed outcome taxonomy. Classification
//! never fails.

use std::sync::Arc;

use super::errors::EngineError;
use super::outcome::Outcome;
use crate::messages::{MessageKey, MessageSource};

/// Operation that produced the failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSite<'a> {
    Create,
    ReadOne { id: &'a str },
    ReadCollection,
    Update,
    Delete,
}

impl CallSite<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            CallSite::Create => "create",
            CallSite::ReadOne { .. } => "read_one",
            CallSite::ReadCollection => "read_collection",
            CallSite::Update => "update",
            CallSite::Delete => "delete",
        }
    }

    /// Delete and create report storage failures verbatim
    fn surfaces_raw_message(&self) -> bool {
        matches!(self, CallSite::Create | CallSite::Delete)
    }
}

/// Builds failure outcomes with localized messages
#[derive(Clone)]
pub struct ErrorClassifier {
    messages: Arc<dyn MessageSource>,
}

impl ErrorClassifier {
    pub fn new(messages: Arc<dyn MessageSource>) -> Self {
        Self { messages }
    }

    pub fn message(&self, locale: &str, key: MessageKey) -> String {
        self.messages.lookup(locale, key)
    }

    pub fn classify(&self, err: &EngineError, site: CallSite<'_>, locale: &str) -> Outcome {
        if matches!(err, EngineError::InvalidBody) {
            return Outcome::BadRequest(self.message(locale, MessageKey::InvalidRecordBody));
        }

        if err.is_parse_error() {
            return Outcome::BadRequest(err.to_string());
        }

        if err.is_invalid_identifier() {
            match site {
                CallSite::ReadOne { id } => return Outcome::NotFound(id.to_string()),
                CallSite::Update => {
                    return Outcome::NotFound(self.message(locale, MessageKey::NoRecordsUpdated))
                }
                _ => {}
            }
        }

        if err.is_constraint_violation() {
            return Outcome::Conflict(err.to_string());
        }

        if site.surfaces_raw_message() {
            Outcome::InternalError(err.to_string())
        } else {
            Outcome::InternalError(self.message(locale, MessageKey::InternalServerError))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Messages;
    use crate::query::{ParseError, QueryError};
    use crate::storage::StorageError;

    fn classifier() -> ErrorClassifier {
        ErrorClassifier::new(Arc::new(Messages::default()))
    }

    fn generic(locale: &str) -> String {
        Messages::default().lookup(locale, MessageKey::InternalServerError)
    }

    #[test]
    fn test_parse_error_is_bad_request_with_diagnostic() {
        let err = EngineError::from(QueryError::from(ParseError::new("expected a value, found end of query", 7)));
        assert_eq!(
            classifier().classify(&err, CallSite::ReadCollection, "en"),
            Outcome::BadRequest(
                "CQL parse error: expected a value, found end of query at position 7".to_string()
            )
        );
    }

    #[test]
    fn test_invalid_identifier_by_site() {
        let err = EngineError::from(StorageError::InvalidIdentifier("zzz".into()));
        let c = classifier();

        assert_eq!(
            c.classify(&err, CallSite::ReadOne { id: "zzz" }, "en"),
            Outcome::NotFound("zzz".to_string())
        );
        assert_eq!(
            c.classify(&err, CallSite::Update, "de"),
            Outcome::NotFound("Keine Datensätze aktualisiert".to_string())
        );
        assert_eq!(
            c.classify(&err, CallSite::Delete, "en"),
            Outcome::InternalError(err.to_string())
        );
    }

    #[test]
    fn test_signature_in_database_message() {
        let err = EngineError::from(StorageError::Database(
            "invalid input syntax for type uuid: \"1\"".into(),
        ));
        assert_eq!(
            classifier().classify(&err, CallSite::ReadOne { id: "1" }, "en"),
            Outcome::NotFound("1".to_string())
        );
    }

    #[test]
    fn test_constraint_is_conflict() {
        let err = EngineError::from(StorageError::Constraint("UNIQUE constraint failed".into()));
        assert!(matches!(
            classifier().classify(&err, CallSite::Create, "en"),
            Outcome::Conflict(_)
        ));
    }

    #[test]
    fn test_generic_message_per_site() {
        let err = EngineError::from(StorageError::Database("disk I/O error".into()));
        let c = classifier();

        assert_eq!(c.classify(&err, CallSite::ReadOne { id: "x" }, "es"), Outcome::InternalError(generic("es")));
        assert_eq!(c.classify(&err, CallSite::ReadCollection, "en"), Outcome::InternalError(generic("en")));
        assert_eq!(c.classify(&err, CallSite::Update, "en"), Outcome::InternalError(generic("en")));
        assert_eq!(
            c.classify(&err, CallSite::Delete, "en"),
            Outcome::InternalError("database error: disk I/O error".to_string())
        );
        assert_eq!(
            c.classify(&err, CallSite::Create, "en"),
            Outcome::InternalError("database error: disk I/O error".to_string())
        );
    }

    #[test]
    fn test_invalid_table_is_internal() {
        let err = EngineError::from(QueryError::InvalidTable("Bad".into()));
        assert_eq!(
            classifier().classify(&err, CallSite::ReadCollection, "en"),
            Outcome::InternalError(generic("en"))
        );
    }

    #[test]
    fn test_invalid_body() {
        assert_eq!(
            classifier().classify(&EngineError::InvalidBody, CallSite::Create, "en"),
            Outcome::BadRequest("Record body must be a JSON object".to_string())
        );
    }
}
