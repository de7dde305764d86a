//! # Outcomes
//!
//! The single result every orchestrated operation produces.

use serde_json::Value;

/// Result-code class of an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultClass {
    Ok,
    Created,
    NoContent,
    BadRequest,
    NotFound,
    Conflict,
    InternalError,
}

impl ResultClass {
    /// HTTP status code for this class
    pub fn status_code(&self) -> u16 {
        match self {
            ResultClass::Ok => 200,
            ResultClass::Created => 201,
            ResultClass::NoContent => 204,
            ResultClass::BadRequest => 400,
            ResultClass::NotFound => 404,
            ResultClass::Conflict => 409,
            ResultClass::InternalError => 500,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultClass::Ok | ResultClass::Created | ResultClass::NoContent)
    }
}

/// Outcome of one entity operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Record or collection payload
    Success(Value),
    /// Record as persisted and where to find it
    Created { record: Value, location: String },
    NoContent,
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    InternalError(String),
}

impl Outcome {
    pub fn class(&self) -> ResultClass {
        match self {
            Outcome::Success(_) => ResultClass::Ok,
            Outcome::Created { .. } => ResultClass::Created,
            Outcome::NoContent => ResultClass::NoContent,
            Outcome::NotFound(_) => ResultClass::NotFound,
            Outcome::BadRequest(_) => ResultClass::BadRequest,
            Outcome::Conflict(_) => ResultClass::Conflict,
            Outcome::InternalError(_) => ResultClass::InternalError,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Outcome::Success(payload) => Some(payload),
            Outcome::Created { record, .. } => Some(record),
            _ => None,
        }
    }

    /// Set on `Created` only
    pub fn location(&self) -> Option<&str> {
        match self {
            Outcome::Created { location, .. } => Some(location),
            _ => None,
        }
    }

    /// Failure text, if this is a failure
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::NotFound(msg)
            | Outcome::BadRequest(msg)
            | Outcome::Conflict(msg)
            | Outcome::InternalError(msg) => Some(msg),
            _ => None,
        }
    }
}
