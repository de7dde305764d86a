//! # Response Formatting
//!
//! Renders outcomes as HTTP responses: JSON payloads on success, plain text
//! on failure.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::collection::Outcome;

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.class().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self {
            Outcome::Success(payload) => (status, Json(payload)).into_response(),
            Outcome::Created { record, location } => {
                let mut response = (status, Json(record)).into_response();
                if let Ok(value) = HeaderValue::from_str(&location) {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                response
            }
            Outcome::NoContent => status.into_response(),
            Outcome::NotFound(message)
            | Outcome::BadRequest(message)
            | Outcome::Conflict(message)
            | Outcome::InternalError(message) => (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                message,
            )
                .into_response(),
        }
    }
}
