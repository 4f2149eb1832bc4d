//! Shared validation helpers for inbound HTTP adapters.
//!
//! Extractor failures (malformed JSON, bad query strings) are converted into
//! the domain [`Error`] envelope so every 400 response has the same shape.

use actix_web::web;
use serde_json::json;

use crate::domain::{Error, INVALID_RECORD_ID, RecordId};

/// Validation error codes attached to 400 responses as `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    InvalidRecordId,
    MalformedBody,
    InvalidQuery,
}

impl ValidationCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRecordId => "invalid_record_id",
            Self::MalformedBody => "malformed_body",
            Self::InvalidQuery => "invalid_query",
        }
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn with_value(self, code: ValidationCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }

    fn with_reason(self, code: ValidationCode, reason: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "reason": reason.into(),
            "code": code.as_str(),
        }))
    }
}

/// Parse a path segment into a [`RecordId`].
///
/// ```
/// use recordkeeper::inbound::http::validation::parse_record_id;
///
/// assert!(parse_record_id("65f0a1b2c3d4e5f60718293a").is_ok());
/// let err = parse_record_id("nope").expect_err("invalid id");
/// assert_eq!(err.message(), "Invalid record ID");
/// ```
pub fn parse_record_id(raw: &str) -> Result<RecordId, Error> {
    raw.parse().map_err(|_| {
        ValidationError::new("recordId", INVALID_RECORD_ID)
            .with_value(ValidationCode::InvalidRecordId, raw)
    })
}

/// JSON extractor configuration mapping body errors to the error envelope.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ValidationError::new("body", "Malformed request body")
            .with_reason(ValidationCode::MalformedBody, err.to_string())
            .into()
    })
}

/// Query extractor configuration mapping query errors to the error envelope.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        ValidationError::new("query", "Invalid query parameters")
            .with_reason(ValidationCode::InvalidQuery, err.to_string())
            .into()
    })
}
