//! Error types for the search gateway.
//!
//! Errors fall into two groups:
//!
//! - Request-level errors ([`GatewayError`]) abort the whole request and are
//!   rendered as a plain-text response with a generic message.
//! - Per-record errors ([`RecordError`], [`FormattingError`]) are contained:
//!   the record degrades to an error placeholder inside an otherwise
//!   successful response.
//!
//! # Error Mapping
//!
//! | Error | HTTP Status | Body |
//! |-------|-------------|------|
//! | MissingParameter | 400 | `Missing required parameter: <name>` |
//! | InvalidParameter | 400 | `Invalid value for parameter: <name>` |
//! | UnknownBase | 500 | `Unknown base requested` |
//! | any other | 500 | `Internal Server Error` |
//!
//! Internal detail (status codes, parse errors, document counts) is logged
//! with the tracking id and never sent to the caller.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::time::Duration;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Body sent for an unknown base.
pub const UNKNOWN_BASE_MESSAGE: &str = "Unknown base requested";

/// Body sent for every other server-side failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Errors that abort a search request.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A required query parameter was absent.
    #[error("missing required parameter: {name}")]
    MissingParameter { name: &'static str },

    /// A query parameter could not be parsed.
    #[error("invalid value for parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    /// The requested base is not configured. Raised before any network call.
    #[error("unknown base requested: {base}")]
    UnknownBase { base: String },

    /// The SRU backend answered with a non-success status.
    #[error("search failed with http code {status}")]
    BackendHttp { status: u16 },

    /// The SRU backend could not be reached.
    #[error("backend unavailable: {message}")]
    BackendUnavailable { message: String },

    /// The SRU response body did not match the expected schema.
    #[error("could not parse backend response: {message}")]
    BackendParse { message: String },

    /// Collecting the concurrent formatting results failed.
    #[error("could not assemble response: {message}")]
    Assembly { message: String },

    /// The request ran past the whole-request timeout.
    #[error("request did not finish within {limit:?}")]
    RequestTimeout { limit: Duration },

    /// Anything else.
    #[error("unexpected error: {message}")]
    Unexpected { message: String },
}

impl GatewayError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingParameter { .. } | GatewayError::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message the caller is allowed to see.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::MissingParameter { name } => {
                format!("Missing required parameter: {}", name)
            }
            GatewayError::InvalidParameter { name, .. } => {
                format!("Invalid value for parameter: {}", name)
            }
            GatewayError::UnknownBase { .. } => UNKNOWN_BASE_MESSAGE.to_string(),
            _ => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref())],
            self.public_message(),
        )
            .into_response()
    }
}

/// Why a single backend record could not be prepared for formatting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The record was not delivered as embedded XML.
    #[error("expected xml escaped record in response, got: {found:?}")]
    Escaping { found: Option<String> },

    /// The record payload did not hold exactly one node.
    #[error("expected 1 record in response, but got {count}")]
    ContentCount { count: usize },

    /// The single payload node was text, not an element.
    #[error("record payload is not xml")]
    NotXml,

    /// The payload element could not be parsed.
    #[error("malformed record document: {message}")]
    Malformed { message: String },
}

/// Failure of the formatting collaborator for one record.
#[derive(Error, Debug)]
pub enum FormattingError {
    /// The formatting service answered with a non-success status.
    #[error("formatting failed with http code {status}")]
    Status { status: u16 },

    /// The formatting service could not be reached.
    #[error("formatting service unavailable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The formatting service returned something that is not one XML element.
    #[error("formatting service returned malformed output: {message}")]
    MalformedOutput { message: String },
}

/// Errors raised while assembling the application at startup.
#[derive(Error, Debug)]
pub enum InitError {
    /// A configured URL does not parse.
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The outbound HTTP client could not be built.
    #[error("could not build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_base_public_message() {
        let err = GatewayError::UnknownBase {
            base: "nope".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Unknown base requested");
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = GatewayError::BackendHttp { status: 503 };
        assert_eq!(err.public_message(), "Internal Server Error");
        assert!(err.to_string().contains("503"));

        let err = GatewayError::BackendParse {
            message: "missing numberOfRecords".to_string(),
        };
        assert_eq!(err.public_message(), "Internal Server Error");

        let err = GatewayError::RequestTimeout {
            limit: Duration::from_secs(2),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal Server Error");
        assert_eq!(err.to_string(), "request did not finish within 2s");
    }

    #[test]
    fn test_missing_parameter_is_bad_request() {
        let err = GatewayError::MissingParameter { name: "base" };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Missing required parameter: base");
    }

    #[test]
    fn test_into_response_is_plain_text() {
        let response = GatewayError::Assembly {
            message: "task panicked".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/plain"));
    }

    #[test]
    fn test_record_error_display() {
        let err = RecordError::ContentCount { count: 2 };
        assert_eq!(err.to_string(), "expected 1 record in response, but got 2");
        let err = RecordError::Escaping {
            found: Some("string".to_string()),
        };
        assert!(err.to_string().contains("string"));
    }
}
