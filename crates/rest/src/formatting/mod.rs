//! Per-record formatting.
//!
//! Each record of a search response is turned into one output element by a
//! [`RecordFormatter`]. The gateway ships [`OpenFormatClient`], which calls an
//! external formatting service; tests and embedders can plug in their own.
//!
//! - [`dispatch`] - concurrent fan-out and ordered fan-in
//! - [`open_format`] - HTTP formatting service client

pub mod dispatch;
pub mod open_format;

pub use dispatch::{FormatJob, FormattingDispatcher};
pub use open_format::OpenFormatClient;

use async_trait::async_trait;

use crate::error::FormattingError;

/// Everything the formatter needs to produce one output element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRequest {
    /// The record document as standalone XML.
    pub document: String,
    /// Requested output format name.
    pub output_format: String,
    /// Identifier to attach to the output.
    pub identifier: String,
    /// Correlation id of the search request.
    pub tracking_id: String,
}

/// Converts one record document into one output element.
///
/// Implementations are shared by every request and called concurrently.
#[async_trait]
pub trait RecordFormatter: Send + Sync {
    /// Short name used in logs.
    fn formatter_name(&self) -> &'static str;

    /// Formats one record, returning the output element as XML text.
    async fn format(&self, request: &FormatRequest) -> Result<String, FormattingError>;
}

/// One entry of the response's record list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedRecord {
    /// Formatter output, one XML element.
    Element(String),
    /// Error placeholder rendered as `<error>message</error>`.
    Error {
        /// Message shown to the caller.
        message: String,
    },
}

impl FormattedRecord {
    /// Creates an error placeholder.
    pub fn placeholder(message: impl Into<String>) -> Self {
        FormattedRecord::Error {
            message: message.into(),
        }
    }

    /// Returns true for error placeholders.
    pub fn is_error(&self) -> bool {
        matches!(self, FormattedRecord::Error { .. })
    }
}
