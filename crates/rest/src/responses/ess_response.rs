//! The gateway's search response document.
//!
//! ```xml
//! <essResponse>
//!   <hits>120</hits>
//!   <records>
//!     <formatted>...</formatted>
//!     <error>Internal Server Error</error>
//!   </records>
//!   <trackingId>8d4c...</trackingId>
//! </essResponse>
//! ```

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::error;

use crate::error::INTERNAL_ERROR_MESSAGE;
use crate::formatting::FormattedRecord;
use crate::xml::{XmlError, write_text_element};

/// Content type of a successful search response.
pub const XML_CONTENT_TYPE: &str = "application/xml";

/// Search response: hit count, formatted records in backend order and the
/// tracking id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssResponse {
    /// Total hits reported by the backend.
    pub hits: u64,
    /// One entry per backend record of the page.
    pub records: Vec<FormattedRecord>,
    /// Correlation id of the request.
    pub tracking_id: String,
}

impl EssResponse {
    /// Creates a response.
    pub fn new(hits: u64, records: Vec<FormattedRecord>, tracking_id: impl Into<String>) -> Self {
        Self {
            hits,
            records,
            tracking_id: tracking_id.into(),
        }
    }

    /// Number of error placeholders in the record list.
    pub fn error_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_error()).count()
    }

    /// Serializes the response document.
    ///
    /// Formatter output is embedded verbatim; it was checked to be a single
    /// well-formed element when it was produced.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("essResponse")))?;

        write_text_element(&mut writer, "hits", &self.hits.to_string())?;

        if self.records.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new("records")))?;
        } else {
            writer.write_event(Event::Start(BytesStart::new("records")))?;
            for record in &self.records {
                match record {
                    FormattedRecord::Element(xml) => {
                        writer.write_event(Event::Text(BytesText::from_escaped(xml.as_str())))?;
                    }
                    FormattedRecord::Error { message } => {
                        write_text_element(&mut writer, "error", message)?;
                    }
                }
            }
            writer.write_event(Event::End(BytesEnd::new("records")))?;
        }

        write_text_element(&mut writer, "trackingId", &self.tracking_id)?;
        writer.write_event(Event::End(BytesEnd::new("essResponse")))?;

        Ok(String::from_utf8(writer.into_inner())?)
    }
}

impl IntoResponse for EssResponse {
    fn into_response(self) -> Response {
        match self.to_xml() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, XML_CONTENT_TYPE)],
                body,
            )
                .into_response(),
            Err(e) => {
                error!(tracking_id = %self.tracking_id, error = %e, "Could not serialize response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref())],
                    INTERNAL_ERROR_MESSAGE,
                )
                    .into_response()
            }
        }
    }
}
