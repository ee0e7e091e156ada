//! Client for the external formatting service.
//!
//! `POST {open_format_url}?outputFormat=..&id=..&trackingId=..` with the
//! record document as an `application/xml` body. A successful answer is a
//! single XML element, which becomes the formatted record.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use http::header::{ACCEPT, CONTENT_TYPE};
use roxmltree::Document;
use tracing::debug;
use url::Url;

use crate::error::{FormattingError, InitError};
use crate::xml::element_to_string;

use super::{FormatRequest, RecordFormatter};

/// HTTP formatting service client.
#[derive(Debug, Clone)]
pub struct OpenFormatClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl OpenFormatClient {
    /// Creates a client for the service at `url`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, InitError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let endpoint = Url::parse(url).map_err(|source| InitError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(Self { http, endpoint })
    }

    /// Builds the service URL for `request`.
    pub fn request_url(&self, request: &FormatRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("outputFormat", &request.output_format)
            .append_pair("id", &request.identifier)
            .append_pair("trackingId", &request.tracking_id);
        url
    }
}

#[async_trait]
impl RecordFormatter for OpenFormatClient {
    fn formatter_name(&self) -> &'static str {
        "open-format"
    }

    async fn format(&self, request: &FormatRequest) -> Result<String, FormattingError> {
        let started = Instant::now();
        let response = self
            .http
            .post(self.request_url(request))
            .header(CONTENT_TYPE, "application/xml")
            .header(ACCEPT, "application/xml")
            .body(request.document.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FormattingError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(
            tracking_id = %request.tracking_id,
            id = %request.identifier,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Record formatted"
        );
        single_element(&body)
    }
}

/// Checks that `body` is one well-formed element and returns it without the
/// XML declaration.
fn single_element(body: &str) -> Result<String, FormattingError> {
    let doc = Document::parse(body).map_err(|e| FormattingError::MalformedOutput {
        message: e.to_string(),
    })?;
    element_to_string(doc.root_element()).map_err(|e| FormattingError::MalformedOutput {
        message: e.to_string(),
    })
}
