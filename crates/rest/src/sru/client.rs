//! HTTP client for the SRU proxy.

use std::time::{Duration, Instant};

use http::header::ACCEPT;
use tracing::{debug, error};
use url::Url;

use crate::error::{GatewayError, GatewayResult, InitError};
use crate::query::{QueryLanguage, SearchRequest};

use super::response::{BackendSearchResult, parse_search_response};

/// Issues `searchRetrieve` calls against the SRU proxy.
///
/// The underlying `reqwest::Client` pools connections and is shared by every
/// request; cloning a `SruClient` is cheap.
#[derive(Debug, Clone)]
pub struct SruClient {
    http: reqwest::Client,
    target: Url,
}

/// Parameters of one SRU call.
#[derive(Debug, Clone, Copy)]
pub struct SruQuery<'a> {
    /// Base name, appended to the target URL as a path segment.
    pub base: &'a str,
    /// Query language; selects the query parameter name.
    pub language: QueryLanguage,
    /// Query text.
    pub query: &'a str,
    /// `startRecord`.
    pub start: u32,
    /// `maximumRecords`.
    pub rows: u32,
}

impl<'a> From<&'a SearchRequest> for SruQuery<'a> {
    fn from(request: &'a SearchRequest) -> Self {
        Self {
            base: &request.base,
            language: request.language,
            query: &request.query,
            start: request.start,
            rows: request.rows,
        }
    }
}

impl SruClient {
    /// Creates a client for the SRU proxy at `target_url`.
    pub fn new(target_url: &str, timeout: Duration) -> Result<Self, InitError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(http, target_url)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, target_url: &str) -> Result<Self, InitError> {
        let target = Url::parse(target_url).map_err(|source| InitError::InvalidUrl {
            url: target_url.to_string(),
            source,
        })?;
        Ok(Self { http, target })
    }

    /// Builds the `searchRetrieve` URL for `query`.
    pub fn search_url(&self, query: &SruQuery<'_>) -> GatewayResult<Url> {
        let mut url = self.target.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Unexpected {
                message: format!("SRU target URL cannot be a base: {}", self.target),
            })?
            .pop_if_empty()
            .push(query.base);
        url.query_pairs_mut()
            .append_pair(query.language.backend_parameter(), query.query)
            .append_pair("startRecord", &query.start.to_string())
            .append_pair("maximumRecords", &query.rows.to_string());
        Ok(url)
    }

    /// Sends the search call and returns the raw response.
    ///
    /// Fails with [`GatewayError::BackendHttp`] on any non-success status.
    pub async fn send(
        &self,
        query: &SruQuery<'_>,
        tracking_id: &str,
    ) -> GatewayResult<reqwest::Response> {
        let url = self.search_url(query)?;
        debug!(tracking_id = %tracking_id, url = %url, "Calling SRU backend");

        let started = Instant::now();
        let result = self
            .http
            .get(url)
            .header(ACCEPT, "application/xml")
            .send()
            .await;
        debug!(
            tracking_id = %tracking_id,
            timer = "sru_request",
            elapsed_ms = started.elapsed().as_millis() as u64,
            "SRU request finished"
        );

        let response = result.map_err(|e| {
            error!(tracking_id = %tracking_id, error = %e, "SRU backend unreachable");
            GatewayError::BackendUnavailable {
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(
                tracking_id = %tracking_id,
                status = status.as_u16(),
                "Search failed with http code"
            );
            return Err(GatewayError::BackendHttp {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Reads and parses the body of a successful search call.
    pub async fn read_response(
        &self,
        response: reqwest::Response,
        tracking_id: &str,
    ) -> GatewayResult<BackendSearchResult> {
        let started = Instant::now();
        let content_type = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let parsed = match response.text().await {
            Ok(body) => parse_search_response(&body),
            Err(e) => Err(GatewayError::BackendParse {
                message: format!("could not read body: {}", e),
            }),
        };
        debug!(
            tracking_id = %tracking_id,
            timer = "sru_read_response",
            elapsed_ms = started.elapsed().as_millis() as u64,
            "SRU response read"
        );

        if let Err(e) = &parsed {
            error!(
                tracking_id = %tracking_id,
                content_type = ?content_type,
                error = %e,
                "Error processing SRU response"
            );
        }
        parsed
    }
}
