//! Request parameter normalization.
//!
//! Turns the raw query string of a search route into a validated
//! [`SearchRequest`]: required parameters are checked, paging is defaulted and
//! clamped, a tracking id is generated when the caller sent none, and the base
//! is checked against the configured set before anything touches the network.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult};

/// The two query languages the gateway accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryLanguage {
    /// Structured (RPN / PQF) query, served on `/rpn/`.
    Rpn,
    /// Simple (CQL) query, served on `/`.
    Cql,
}

impl QueryLanguage {
    /// Name of the SRU query parameter carrying a query in this language.
    pub fn backend_parameter(self) -> &'static str {
        match self {
            QueryLanguage::Rpn => "x-pquery",
            QueryLanguage::Cql => "query",
        }
    }
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryLanguage::Rpn => write!(f, "rpn"),
            QueryLanguage::Cql => write!(f, "cql"),
        }
    }
}

/// Raw query parameters of a search route.
///
/// Paging values are kept as strings so that malformed numbers produce our own
/// error response instead of the framework's rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// Base (collection) to search.
    pub base: Option<String>,
    /// Query text.
    pub query: Option<String>,
    /// 1-based start position.
    pub start: Option<String>,
    /// Requested page size.
    pub rows: Option<String>,
    /// Output format name passed to the formatter.
    pub format: Option<String>,
    /// Caller correlation id.
    #[serde(rename = "trackingId")]
    pub tracking_id: Option<String>,
}

impl SearchParams {
    /// Returns the tracking id, generating one first when the caller sent
    /// none or an empty one.
    pub fn ensure_tracking_id(&mut self) -> &str {
        if self.tracking_id.as_deref().is_none_or(str::is_empty) {
            self.tracking_id = Some(Uuid::new_v4().to_string());
        }
        self.tracking_id.as_deref().unwrap_or_default()
    }
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Base to search, known to be configured.
    pub base: String,
    /// Query text, passed through untouched.
    pub query: String,
    /// Language of `query`.
    pub language: QueryLanguage,
    /// 1-based position of the first record.
    pub start: u32,
    /// Number of records to fetch, never above the configured maximum.
    pub rows: u32,
    /// Output format name.
    pub format: String,
    /// Caller-supplied or generated correlation id.
    pub tracking_id: String,
}

/// Validates and defaults search parameters.
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    known_bases: HashSet<String>,
    max_page_size: u32,
}

impl QueryNormalizer {
    /// Creates a normalizer for the given bases and page size limit.
    pub fn new<I, B>(known_bases: I, max_page_size: u32) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<String>,
    {
        Self {
            known_bases: known_bases
                .into_iter()
                .map(Into::into)
                .map(|b: String| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .collect(),
            max_page_size,
        }
    }

    /// Returns true if `base` may be searched.
    pub fn is_known_base(&self, base: &str) -> bool {
        self.known_bases.contains(base)
    }

    /// Produces a [`SearchRequest`] from raw parameters.
    pub fn normalize(
        &self,
        mut params: SearchParams,
        language: QueryLanguage,
    ) -> GatewayResult<SearchRequest> {
        let tracking_id = params.ensure_tracking_id().to_string();
        let base = required(params.base, "base")?;
        let query = required(params.query, "query")?;
        let format = required(params.format, "format")?;

        let start = parse_number(params.start.as_deref(), "start")?
            .map_or(1, |start| start.clamp(1, i64::from(u32::MAX)) as u32);
        let rows = self.clamp_rows(parse_number(params.rows.as_deref(), "rows")?);

        if !self.is_known_base(&base) {
            return Err(GatewayError::UnknownBase { base });
        }

        Ok(SearchRequest {
            base,
            query,
            language,
            start,
            rows,
            format,
            tracking_id,
        })
    }

    /// Defaults to the maximum, clamps down to it, floors negatives at zero.
    fn clamp_rows(&self, rows: Option<i64>) -> u32 {
        match rows {
            None => self.max_page_size,
            Some(rows) if rows >= i64::from(self.max_page_size) => self.max_page_size,
            Some(rows) => rows.max(0) as u32,
        }
    }
}

fn required(value: Option<String>, name: &'static str) -> GatewayResult<String> {
    match value {
        Some(v) => Ok(v),
        None => Err(GatewayError::MissingParameter { name }),
    }
}

fn parse_number(value: Option<&str>, name: &'static str) -> GatewayResult<Option<i64>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .map(Some)
            .map_err(|_| GatewayError::InvalidParameter {
                name,
                value: v.to_string(),
            }),
    }
}
