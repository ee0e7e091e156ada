//! SRU `searchRetrieveResponse` model and parser.
//!
//! Only the parts the gateway needs are read: the hit count, the records in
//! order (escaping kind, position and payload) and any diagnostics. Elements
//! are matched by local name, so SRU 1.2 and 2.0 namespaces both work.

use roxmltree::Document;

use crate::error::{GatewayError, GatewayResult};
use crate::xml::{child_element, child_text, element_to_string, is_significant};

/// Escaping kind of a record delivered as embedded XML.
pub const XML_ESCAPING: &str = "xml";

/// Parsed SRU search result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendSearchResult {
    /// Total number of hits reported by the backend.
    pub hits: u64,
    /// Records of the requested page, in backend order.
    pub records: Vec<RawRecord>,
    /// Diagnostics the backend attached to the response.
    pub diagnostics: Vec<Diagnostic>,
}

/// One record of an SRU response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// `recordPosition`, when present.
    pub position: Option<u64>,
    /// `recordXMLEscaping` (SRU 2.0) or `recordPacking` (SRU 1.2).
    pub escaping: Option<String>,
    /// Significant nodes of `recordData`.
    pub content: Vec<RecordContent>,
}

impl RawRecord {
    /// True when the record payload is embedded XML.
    pub fn is_xml_escaped(&self) -> bool {
        self.escaping
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(XML_ESCAPING))
    }
}

/// A significant node inside `recordData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordContent {
    /// An element, serialized as standalone XML.
    Element(String),
    /// A non-whitespace text node.
    Text(String),
}

impl RecordContent {
    /// Short name of the node kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordContent::Element(_) => "element",
            RecordContent::Text(_) => "text",
        }
    }
}

/// An SRU diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostic {
    /// Diagnostic URI.
    pub uri: Option<String>,
    /// Details, usually the offending value.
    pub details: Option<String>,
    /// Human-readable message.
    pub message: Option<String>,
}

/// Parses an SRU `searchRetrieveResponse` body.
pub fn parse_search_response(body: &str) -> GatewayResult<BackendSearchResult> {
    let doc = Document::parse(body).map_err(|e| parse_error(e.to_string()))?;
    let root = doc.root_element();

    if root.tag_name().name() != "searchRetrieveResponse" {
        return Err(parse_error(format!(
            "unexpected root element '{}'",
            root.tag_name().name()
        )));
    }

    let hits = match child_text(root, "numberOfRecords") {
        Some(text) => text
            .parse::<u64>()
            .map_err(|_| parse_error(format!("invalid numberOfRecords '{}'", text)))?,
        None => return Err(parse_error("missing numberOfRecords")),
    };

    let mut records = Vec::new();
    if let Some(list) = child_element(root, "records") {
        for record in list
            .children()
            .filter(|c| c.is_element() && c.tag_name().name() == "record")
        {
            let escaping = child_text(record, "recordXMLEscaping")
                .or_else(|| child_text(record, "recordPacking"))
                .map(str::to_string);
            let position = child_text(record, "recordPosition").and_then(|p| p.parse().ok());

            let mut content = Vec::new();
            if let Some(data) = child_element(record, "recordData") {
                for node in data.children().filter(is_significant) {
                    if node.is_element() {
                        let xml = element_to_string(node).map_err(|e| parse_error(e.to_string()))?;
                        content.push(RecordContent::Element(xml));
                    } else if let Some(text) = node.text() {
                        content.push(RecordContent::Text(text.to_string()));
                    }
                }
            }

            records.push(RawRecord {
                position,
                escaping,
                content,
            });
        }
    }

    let diagnostics = child_element(root, "diagnostics")
        .map(|list| {
            list.children()
                .filter(|c| c.is_element() && c.tag_name().name() == "diagnostic")
                .map(|d| Diagnostic {
                    uri: child_text(d, "uri").map(str::to_string),
                    details: child_text(d, "details").map(str::to_string),
                    message: child_text(d, "message").map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(BackendSearchResult {
        hits,
        records,
        diagnostics,
    })
}

fn parse_error(message: impl Into<String>) -> GatewayError {
    GatewayError::BackendParse {
        message: message.into(),
    }
}
