//! Per-record preparation: classification and identifier extraction.
//!
//! A backend record is usable when it was delivered as embedded XML and its
//! payload holds exactly one element. The identifier of a usable record is
//! the text of its first `controlfield` child with `tag="001"`, prefixed with
//! the caller-supplied prefix; records without one get a generated id.

pub mod tree;

pub use tree::{NodeKind, TreeNode, find_first_child};

use roxmltree::Document;
use tracing::debug;
use uuid::Uuid;

use crate::error::RecordError;
use crate::sru::{RawRecord, RecordContent};

/// Element holding a MARC control field.
pub const CONTROL_FIELD: &str = "controlfield";

/// Control field tag of the record's system identifier.
pub const IDENTIFIER_TAG: &str = "001";

/// A record that is ready for formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecord {
    /// Caller-facing identifier.
    pub identifier: String,
    /// The record document as standalone XML.
    pub document: String,
}

/// Extracts identifiers from backend records.
#[derive(Debug, Clone)]
pub struct RecordIdentifierResolver {
    prefix: String,
}

impl RecordIdentifierResolver {
    /// Creates a resolver that prepends `prefix` to every identifier.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix used for identifiers.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Classifies `record` and extracts its identifier.
    pub fn resolve(&self, record: &RawRecord) -> Result<ResolvedRecord, RecordError> {
        if !record.is_xml_escaped() {
            return Err(RecordError::Escaping {
                found: record.escaping.clone(),
            });
        }

        let document = match record.content.as_slice() {
            [RecordContent::Element(xml)] => xml,
            [RecordContent::Text(_)] => return Err(RecordError::NotXml),
            other => {
                debug!(
                    kinds = ?other.iter().map(RecordContent::kind).collect::<Vec<_>>(),
                    "Unexpected record payload"
                );
                return Err(RecordError::ContentCount { count: other.len() });
            }
        };

        let parsed = Document::parse(document).map_err(|e| RecordError::Malformed {
            message: e.to_string(),
        })?;

        Ok(ResolvedRecord {
            identifier: extract_identifier(&parsed.root_element(), &self.prefix),
            document: document.clone(),
        })
    }
}

/// Returns `prefix` + the first `001` control field's text, or `prefix` + a
/// fresh UUID when there is none or its first child is not text.
pub fn extract_identifier<N: TreeNode>(record: &N, prefix: &str) -> String {
    let found = find_first_child(record, CONTROL_FIELD, "tag", IDENTIFIER_TAG)
        .and_then(|field| field.first_child_node())
        .filter(|child| child.node_kind() == NodeKind::Text)
        .and_then(|child| child.text_value().map(|text| format!("{}{}", prefix, text)));

    found.unwrap_or_else(|| format!("{}{}", prefix, Uuid::new_v4()))
}
