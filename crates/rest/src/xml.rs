//! XML helpers shared by the SRU parser, the formatter client and the
//! response writer.
//!
//! Parsing goes through `roxmltree`; writing goes through `quick-xml`.

use std::io::Write;
use std::string::FromUtf8Error;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use roxmltree::Node;
use thiserror::Error;

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Error raised while writing XML.
#[derive(Error, Debug)]
pub enum XmlError {
    /// Writing to the underlying buffer failed.
    #[error("xml write error: {0}")]
    Io(#[from] std::io::Error),

    /// quick-xml rejected the event stream.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The written bytes were not UTF-8.
    #[error("xml encoding error: {0}")]
    Encoding(#[from] FromUtf8Error),
}

/// Returns the first child element of `node` with the given local name.
pub fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// Returns the trimmed text of the first child element with the given local name.
pub fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child_element(node, name)
        .and_then(|c| c.text())
        .map(str::trim)
}

/// Returns true for nodes that carry record content: elements and
/// non-whitespace text.
pub fn is_significant(node: &Node<'_, '_>) -> bool {
    node.is_element() || (node.is_text() && node.text().is_some_and(|t| !t.trim().is_empty()))
}

/// Serializes an element and its subtree as a standalone document fragment.
///
/// Every namespace in scope at `node` is declared on the written root, so the
/// result parses on its own even when the bindings came from ancestors.
/// Comments and processing instructions are dropped.
pub fn element_to_string(node: Node<'_, '_>) -> Result<String, XmlError> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, node, None)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Writes `<name>text</name>` with `text` escaped.
pub fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), XmlError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    node: Node<'_, '_>,
    parent: Option<Node<'_, '_>>,
) -> Result<(), XmlError> {
    let name = element_name(node);
    let mut start = BytesStart::new(name.as_str());
    let mut declares_default = false;

    for ns in node.namespaces() {
        if ns.name() == Some("xml") {
            continue;
        }
        let inherited = parent.is_some_and(|p| {
            p.namespaces()
                .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
        });
        if inherited {
            continue;
        }
        match ns.name() {
            Some(prefix) => {
                let key = format!("xmlns:{}", prefix);
                start.push_attribute((key.as_str(), ns.uri()));
            }
            None => {
                declares_default = true;
                start.push_attribute(("xmlns", ns.uri()));
            }
        }
    }

    // An unqualified child of a default-namespaced parent must reset the default.
    if !declares_default
        && node.tag_name().namespace().is_none()
        && parent.is_some_and(|p| default_namespace(p).is_some_and(|uri| !uri.is_empty()))
    {
        start.push_attribute(("xmlns", ""));
    }

    for attr in node.attributes() {
        let key = match attr.namespace().and_then(|uri| attribute_prefix(node, uri)) {
            Some(prefix) => format!("{}:{}", prefix, attr.name()),
            None => attr.name().to_string(),
        };
        start.push_attribute((key.as_str(), attr.value()));
    }

    let mut children = node
        .children()
        .filter(|c| c.is_element() || c.is_text())
        .peekable();

    if children.peek().is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in children {
        if child.is_element() {
            write_element(writer, child, Some(node))?;
        } else if let Some(text) = child.text() {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

fn element_name(node: Node<'_, '_>) -> String {
    let local = node.tag_name().name();
    let prefix = node.tag_name().namespace().and_then(|uri| {
        node.namespaces()
            .find(|ns| ns.uri() == uri)
            .and_then(|ns| ns.name())
    });
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

fn default_namespace<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.namespaces()
        .find(|ns| ns.name().is_none())
        .map(|ns| ns.uri())
}

// Attributes never pick up the default namespace, so only prefixed bindings count.
fn attribute_prefix<'a>(node: Node<'a, '_>, uri: &str) -> Option<&'a str> {
    if uri == XML_NAMESPACE {
        return Some("xml");
    }
    node.namespaces()
        .filter(|ns| ns.uri() == uri)
        .find_map(|ns| ns.name())
}
