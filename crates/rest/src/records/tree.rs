//! A minimal tree-of-nodes view used for identifier lookup.
//!
//! The lookup only needs node kinds, local names, attributes, children and
//! text, so it is written against [`TreeNode`] rather than a concrete document
//! model. `roxmltree` nodes implement it out of the box.

/// Kind of a node in a document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An element node.
    Element,
    /// A text node.
    Text,
    /// Anything else (comments, processing instructions, the document root).
    Other,
}

/// Read-only access to one node of a document tree.
pub trait TreeNode: Sized {
    /// The kind of this node.
    fn node_kind(&self) -> NodeKind;

    /// Local (namespace-free) name; `None` for non-elements.
    fn local_name(&self) -> Option<&str>;

    /// Value of an un-namespaced attribute.
    fn attribute_value(&self, name: &str) -> Option<&str>;

    /// Text content of a text node.
    fn text_value(&self) -> Option<&str>;

    /// First child node, of any kind.
    fn first_child_node(&self) -> Option<Self>;

    /// Direct children in document order.
    fn child_nodes(&self) -> impl Iterator<Item = Self>;
}

/// Finds the first direct child element of `parent` named `name` whose
/// attribute `attribute` equals `value`.
///
/// Later matches are ignored.
pub fn find_first_child<N: TreeNode>(
    parent: &N,
    name: &str,
    attribute: &str,
    value: &str,
) -> Option<N> {
    parent.child_nodes().find(|child| {
        child.node_kind() == NodeKind::Element
            && child.local_name() == Some(name)
            && child.attribute_value(attribute) == Some(value)
    })
}

impl<'a, 'input: 'a> TreeNode for roxmltree::Node<'a, 'input> {
    fn node_kind(&self) -> NodeKind {
        if self.is_element() {
            NodeKind::Element
        } else if self.is_text() {
            NodeKind::Text
        } else {
            NodeKind::Other
        }
    }

    fn local_name(&self) -> Option<&str> {
        self.is_element().then(|| self.tag_name().name())
    }

    fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name)
    }

    fn text_value(&self) -> Option<&str> {
        if self.is_text() { self.text() } else { None }
    }

    fn first_child_node(&self) -> Option<Self> {
        self.first_child()
    }

    fn child_nodes(&self) -> impl Iterator<Item = Self> {
        self.children()
    }
}
