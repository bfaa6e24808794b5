//! Nodes of the hierarchical data model.
//!
//! A [`Document`] is an immutable arena of nodes. Node ids are handed out in
//! document order while the tree is built, so comparing two nodes of the same
//! document is an integer comparison. Nodes of different documents are
//! ordered by a process-unique document id, which is stable for the lifetime
//! of the documents involved.
//!
//! # Example
//!
//! ```
//! use xqrt_core::{DocumentBuilder, NodeKind};
//!
//! let mut builder = DocumentBuilder::new();
//! builder.start_element_with("book", [("id", "b1")]);
//! builder.start_element("title");
//! builder.text("Dune");
//! builder.end_element();
//! builder.end_element();
//! let doc = builder.finish();
//!
//! let root = doc.root();
//! let book = root.children().next().unwrap();
//! assert_eq!(book.kind(), NodeKind::Element);
//! assert_eq!(book.name(), Some("book"));
//! assert_eq!(book.string_value(), "Dune");
//! assert_eq!(book.attributes().next().unwrap().string_value(), "b1");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// The kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The document node at the root of every tree.
    Document,
    /// An element.
    Element,
    /// An attribute of an element.
    Attribute,
    /// Character data.
    Text,
    /// A comment.
    Comment,
    /// A processing instruction; its name is the target.
    ProcessingInstruction,
}

impl NodeKind {
    /// Returns the kind test name (`element()`, `text()`, ...).
    #[must_use]
    pub const fn test_name(self) -> &'static str {
        match self {
            Self::Document => "document-node()",
            Self::Element => "element()",
            Self::Attribute => "attribute()",
            Self::Text => "text()",
            Self::Comment => "comment()",
            Self::ProcessingInstruction => "processing-instruction()",
        }
    }
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    name: Option<String>,
    value: Option<String>,
    parent: Option<u32>,
    children: Vec<u32>,
    attributes: Vec<u32>,
}

impl NodeData {
    fn new(kind: NodeKind, name: Option<String>, value: Option<String>, parent: Option<u32>) -> Self {
        Self { kind, name, value, parent, children: Vec::new(), attributes: Vec::new() }
    }
}

/// An immutable tree of nodes.
#[derive(Debug)]
pub struct Document {
    id: u64,
    nodes: Vec<NodeData>,
}

impl Document {
    /// Returns the process-unique id of this document.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the number of nodes, including the document node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a document has at least its document node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the document node.
    #[must_use]
    pub fn root(self: &Arc<Self>) -> NodeRef {
        NodeRef { doc: Arc::clone(self), id: 0 }
    }

    fn node(&self, id: u32) -> &NodeData {
        &self.nodes[id as usize]
    }
}

/// Incrementally builds a [`Document`] in document order.
#[derive(Debug)]
pub struct DocumentBuilder {
    nodes: Vec<NodeData>,
    open: Vec<u32>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    /// Creates a builder holding just the document node.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: vec![NodeData::new(NodeKind::Document, None, None, None)], open: vec![0] }
    }

    fn current(&self) -> u32 {
        self.open.last().copied().unwrap_or(0)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn push(&mut self, data: NodeData) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(data);
        id
    }

    fn push_child(&mut self, kind: NodeKind, name: Option<String>, value: Option<String>) -> u32 {
        let parent = self.current();
        let id = self.push(NodeData::new(kind, name, value, Some(parent)));
        self.nodes[parent as usize].children.push(id);
        id
    }

    /// Opens an element without attributes.
    pub fn start_element(&mut self, name: impl Into<String>) -> &mut Self {
        self.start_element_with(name, std::iter::empty::<(String, String)>())
    }

    /// Opens an element with attributes.
    ///
    /// Attributes are taken together with the element so that their ids
    /// precede the ids of the element's children.
    pub fn start_element_with<K, V>(
        &mut self,
        name: impl Into<String>,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let element = self.push_child(NodeKind::Element, Some(name.into()), None);
        for (key, value) in attributes {
            let attr = self.push(NodeData::new(
                NodeKind::Attribute,
                Some(key.into()),
                Some(value.into()),
                Some(element),
            ));
            self.nodes[element as usize].attributes.push(attr);
        }
        self.open.push(element);
        self
    }

    /// Closes the innermost open element. Extra calls are ignored.
    pub fn end_element(&mut self) -> &mut Self {
        if self.open.len() > 1 {
            self.open.pop();
        }
        self
    }

    /// Appends a text node.
    pub fn text(&mut self, value: impl Into<String>) -> &mut Self {
        self.push_child(NodeKind::Text, None, Some(value.into()));
        self
    }

    /// Appends a comment.
    pub fn comment(&mut self, value: impl Into<String>) -> &mut Self {
        self.push_child(NodeKind::Comment, None, Some(value.into()));
        self
    }

    /// Appends a processing instruction.
    pub fn processing_instruction(
        &mut self,
        target: impl Into<String>,
        data: impl Into<String>,
    ) -> &mut Self {
        self.push_child(NodeKind::ProcessingInstruction, Some(target.into()), Some(data.into()));
        self
    }

    /// Finishes the document, closing any elements still open.
    #[must_use]
    pub fn finish(self) -> Arc<Document> {
        Arc::new(Document {
            id: NEXT_DOCUMENT_ID.fetch_add(1, AtomicOrdering::Relaxed),
            nodes: self.nodes,
        })
    }
}

/// A reference to a node inside a shared [`Document`].
#[derive(Clone)]
pub struct NodeRef {
    doc: Arc<Document>,
    id: u32,
}

impl NodeRef {
    fn sibling(&self, id: u32) -> Self {
        Self { doc: Arc::clone(&self.doc), id }
    }

    fn data(&self) -> &NodeData {
        self.doc.node(self.id)
    }

    /// Returns the owning document.
    #[must_use]
    pub fn document(&self) -> &Arc<Document> {
        &self.doc
    }

    /// Returns the node kind.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    /// Returns the node name for elements, attributes and processing
    /// instructions.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.data().name.as_deref()
    }

    /// Returns the name without any prefix.
    #[must_use]
    pub fn local_name(&self) -> Option<&str> {
        self.name().map(|name| name.rsplit_once(':').map_or(name, |(_, local)| local))
    }

    /// Returns the parent node, if any. The parent of an attribute is its
    /// element.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.data().parent.map(|id| self.sibling(id))
    }

    /// Returns the children in document order. Attributes are not children.
    pub fn children(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.data().children.iter().map(move |&id| self.sibling(id))
    }

    /// Returns the attributes of an element.
    pub fn attributes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.data().attributes.iter().map(move |&id| self.sibling(id))
    }

    /// Returns all descendants (not attributes) in document order.
    #[must_use]
    pub fn descendants(&self) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let mut stack: Vec<u32> = self.data().children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(self.sibling(id));
            stack.extend(self.doc.node(id).children.iter().rev().copied());
        }
        out
    }

    /// Returns the string value: the text content for documents and elements,
    /// the value for every other kind.
    #[must_use]
    pub fn string_value(&self) -> String {
        match self.kind() {
            NodeKind::Document | NodeKind::Element => self
                .descendants()
                .iter()
                .filter(|n| n.kind() == NodeKind::Text)
                .filter_map(|n| n.data().value.clone())
                .collect(),
            _ => self.data().value.clone().unwrap_or_default(),
        }
    }

    /// The sort key used for document order across documents.
    #[must_use]
    pub fn order_key(&self) -> (u64, u32) {
        (self.doc.id, self.id)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for NodeRef {}

impl Hash for NodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_key().hash(state);
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("NodeRef");
        s.field("doc", &self.doc.id).field("id", &self.id).field("kind", &self.kind());
        if let Some(name) = self.name() {
            s.field("name", &name);
        }
        s.finish()
    }
}
