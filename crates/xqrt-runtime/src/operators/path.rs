//! Path steps over the node tree.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use xqrt_core::{ErrorCode, Item, ItemType, NodeKind, NodeRef, Sequence};

use super::Iter;
use crate::error::{RuntimeError, RuntimeResult};
use crate::frame::Frame;
use crate::iter::{scalar_iterator, RuntimeIterator, ScalarState};
use crate::register::RegisterAllocator;

/// A navigation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// `child::`
    Child,
    /// `descendant::`
    Descendant,
    /// `descendant-or-self::`
    DescendantOrSelf,
    /// `self::`
    SelfNode,
    /// `parent::`
    Parent,
    /// `attribute::`
    Attribute,
}

impl Axis {
    /// Returns the node kind a name test selects on this axis.
    #[must_use]
    pub const fn principal_kind(self) -> NodeKind {
        match self {
            Self::Attribute => NodeKind::Attribute,
            _ => NodeKind::Element,
        }
    }

    /// Returns the nodes reachable from `node` along this axis.
    #[must_use]
    pub fn nodes(self, node: &NodeRef) -> Vec<NodeRef> {
        match self {
            Self::Child => node.children().collect(),
            Self::Descendant => node.descendants(),
            Self::DescendantOrSelf => {
                let mut nodes = vec![node.clone()];
                nodes.extend(node.descendants());
                nodes
            }
            Self::SelfNode => vec![node.clone()],
            Self::Parent => node.parent().into_iter().collect(),
            Self::Attribute => node.attributes().collect(),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Child => "child",
            Self::Descendant => "descendant",
            Self::DescendantOrSelf => "descendant-or-self",
            Self::SelfNode => "self",
            Self::Parent => "parent",
            Self::Attribute => "attribute",
        })
    }
}

/// A node test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeTest {
    /// A name test; `*` matches any name. Only nodes of the axis' principal
    /// kind pass.
    Name(String),
    /// A kind test such as `text()` or `element(a)`.
    Kind(ItemType),
}

impl NodeTest {
    /// Returns true if `node`, reached along `axis`, passes the test.
    #[must_use]
    pub fn matches(&self, axis: Axis, node: &NodeRef) -> bool {
        match self {
            Self::Name(name) => {
                node.kind() == axis.principal_kind()
                    && (name == "*" || node.name() == Some(name.as_str()))
            }
            Self::Kind(item_type) => item_type.matches(&Item::Node(node.clone())),
        }
    }
}

/// `context/axis::test`.
///
/// The context expression is evaluated first; every item must be a node.
/// The result holds each selected node once, in document order.
#[derive(Debug)]
pub struct PathOp {
    scalar: ScalarState,
    context: Box<Iter>,
    axis: Axis,
    test: NodeTest,
}

impl PathOp {
    /// Creates a path step.
    pub fn new(alloc: &mut RegisterAllocator, context: Iter, axis: Axis, test: NodeTest) -> Self {
        Self { scalar: ScalarState::new(alloc), context: Box::new(context), axis, test }
    }

    fn compute(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        let context = self.context.evaluate_eagerly(frame)?;
        let mut selected = BTreeSet::new();
        for item in &context {
            let Item::Node(node) = item else {
                return Err(RuntimeError::dynamic(
                    ErrorCode::XPTY0019,
                    "Path",
                    format!("context item of a path step must be a node, got {}", item.type_name()),
                ));
            };
            selected.extend(
                self.axis.nodes(node).into_iter().filter(|n| self.test.matches(self.axis, n)),
            );
        }
        Ok(selected.into_iter().map(Item::Node).collect())
    }
}

scalar_iterator!(PathOp, "Path");

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use xqrt_core::{Document, DocumentBuilder};

    use super::*;
    use crate::operators::LiteralOp;
    use crate::register::GlobalRegisters;

    fn sample() -> Arc<Document> {
        let mut b = DocumentBuilder::new();
        b.start_element("lib")
            .start_element_with("book", [("id", "1")])
            .start_element("title")
            .text("A")
            .end_element()
            .end_element()
            .start_element_with("book", [("id", "2")])
            .start_element("title")
            .text("B")
            .end_element()
            .comment("note")
            .end_element()
            .end_element();
        b.finish()
    }

    fn step(context: Sequence, axis: Axis, test: NodeTest) -> RuntimeResult<Sequence> {
        let mut alloc = RegisterAllocator::new();
        let context = LiteralOp::new(&mut alloc, context).into();
        let iter: Iter = PathOp::new(&mut alloc, context, axis, test).into();
        let globals = GlobalRegisters::new(0);
        let mut frame = Frame::new(alloc.frame_size(), &globals);
        iter.evaluate_eagerly(&mut frame)
    }

    fn names(seq: &Sequence) -> Vec<String> {
        seq.iter().map(|i| i.as_node().and_then(NodeRef::name).unwrap_or("?").to_owned()).collect()
    }

    #[test]
    fn descendant_name_test() {
        let doc = sample();
        let titles = step(
            Sequence::singleton(doc.root()),
            Axis::Descendant,
            NodeTest::Name("title".into()),
        )
        .unwrap();
        let text: Vec<_> = titles.iter().map(Item::string_value).collect();
        assert_eq!(text, vec!["A", "B"]);
    }

    #[test]
    fn results_are_deduplicated_in_document_order() {
        let doc = sample();
        let books = step(
            Sequence::singleton(doc.root()),
            Axis::Descendant,
            NodeTest::Name("book".into()),
        )
        .unwrap();
        // both books have the same parent; reversed input still yields it once
        let reversed: Sequence = books.iter().rev().cloned().collect();
        let parents = step(reversed, Axis::Parent, NodeTest::Name("*".into())).unwrap();
        assert_eq!(names(&parents), vec!["lib"]);

        let titles = step(books.clone(), Axis::Child, NodeTest::Name("title".into())).unwrap();
        let mixed: Sequence = titles.iter().chain(books.iter()).cloned().collect();
        let all = step(mixed, Axis::SelfNode, NodeTest::Kind(ItemType::Element(None))).unwrap();
        assert_eq!(names(&all), vec!["book", "title", "book", "title"]);
    }

    #[test]
    fn attribute_axis() {
        let doc = sample();
        let books = step(
            Sequence::singleton(doc.root()),
            Axis::Descendant,
            NodeTest::Name("book".into()),
        )
        .unwrap();
        let ids = step(books, Axis::Attribute, NodeTest::Name("id".into())).unwrap();
        let values: Vec<_> = ids.iter().map(Item::string_value).collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn kind_tests() {
        let doc = sample();
        let comments = step(
            Sequence::singleton(doc.root()),
            Axis::DescendantOrSelf,
            NodeTest::Kind(ItemType::Comment),
        )
        .unwrap();
        assert_eq!(comments.len(), 1);
        // name tests on the child axis skip text nodes
        let titles = step(
            Sequence::singleton(doc.root()),
            Axis::Descendant,
            NodeTest::Name("title".into()),
        )
        .unwrap();
        let any = step(titles, Axis::Child, NodeTest::Name("*".into())).unwrap();
        assert!(any.is_empty());
    }

    #[test]
    fn atomic_context_is_an_error() {
        let err = step(Sequence::singleton(Item::integer(1)), Axis::Child, NodeTest::Name("a".into()))
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::XPTY0019));
    }
}
