//! Sequence types and the dynamic type test.
//!
//! A [`SequenceType`] is what a typeswitch case clause declares: an item type
//! plus an occurrence indicator, or `empty-sequence()`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::atomic::AtomicType;
use super::item::Item;
use super::node::NodeKind;
use super::sequence::Sequence;

/// The item part of a sequence type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    /// `item()`: anything.
    AnyItem,
    /// `node()`: any node.
    AnyNode,
    /// `document-node()`
    Document,
    /// `element()` or `element(name)`.
    Element(Option<String>),
    /// `attribute()` or `attribute(name)`.
    Attribute(Option<String>),
    /// `text()`
    Text,
    /// `comment()`
    Comment,
    /// `processing-instruction()`
    ProcessingInstruction,
    /// An atomic type such as `xs:integer`.
    Atomic(AtomicType),
}

impl ItemType {
    /// Returns true if `item` is an instance of this type.
    #[must_use]
    pub fn matches(&self, item: &Item) -> bool {
        match (self, item) {
            (Self::AnyItem, _) => true,
            (Self::Atomic(expected), Item::Atomic(value)) => {
                value.atomic_type().is_subtype_of(*expected)
            }
            (Self::Atomic(_), Item::Node(_)) => false,
            (_, Item::Atomic(_)) => false,
            (Self::AnyNode, Item::Node(_)) => true,
            (Self::Document, Item::Node(node)) => node.kind() == NodeKind::Document,
            (Self::Element(name), Item::Node(node)) => {
                node.kind() == NodeKind::Element && name_matches(name.as_deref(), node.name())
            }
            (Self::Attribute(name), Item::Node(node)) => {
                node.kind() == NodeKind::Attribute && name_matches(name.as_deref(), node.name())
            }
            (Self::Text, Item::Node(node)) => node.kind() == NodeKind::Text,
            (Self::Comment, Item::Node(node)) => node.kind() == NodeKind::Comment,
            (Self::ProcessingInstruction, Item::Node(node)) => {
                node.kind() == NodeKind::ProcessingInstruction
            }
        }
    }
}

fn name_matches(expected: Option<&str>, actual: Option<&str>) -> bool {
    match expected {
        None | Some("*") => true,
        Some(expected) => actual == Some(expected),
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnyItem => f.write_str("item()"),
            Self::AnyNode => f.write_str("node()"),
            Self::Document => f.write_str("document-node()"),
            Self::Element(None) => f.write_str("element()"),
            Self::Element(Some(name)) => write!(f, "element({name})"),
            Self::Attribute(None) => f.write_str("attribute()"),
            Self::Attribute(Some(name)) => write!(f, "attribute({name})"),
            Self::Text => f.write_str("text()"),
            Self::Comment => f.write_str("comment()"),
            Self::ProcessingInstruction => f.write_str("processing-instruction()"),
            Self::Atomic(t) => write!(f, "{t}"),
        }
    }
}

/// How many items a sequence type admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occurrence {
    /// Exactly one item.
    One,
    /// `?`
    ZeroOrOne,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Occurrence {
    /// Returns true if `count` items are admitted.
    #[must_use]
    pub const fn admits(self, count: usize) -> bool {
        match self {
            Self::One => count == 1,
            Self::ZeroOrOne => count <= 1,
            Self::ZeroOrMore => true,
            Self::OneOrMore => count >= 1,
        }
    }

    const fn indicator(self) -> &'static str {
        match self {
            Self::One => "",
            Self::ZeroOrOne => "?",
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
        }
    }
}

/// A sequence type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceType {
    /// `empty-sequence()`
    Empty,
    /// An item type with an occurrence indicator.
    Items(ItemType, Occurrence),
}

impl SequenceType {
    /// `item-type` with exactly one occurrence.
    #[must_use]
    pub const fn one(item_type: ItemType) -> Self {
        Self::Items(item_type, Occurrence::One)
    }

    /// `item-type?`
    #[must_use]
    pub const fn optional(item_type: ItemType) -> Self {
        Self::Items(item_type, Occurrence::ZeroOrOne)
    }

    /// `item-type*`
    #[must_use]
    pub const fn zero_or_more(item_type: ItemType) -> Self {
        Self::Items(item_type, Occurrence::ZeroOrMore)
    }

    /// `item-type+`
    #[must_use]
    pub const fn one_or_more(item_type: ItemType) -> Self {
        Self::Items(item_type, Occurrence::OneOrMore)
    }

    /// A single atomic value of the given type.
    #[must_use]
    pub const fn atomic(atomic_type: AtomicType) -> Self {
        Self::one(ItemType::Atomic(atomic_type))
    }

    /// Returns true if `sequence` is an instance of this type.
    #[must_use]
    pub fn matches(&self, sequence: &Sequence) -> bool {
        match self {
            Self::Empty => sequence.is_empty(),
            Self::Items(item_type, occurrence) => {
                occurrence.admits(sequence.len()) && sequence.iter().all(|i| item_type.matches(i))
            }
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty-sequence()"),
            Self::Items(item_type, occurrence) => write!(f, "{item_type}{}", occurrence.indicator()),
        }
    }
}
