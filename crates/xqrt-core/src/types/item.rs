//! Items: the members of a sequence.

use std::fmt;

use super::atomic::AtomicValue;
use super::node::NodeRef;

/// An item is either an atomic value or a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// An atomic value.
    Atomic(AtomicValue),
    /// A node of some document.
    Node(NodeRef),
}

impl Item {
    /// Creates an integer item.
    #[must_use]
    pub const fn integer(value: i64) -> Self {
        Self::Atomic(AtomicValue::Integer(value))
    }

    /// Creates a double item.
    #[must_use]
    pub const fn double(value: f64) -> Self {
        Self::Atomic(AtomicValue::Double(value))
    }

    /// Creates a boolean item.
    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self::Atomic(AtomicValue::Boolean(value))
    }

    /// Creates a string item.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Atomic(AtomicValue::String(value.into()))
    }

    /// Returns the atomic value, if this item is atomic.
    #[must_use]
    pub const fn as_atomic(&self) -> Option<&AtomicValue> {
        match self {
            Self::Atomic(value) => Some(value),
            Self::Node(_) => None,
        }
    }

    /// Returns the node, if this item is a node.
    #[must_use]
    pub const fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Self::Node(node) => Some(node),
            Self::Atomic(_) => None,
        }
    }

    /// Returns true if this item is a node.
    #[must_use]
    pub const fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    /// Returns the typed value of the item. Nodes carry no schema type, so
    /// their typed value is their string value as `xs:untypedAtomic`.
    #[must_use]
    pub fn atomize(&self) -> AtomicValue {
        match self {
            Self::Atomic(value) => value.clone(),
            Self::Node(node) => AtomicValue::UntypedAtomic(node.string_value()),
        }
    }

    /// Returns the `fn:string` value of the item.
    #[must_use]
    pub fn string_value(&self) -> String {
        match self {
            Self::Atomic(value) => value.string_value(),
            Self::Node(node) => node.string_value(),
        }
    }

    /// Returns a short description of the item's type for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Atomic(value) => value.atomic_type().name(),
            Self::Node(node) => node.kind().test_name(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atomic(value) => write!(f, "{value}"),
            Self::Node(node) => match node.name() {
                Some(name) => write!(f, "{}({name})", node.kind().test_name().trim_end_matches("()")),
                None => f.write_str(node.kind().test_name()),
            },
        }
    }
}

impl From<AtomicValue> for Item {
    fn from(value: AtomicValue) -> Self {
        Self::Atomic(value)
    }
}

impl From<NodeRef> for Item {
    fn from(node: NodeRef) -> Self {
        Self::Node(node)
    }
}

impl From<i64> for Item {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl From<f64> for Item {
    fn from(value: f64) -> Self {
        Self::double(value)
    }
}

impl From<bool> for Item {
    fn from(value: bool) -> Self {
        Self::boolean(value)
    }
}

impl From<&str> for Item {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}
