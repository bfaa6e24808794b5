//! Materialized sequences.
//!
//! A [`Sequence`] is the fully realized form of a query result: immutable,
//! randomly accessible, and iterable any number of times. The items live in a
//! shared slice, so cloning a sequence (for instance to hand the same
//! register value to several readers) never copies items.

use std::fmt;
use std::sync::Arc;

use super::atomic::AtomicValue;
use super::item::Item;
use crate::error::{CoreError, CoreResult};

/// An ordered, finite, immutable sequence of items.
#[derive(Clone, PartialEq)]
pub struct Sequence {
    items: Arc<[Item]>,
}

impl Sequence {
    /// Returns the empty sequence.
    #[must_use]
    pub fn empty() -> Self {
        Self { items: Arc::from(Vec::new()) }
    }

    /// Returns a sequence holding exactly one item.
    #[must_use]
    pub fn singleton(item: impl Into<Item>) -> Self {
        Self { items: Arc::from(vec![item.into()]) }
    }

    /// Creates a sequence from items, keeping their order.
    #[must_use]
    pub fn from_items(items: Vec<Item>) -> Self {
        Self { items: Arc::from(items) }
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Returns the first item.
    #[must_use]
    pub fn first(&self) -> Option<&Item> {
        self.items.first()
    }

    /// Returns the items as a slice.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Iterates over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Returns true if both sequences share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    /// Atomizes every item.
    #[must_use]
    pub fn atomize(&self) -> Vec<AtomicValue> {
        self.items.iter().map(Item::atomize).collect()
    }

    /// Atomizes a sequence that must hold at most one item.
    ///
    /// Returns `None` for the empty sequence.
    pub fn atomize_optional(&self) -> CoreResult<Option<AtomicValue>> {
        match self.items.as_ref() {
            [] => Ok(None),
            [item] => Ok(Some(item.atomize())),
            _ => Err(CoreError::type_mismatch(
                "a sequence of zero or one item",
                format!("a sequence of {} items", self.len()),
            )),
        }
    }

    /// Computes the effective boolean value.
    pub fn effective_boolean_value(&self) -> CoreResult<bool> {
        let Some(first) = self.items.first() else {
            return Ok(false);
        };
        if first.is_node() {
            return Ok(true);
        }
        if self.items.len() > 1 {
            return Err(CoreError::InvalidBooleanValue(format!(
                "a sequence of {} atomic values",
                self.items.len()
            )));
        }
        match first.atomize() {
            AtomicValue::Boolean(b) => Ok(b),
            AtomicValue::String(s) | AtomicValue::UntypedAtomic(s) => Ok(!s.is_empty()),
            AtomicValue::Integer(i) => Ok(i != 0),
            AtomicValue::Double(d) => Ok(!(d == 0.0 || d.is_nan())),
        }
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str(")")
    }
}

impl From<Vec<Item>> for Sequence {
    fn from(items: Vec<Item>) -> Self {
        Self::from_items(items)
    }
}

impl FromIterator<Item> for Sequence {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self::from_items(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
