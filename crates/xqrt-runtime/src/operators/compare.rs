//! Value and general comparisons.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use xqrt_core::{AtomicValue, ErrorCode, Item, Sequence};

use super::Iter;
use crate::error::{CoreResultExt, RuntimeError, RuntimeResult};
use crate::frame::Frame;
use crate::iter::{scalar_iterator, RuntimeIterator, ScalarState};
use crate::register::RegisterAllocator;

const OPERATOR: &str = "Compare";

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// `eq` / `=`
    Eq,
    /// `ne` / `!=`
    Ne,
    /// `lt` / `<`
    Lt,
    /// `le` / `<=`
    Le,
    /// `gt` / `>`
    Gt,
    /// `ge` / `>=`
    Ge,
}

impl Comparator {
    /// Returns true if `ordering` satisfies the comparator. An unordered
    /// pair (NaN) satisfies only `Ne`.
    #[must_use]
    pub fn test(self, ordering: Option<Ordering>) -> bool {
        let Some(ordering) = ordering else {
            return self == Self::Ne;
        };
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }
}

/// Whether a comparison works on singletons or existentially on sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonKind {
    /// `eq ne lt le gt ge`: both operands at most one item; untyped values
    /// compare as strings; an empty operand gives an empty result.
    Value,
    /// `= != < <= > >=`: true if any pair of atomized items compares true;
    /// untyped values are cast to the type of the other operand.
    General,
}

/// Compares two atomic values.
///
/// # Errors
///
/// Returns `XPTY0004` if the values are not comparable.
pub fn compare_atomic(
    lhs: &AtomicValue,
    rhs: &AtomicValue,
    comparator: Comparator,
) -> RuntimeResult<bool> {
    use AtomicValue as V;

    let ordering = match (lhs, rhs) {
        (V::Integer(a), V::Integer(b)) => Some(a.cmp(b)),
        (a, b) if a.is_numeric() && b.is_numeric() => {
            a.to_double().at(OPERATOR)?.partial_cmp(&b.to_double().at(OPERATOR)?)
        }
        (V::String(a) | V::UntypedAtomic(a), V::String(b) | V::UntypedAtomic(b)) => Some(a.cmp(b)),
        (V::Boolean(a), V::Boolean(b)) => Some(a.cmp(b)),
        (a, b) => {
            return Err(RuntimeError::dynamic(
                ErrorCode::XPTY0004,
                OPERATOR,
                format!("cannot compare {} with {}", a.atomic_type(), b.atomic_type()),
            ))
        }
    };
    Ok(comparator.test(ordering))
}

fn general_pair(lhs: &AtomicValue, rhs: &AtomicValue, comparator: Comparator) -> RuntimeResult<bool> {
    let lhs = lhs.cast_untyped_like(rhs).at(OPERATOR)?;
    let rhs = rhs.cast_untyped_like(&lhs).at(OPERATOR)?;
    compare_atomic(&lhs, &rhs, comparator)
}

/// Evaluates a comparison to a boolean.
#[derive(Debug)]
pub struct CompareOp {
    scalar: ScalarState,
    kind: ComparisonKind,
    comparator: Comparator,
    lhs: Box<Iter>,
    rhs: Box<Iter>,
}

impl CompareOp {
    /// Creates a comparison.
    pub fn new(
        alloc: &mut RegisterAllocator,
        kind: ComparisonKind,
        comparator: Comparator,
        lhs: Iter,
        rhs: Iter,
    ) -> Self {
        Self {
            scalar: ScalarState::new(alloc),
            kind,
            comparator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    fn compute(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        let lhs = self.lhs.evaluate_eagerly(frame)?;
        let rhs = self.rhs.evaluate_eagerly(frame)?;
        match self.kind {
            ComparisonKind::Value => {
                let lhs = lhs.atomize_optional().at(OPERATOR)?;
                let rhs = rhs.atomize_optional().at(OPERATOR)?;
                let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
                    return Ok(Sequence::empty());
                };
                let result = compare_atomic(&lhs, &rhs, self.comparator)?;
                Ok(Sequence::singleton(Item::boolean(result)))
            }
            ComparisonKind::General => {
                let lhs = lhs.atomize();
                let rhs = rhs.atomize();
                for a in &lhs {
                    for b in &rhs {
                        if general_pair(a, b, self.comparator)? {
                            return Ok(Sequence::singleton(Item::boolean(true)));
                        }
                    }
                }
                Ok(Sequence::singleton(Item::boolean(false)))
            }
        }
    }
}

scalar_iterator!(CompareOp, "Compare");
