//! Constant and range producers.

use xqrt_core::{AtomicValue, ErrorCode, Item, Sequence};

use super::Iter;
use crate::error::{CoreResultExt, RuntimeError, RuntimeResult};
use crate::frame::Frame;
use crate::iter::{scalar_iterator, OperatorBase, OperatorState, RuntimeIterator, ScalarState};
use crate::register::{LocalRegister, RegisterAllocator};

/// Yields a constant sequence.
#[derive(Debug)]
pub struct LiteralOp {
    scalar: ScalarState,
    value: Sequence,
}

impl LiteralOp {
    /// Creates a literal operator.
    pub fn new(alloc: &mut RegisterAllocator, value: Sequence) -> Self {
        Self { scalar: ScalarState::new(alloc), value }
    }

    /// Returns the constant.
    #[must_use]
    pub fn value(&self) -> &Sequence {
        &self.value
    }

    #[allow(clippy::unnecessary_wraps)]
    fn compute(&self, _frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        Ok(self.value.clone())
    }
}

scalar_iterator!(LiteralOp, "Literal");

/// Yields the integers `lo` to `hi` inclusive, one at a time.
///
/// The result is empty if either bound is empty or `lo > hi`.
#[derive(Debug)]
pub struct RangeOp {
    base: OperatorBase,
    low: Box<Iter>,
    high: Box<Iter>,
    current: LocalRegister<i64>,
    end: LocalRegister<i64>,
}

impl RangeOp {
    /// Creates a range operator.
    pub fn new(alloc: &mut RegisterAllocator, low: Iter, high: Iter) -> Self {
        let base = OperatorBase::new(alloc);
        let cells = alloc.allocate(2);
        Self {
            base,
            low: Box::new(low),
            high: Box::new(high),
            current: LocalRegister::new(cells.slot(0)),
            end: LocalRegister::new(cells.slot(1)),
        }
    }

    fn bound(&self, iter: &Iter, frame: &mut Frame<'_>) -> RuntimeResult<Option<i64>> {
        let value = iter.evaluate_eagerly(frame)?.atomize_optional().at("Range")?;
        match value {
            None => Ok(None),
            Some(AtomicValue::Integer(i)) => Ok(Some(i)),
            Some(AtomicValue::UntypedAtomic(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| {
                RuntimeError::dynamic(
                    ErrorCode::FORG0001,
                    "Range",
                    format!("cannot cast \"{s}\" to xs:integer"),
                )
            }),
            Some(other) => Err(RuntimeError::dynamic(
                ErrorCode::XPTY0004,
                "Range",
                format!("range bound must be xs:integer, got {}", other.atomic_type()),
            )),
        }
    }
}

impl RuntimeIterator for RangeOp {
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()> {
        let low = self.bound(&self.low, frame)?;
        let high = self.bound(&self.high, frame)?;
        match (low, high) {
            (Some(low), Some(high)) if low <= high => {
                self.current.set(frame, low);
                self.end.set(frame, high);
                self.base.set_open(frame);
            }
            _ => self.base.set_finished(frame),
        }
        Ok(())
    }

    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<Option<Item>> {
        if !self.base.is_open(frame) {
            return Ok(None);
        }
        let (Some(current), Some(end)) = (self.current.load(frame), self.end.load(frame)) else {
            self.base.set_finished(frame);
            return Ok(None);
        };
        if current >= end {
            self.base.set_finished(frame);
        } else {
            self.current.set(frame, current + 1);
        }
        Ok(Some(Item::integer(current)))
    }

    fn close(&self, frame: &mut Frame<'_>) {
        if self.base.is_closed(frame) {
            return;
        }
        self.current.clear(frame);
        self.end.clear(frame);
        self.base.set_closed(frame);
    }

    fn state(&self, frame: &Frame<'_>) -> OperatorState {
        self.base.state(frame)
    }

    fn name(&self) -> &'static str {
        "Range"
    }
}
