//! FLWOR expressions.

use xqrt_core::Item;

use super::{Iter, TupleIter};
use crate::error::RuntimeResult;
use crate::frame::Frame;
use crate::iter::{OperatorBase, OperatorState, RuntimeIterator, TupleIterator};
use crate::register::{LocalRegister, RegisterAllocator};

/// A clause chain followed by `return expr`.
///
/// For every tuple the return expression is opened, pulled until it is
/// exhausted and closed again, so its items stream straight through.
#[derive(Debug)]
pub struct FlworOp {
    base: OperatorBase,
    clauses: Box<TupleIter>,
    ret: Box<Iter>,
    /// Whether the return expression is open for the current tuple.
    in_return: LocalRegister<bool>,
}

impl FlworOp {
    /// Creates a FLWOR expression.
    pub fn new(alloc: &mut RegisterAllocator, clauses: TupleIter, ret: Iter) -> Self {
        Self {
            base: OperatorBase::new(alloc),
            clauses: Box::new(clauses),
            ret: Box::new(ret),
            in_return: LocalRegister::new(alloc.allocate_one()),
        }
    }
}

impl RuntimeIterator for FlworOp {
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()> {
        self.base.begin_open(frame);
        self.clauses.open(frame)?;
        self.in_return.set(frame, false);
        self.base.set_open(frame);
        Ok(())
    }

    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<Option<Item>> {
        if !self.base.is_open(frame) {
            return Ok(None);
        }
        loop {
            if self.in_return.load(frame).unwrap_or(false) {
                if let Some(item) = self.ret.next(frame)? {
                    return Ok(Some(item));
                }
                self.ret.close(frame);
                self.in_return.set(frame, false);
            }
            if !self.clauses.next(frame)? {
                self.base.set_finished(frame);
                return Ok(None);
            }
            self.in_return.set(frame, true);
            self.ret.open(frame)?;
        }
    }

    fn close(&self, frame: &mut Frame<'_>) {
        if self.base.is_closed(frame) {
            return;
        }
        if self.in_return.take(frame).unwrap_or(false) {
            self.ret.close(frame);
        }
        self.clauses.close(frame);
        self.base.set_closed(frame);
    }

    fn state(&self, frame: &Frame<'_>) -> OperatorState {
        self.base.state(frame)
    }

    fn name(&self) -> &'static str {
        "Flwor"
    }
}
