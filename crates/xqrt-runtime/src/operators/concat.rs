//! Sequence concatenation.

use xqrt_core::Item;

use super::Iter;
use crate::error::RuntimeResult;
use crate::frame::Frame;
use crate::iter::{OperatorBase, OperatorState, RuntimeIterator};
use crate::register::{LocalRegister, RegisterAllocator};

/// Yields the items of each child in turn: `(a, b, c)`.
///
/// Only one child is open at a time.
#[derive(Debug)]
pub struct ConcatOp {
    base: OperatorBase,
    children: Vec<Iter>,
    /// Index of the current child.
    current: LocalRegister<usize>,
    /// Whether the current child is open.
    child_open: LocalRegister<bool>,
}

impl ConcatOp {
    /// Creates a concatenation of `children`.
    pub fn new(alloc: &mut RegisterAllocator, children: Vec<Iter>) -> Self {
        let base = OperatorBase::new(alloc);
        let cells = alloc.allocate(2);
        Self {
            base,
            children,
            current: LocalRegister::new(cells.slot(0)),
            child_open: LocalRegister::new(cells.slot(1)),
        }
    }
}

impl RuntimeIterator for ConcatOp {
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()> {
        self.current.set(frame, 0);
        self.child_open.set(frame, false);
        self.base.set_open(frame);
        Ok(())
    }

    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<Option<Item>> {
        if !self.base.is_open(frame) {
            return Ok(None);
        }
        loop {
            let index = self.current.load(frame).unwrap_or(0);
            let Some(child) = self.children.get(index) else {
                self.base.set_finished(frame);
                return Ok(None);
            };
            if !self.child_open.load(frame).unwrap_or(false) {
                self.child_open.set(frame, true);
                child.open(frame)?;
            }
            if let Some(item) = child.next(frame)? {
                return Ok(Some(item));
            }
            child.close(frame);
            self.child_open.set(frame, false);
            self.current.set(frame, index + 1);
        }
    }

    fn close(&self, frame: &mut Frame<'_>) {
        if self.base.is_closed(frame) {
            return;
        }
        if self.child_open.load(frame).unwrap_or(false) {
            if let Some(child) = self.current.load(frame).and_then(|i| self.children.get(i)) {
                child.close(frame);
            }
        }
        self.current.clear(frame);
        self.child_open.clear(frame);
        self.base.set_closed(frame);
    }

    fn state(&self, frame: &Frame<'_>) -> OperatorState {
        self.base.state(frame)
    }

    fn name(&self) -> &'static str {
        "Concat"
    }
}
