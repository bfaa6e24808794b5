//! The iterator protocol.
//!
//! Every operator in a compiled plan implements [`RuntimeIterator`] (item
//! producers) or [`TupleIterator`] (variable-binding producers inside FLWOR
//! expressions). Operators are immutable and shared; everything that changes
//! while a plan runs lives in the [`Frame`] passed to each call.
//!
//! # Lifecycle
//!
//! 1. **Created**: nothing written to the operator's registers yet
//! 2. **Open**: after `open()`; ready to produce items
//! 3. **Finished**: after `next()` returned `None`; stays exhausted
//! 4. **Closed**: after `close()`; buffers released
//!
//! `close` never fails and may be called without `open` or more than once.
//! An iterator can be opened again after it was closed.

mod materialize;
mod state;

pub use materialize::{drain, materialize};
pub use state::{OperatorBase, OperatorState, ResultBuffer};

use xqrt_core::{Item, Sequence};

use crate::error::RuntimeResult;
use crate::frame::Frame;

/// The pull-iterator trait for plan evaluation.
pub trait RuntimeIterator: Send + Sync {
    /// Opens the iterator and resets its cursor state.
    ///
    /// Errors leave the iterator not open; `close` remains safe.
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()>;

    /// Returns the next item, or `None` once the iterator is exhausted.
    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<Option<Item>>;

    /// Closes the iterator and any open children.
    fn close(&self, frame: &mut Frame<'_>);

    /// Computes the whole result in one call.
    ///
    /// The default opens, materializes, and closes the iterator.
    fn evaluate_eagerly(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        materialize(self, frame)
    }

    /// Returns the iterator's state in `frame`.
    fn state(&self, frame: &Frame<'_>) -> OperatorState;

    /// Returns the name of this operator type.
    fn name(&self) -> &'static str;
}

/// The iterator trait for FLWOR tuple streams.
///
/// Tuple iterators produce no items. Each successful `next` leaves a new
/// binding in the frame's variable registers for downstream operators.
pub trait TupleIterator: Send + Sync {
    /// Opens the iterator.
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()>;

    /// Advances to the next tuple. Returns `false` once exhausted.
    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<bool>;

    /// Closes the iterator and its upstream.
    fn close(&self, frame: &mut Frame<'_>);

    /// Returns the iterator's state in `frame`.
    fn state(&self, frame: &Frame<'_>) -> OperatorState;

    /// Returns the name of this operator type.
    fn name(&self) -> &'static str;
}

/// Shared state for operators that compute their whole result at once.
#[derive(Debug, Clone, Copy)]
pub struct ScalarState {
    base: OperatorBase,
    buffer: ResultBuffer,
}

impl ScalarState {
    /// Reserves the state and buffer registers.
    pub fn new(alloc: &mut crate::register::RegisterAllocator) -> Self {
        Self { base: OperatorBase::new(alloc), buffer: ResultBuffer::new(alloc) }
    }

    /// Opens the operator and drops any earlier result.
    pub fn open(&self, frame: &mut Frame<'_>) {
        self.buffer.clear(frame);
        self.base.set_open(frame);
    }

    /// Returns the next buffered item, computing the result on first use.
    pub fn next<'p>(
        &self,
        frame: &mut Frame<'p>,
        compute: impl FnOnce(&mut Frame<'p>) -> RuntimeResult<Sequence>,
    ) -> RuntimeResult<Option<Item>> {
        if !self.base.is_open(frame) {
            return Ok(None);
        }
        if !self.buffer.is_filled(frame) {
            let result = compute(frame)?;
            self.buffer.fill(frame, result);
        }
        match self.buffer.next_item(frame) {
            Some(item) => Ok(Some(item)),
            None => {
                self.buffer.clear(frame);
                self.base.set_finished(frame);
                Ok(None)
            }
        }
    }

    /// Releases the buffered result.
    pub fn close(&self, frame: &mut Frame<'_>) {
        if self.base.is_closed(frame) {
            return;
        }
        self.buffer.clear(frame);
        self.base.set_closed(frame);
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self, frame: &Frame<'_>) -> OperatorState {
        self.base.state(frame)
    }
}

/// Implements [`RuntimeIterator`] for an operator with a `scalar:
/// ScalarState` field and a `compute` method.
macro_rules! scalar_iterator {
    ($ty:ty, $name:literal) => {
        impl $crate::iter::RuntimeIterator for $ty {
            fn open(&self, frame: &mut $crate::Frame<'_>) -> $crate::RuntimeResult<()> {
                self.scalar.open(frame);
                Ok(())
            }

            fn next(
                &self,
                frame: &mut $crate::Frame<'_>,
            ) -> $crate::RuntimeResult<Option<xqrt_core::Item>> {
                self.scalar.next(frame, |frame| self.compute(frame))
            }

            fn close(&self, frame: &mut $crate::Frame<'_>) {
                self.scalar.close(frame);
            }

            fn evaluate_eagerly(
                &self,
                frame: &mut $crate::Frame<'_>,
            ) -> $crate::RuntimeResult<xqrt_core::Sequence> {
                self.compute(frame)
            }

            fn state(&self, frame: &$crate::Frame<'_>) -> $crate::iter::OperatorState {
                self.scalar.state(frame)
            }

            fn name(&self) -> &'static str {
                $name
            }
        }
    };
}

pub(crate) use scalar_iterator;
