//! Operator lifecycle state and the frame-resident operator base.

use xqrt_core::{Item, Sequence};

use crate::frame::Frame;
use crate::register::{LocalRegister, RegisterAllocator};

/// The state of an operator within one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatorState {
    /// Operator has not been opened yet.
    #[default]
    Created,
    /// Operator is open and ready to produce items.
    Open,
    /// Operator has returned its last item.
    Finished,
    /// Operator has been closed.
    Closed,
}

impl OperatorState {
    /// Returns true if the operator is open.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if the operator has finished.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Returns true if the operator is closed.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Base implementation for operators.
///
/// The lifecycle state lives in a frame register reserved at construction,
/// so the operator node itself stays immutable. A register nobody has
/// written yet reads as [`OperatorState::Created`].
#[derive(Debug, Clone, Copy)]
pub struct OperatorBase {
    state: LocalRegister<OperatorState>,
}

impl OperatorBase {
    /// Reserves the state register.
    pub fn new(alloc: &mut RegisterAllocator) -> Self {
        Self { state: LocalRegister::new(alloc.allocate_one()) }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self, frame: &Frame<'_>) -> OperatorState {
        self.state.load(frame).unwrap_or_default()
    }

    /// Returns true if the operator is open.
    #[must_use]
    pub fn is_open(&self, frame: &Frame<'_>) -> bool {
        self.state(frame).is_open()
    }

    /// Returns true if the operator is already closed.
    #[must_use]
    pub fn is_closed(&self, frame: &Frame<'_>) -> bool {
        self.state(frame).is_closed()
    }

    /// Marks the start of `open`.
    ///
    /// Operators that open children call this first. An open that fails
    /// part way leaves the state off [`OperatorState::Closed`], so the
    /// following `close` still tears down whatever was opened.
    pub fn begin_open(&self, frame: &mut Frame<'_>) {
        self.state.set(frame, OperatorState::Created);
    }

    /// Sets the state to open.
    pub fn set_open(&self, frame: &mut Frame<'_>) {
        self.state.set(frame, OperatorState::Open);
    }

    /// Sets the state to finished.
    pub fn set_finished(&self, frame: &mut Frame<'_>) {
        self.state.set(frame, OperatorState::Finished);
    }

    /// Sets the state to closed.
    pub fn set_closed(&self, frame: &mut Frame<'_>) {
        self.state.set(frame, OperatorState::Closed);
    }
}

/// A buffered result with a read cursor, both held in frame registers.
///
/// Blocking operators compute their whole result on the first `next` and
/// hand it out one item at a time.
#[derive(Debug, Clone, Copy)]
pub struct ResultBuffer {
    items: LocalRegister<Sequence>,
    cursor: LocalRegister<usize>,
}

impl ResultBuffer {
    /// Reserves the buffer and cursor registers.
    pub fn new(alloc: &mut RegisterAllocator) -> Self {
        let range = alloc.allocate(2);
        Self { items: LocalRegister::new(range.slot(0)), cursor: LocalRegister::new(range.slot(1)) }
    }

    /// Returns true if a result has been stored.
    #[must_use]
    pub fn is_filled(&self, frame: &Frame<'_>) -> bool {
        self.items.get(frame).is_some()
    }

    /// Stores a result and rewinds the cursor.
    pub fn fill(&self, frame: &mut Frame<'_>, items: Sequence) {
        self.items.set(frame, items);
        self.cursor.set(frame, 0);
    }

    /// Returns the item under the cursor and advances it.
    pub fn next_item(&self, frame: &mut Frame<'_>) -> Option<Item> {
        let position = self.cursor.load(frame).unwrap_or(0);
        let item = self.items.get(frame)?.get(position).cloned()?;
        self.cursor.set(frame, position + 1);
        Some(item)
    }

    /// Releases the buffered result.
    pub fn clear(&self, frame: &mut Frame<'_>) {
        self.items.clear(frame);
        self.cursor.clear(frame);
    }
}
