//! Tuple iterators: the clauses of a FLWOR expression.
//!
//! A clause chain starts at [`UnitOp`] and every clause pulls from the one
//! before it. Each successful `next` leaves the clause's variables bound in
//! the frame; nothing else is passed downstream.

use xqrt_core::{Item, Sequence};

use super::conditional::effective_boolean_value;
use super::{Iter, TupleIter};
use crate::error::RuntimeResult;
use crate::frame::Frame;
use crate::iter::{materialize, OperatorBase, OperatorState, RuntimeIterator, TupleIterator};
use crate::register::{LocalRegister, RegisterAllocator};

/// Produces exactly one empty tuple.
#[derive(Debug)]
pub struct UnitOp {
    base: OperatorBase,
    emitted: LocalRegister<bool>,
}

impl UnitOp {
    /// Creates the root of a clause chain.
    pub fn new(alloc: &mut RegisterAllocator) -> Self {
        Self { base: OperatorBase::new(alloc), emitted: LocalRegister::new(alloc.allocate_one()) }
    }
}

impl TupleIterator for UnitOp {
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()> {
        self.emitted.set(frame, false);
        self.base.set_open(frame);
        Ok(())
    }

    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<bool> {
        if !self.base.is_open(frame) {
            return Ok(false);
        }
        if self.emitted.load(frame).unwrap_or(false) {
            self.base.set_finished(frame);
            return Ok(false);
        }
        self.emitted.set(frame, true);
        Ok(true)
    }

    fn close(&self, frame: &mut Frame<'_>) {
        if self.base.is_closed(frame) {
            return;
        }
        self.emitted.clear(frame);
        self.base.set_closed(frame);
    }

    fn state(&self, frame: &Frame<'_>) -> OperatorState {
        self.base.state(frame)
    }

    fn name(&self) -> &'static str {
        "Unit"
    }
}

/// `for $x at $i in expr`.
///
/// For each upstream tuple the binding expression is opened and pulled
/// lazily; every item produces one tuple with `$x` bound to that item and
/// `$i` to its 1-based position.
#[derive(Debug)]
pub struct ForOp {
    base: OperatorBase,
    upstream: Box<TupleIter>,
    binding: Iter,
    variable: LocalRegister<Sequence>,
    position: Option<LocalRegister<Sequence>>,
    counter: LocalRegister<usize>,
    binding_open: LocalRegister<bool>,
}

impl ForOp {
    /// Creates a `for` clause.
    pub fn new(
        alloc: &mut RegisterAllocator,
        upstream: TupleIter,
        binding: Iter,
        variable: LocalRegister<Sequence>,
        position: Option<LocalRegister<Sequence>>,
    ) -> Self {
        let base = OperatorBase::new(alloc);
        let cells = alloc.allocate(2);
        Self {
            base,
            upstream: Box::new(upstream),
            binding,
            variable,
            position,
            counter: LocalRegister::new(cells.slot(0)),
            binding_open: LocalRegister::new(cells.slot(1)),
        }
    }
}

impl TupleIterator for ForOp {
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()> {
        self.base.begin_open(frame);
        self.upstream.open(frame)?;
        self.binding_open.set(frame, false);
        self.base.set_open(frame);
        Ok(())
    }

    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<bool> {
        if !self.base.is_open(frame) {
            return Ok(false);
        }
        loop {
            if self.binding_open.load(frame).unwrap_or(false) {
                if let Some(item) = self.binding.next(frame)? {
                    let position = self.counter.load(frame).unwrap_or(0) + 1;
                    self.counter.set(frame, position);
                    self.variable.set(frame, Sequence::singleton(item));
                    if let Some(register) = self.position {
                        #[allow(clippy::cast_possible_wrap)]
                        let position = Item::integer(position as i64);
                        register.set(frame, Sequence::singleton(position));
                    }
                    return Ok(true);
                }
                self.binding.close(frame);
                self.binding_open.set(frame, false);
            }
            if !self.upstream.next(frame)? {
                self.base.set_finished(frame);
                return Ok(false);
            }
            self.counter.set(frame, 0);
            self.binding_open.set(frame, true);
            self.binding.open(frame)?;
        }
    }

    fn close(&self, frame: &mut Frame<'_>) {
        if self.base.is_closed(frame) {
            return;
        }
        if self.binding_open.take(frame).unwrap_or(false) {
            self.binding.close(frame);
        }
        self.upstream.close(frame);
        self.variable.clear(frame);
        if let Some(register) = self.position {
            register.clear(frame);
        }
        self.counter.clear(frame);
        self.base.set_closed(frame);
    }

    fn state(&self, frame: &Frame<'_>) -> OperatorState {
        self.base.state(frame)
    }

    fn name(&self) -> &'static str {
        "For"
    }
}

/// `let $x := expr`.
///
/// For each upstream tuple the binding expression is materialized and the
/// whole sequence is written to `$x`. Downstream reads of `$x` never
/// re-evaluate the expression.
#[derive(Debug)]
pub struct LetOp {
    base: OperatorBase,
    upstream: Box<TupleIter>,
    binding: Iter,
    variable: LocalRegister<Sequence>,
}

impl LetOp {
    /// Creates a `let` clause.
    pub fn new(
        alloc: &mut RegisterAllocator,
        upstream: TupleIter,
        binding: Iter,
        variable: LocalRegister<Sequence>,
    ) -> Self {
        Self { base: OperatorBase::new(alloc), upstream: Box::new(upstream), binding, variable }
    }
}

impl TupleIterator for LetOp {
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()> {
        self.base.begin_open(frame);
        self.upstream.open(frame)?;
        self.base.set_open(frame);
        Ok(())
    }

    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<bool> {
        if !self.base.is_open(frame) {
            return Ok(false);
        }
        if !self.upstream.next(frame)? {
            self.base.set_finished(frame);
            return Ok(false);
        }
        let value = materialize(&self.binding, frame)?;
        self.variable.set(frame, value);
        Ok(true)
    }

    fn close(&self, frame: &mut Frame<'_>) {
        if self.base.is_closed(frame) {
            return;
        }
        self.binding.close(frame);
        self.upstream.close(frame);
        self.variable.clear(frame);
        self.base.set_closed(frame);
    }

    fn state(&self, frame: &Frame<'_>) -> OperatorState {
        self.base.state(frame)
    }

    fn name(&self) -> &'static str {
        "Let"
    }
}

/// `where condition`: passes tuples whose condition is true.
#[derive(Debug)]
pub struct WhereOp {
    base: OperatorBase,
    upstream: Box<TupleIter>,
    condition: Iter,
}

impl WhereOp {
    /// Creates a `where` clause.
    pub fn new(alloc: &mut RegisterAllocator, upstream: TupleIter, condition: Iter) -> Self {
        Self { base: OperatorBase::new(alloc), upstream: Box::new(upstream), condition }
    }
}

impl TupleIterator for WhereOp {
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()> {
        self.base.begin_open(frame);
        self.upstream.open(frame)?;
        self.base.set_open(frame);
        Ok(())
    }

    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<bool> {
        if !self.base.is_open(frame) {
            return Ok(false);
        }
        while self.upstream.next(frame)? {
            if effective_boolean_value(&self.condition, frame, "Where")? {
                return Ok(true);
            }
        }
        self.base.set_finished(frame);
        Ok(false)
    }

    fn close(&self, frame: &mut Frame<'_>) {
        if self.base.is_closed(frame) {
            return;
        }
        self.upstream.close(frame);
        self.base.set_closed(frame);
    }

    fn state(&self, frame: &Frame<'_>) -> OperatorState {
        self.base.state(frame)
    }

    fn name(&self) -> &'static str {
        "Where"
    }
}

/// `count $n`: binds the 1-based ordinal of each tuple that reaches it.
#[derive(Debug)]
pub struct CountOp {
    base: OperatorBase,
    upstream: Box<TupleIter>,
    variable: LocalRegister<Sequence>,
    counter: LocalRegister<i64>,
}

impl CountOp {
    /// Creates a `count` clause.
    pub fn new(
        alloc: &mut RegisterAllocator,
        upstream: TupleIter,
        variable: LocalRegister<Sequence>,
    ) -> Self {
        Self {
            base: OperatorBase::new(alloc),
            upstream: Box::new(upstream),
            variable,
            counter: LocalRegister::new(alloc.allocate_one()),
        }
    }
}

impl TupleIterator for CountOp {
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()> {
        self.base.begin_open(frame);
        self.upstream.open(frame)?;
        self.counter.set(frame, 0);
        self.base.set_open(frame);
        Ok(())
    }

    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<bool> {
        if !self.base.is_open(frame) {
            return Ok(false);
        }
        if !self.upstream.next(frame)? {
            self.base.set_finished(frame);
            return Ok(false);
        }
        let count = self.counter.load(frame).unwrap_or(0) + 1;
        self.counter.set(frame, count);
        self.variable.set(frame, Sequence::singleton(Item::integer(count)));
        Ok(true)
    }

    fn close(&self, frame: &mut Frame<'_>) {
        if self.base.is_closed(frame) {
            return;
        }
        self.upstream.close(frame);
        self.counter.clear(frame);
        self.variable.clear(frame);
        self.base.set_closed(frame);
    }

    fn state(&self, frame: &Frame<'_>) -> OperatorState {
        self.base.state(frame)
    }

    fn name(&self) -> &'static str {
        "Count"
    }
}
