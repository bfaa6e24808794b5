//! Conditionals and boolean connectives.

use serde::{Deserialize, Serialize};
use xqrt_core::{Item, Sequence};

use super::Iter;
use crate::error::{CoreResultExt, RuntimeResult};
use crate::frame::Frame;
use crate::iter::{scalar_iterator, OperatorBase, OperatorState, RuntimeIterator, ScalarState};
use crate::register::{LocalRegister, RegisterAllocator};

/// Computes the effective boolean value of an expression.
pub(crate) fn effective_boolean_value(
    iter: &Iter,
    frame: &mut Frame<'_>,
    operator: &'static str,
) -> RuntimeResult<bool> {
    iter.evaluate_eagerly(frame)?.effective_boolean_value().at(operator)
}

/// `if (condition) then a else b`.
///
/// The condition is evaluated when the operator opens; only the chosen
/// branch is opened.
#[derive(Debug)]
pub struct IfOp {
    base: OperatorBase,
    condition: Box<Iter>,
    then_branch: Box<Iter>,
    else_branch: Box<Iter>,
    /// `true` while the then-branch is the open branch.
    chosen: LocalRegister<bool>,
}

impl IfOp {
    /// Creates a conditional.
    pub fn new(
        alloc: &mut RegisterAllocator,
        condition: Iter,
        then_branch: Iter,
        else_branch: Iter,
    ) -> Self {
        Self {
            base: OperatorBase::new(alloc),
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            chosen: LocalRegister::new(alloc.allocate_one()),
        }
    }

    fn branch(&self, then: bool) -> &Iter {
        if then {
            &self.then_branch
        } else {
            &self.else_branch
        }
    }
}

impl RuntimeIterator for IfOp {
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()> {
        self.base.begin_open(frame);
        let then = effective_boolean_value(&self.condition, frame, "If")?;
        self.chosen.set(frame, then);
        self.branch(then).open(frame)?;
        self.base.set_open(frame);
        Ok(())
    }

    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<Option<Item>> {
        if !self.base.is_open(frame) {
            return Ok(None);
        }
        let Some(then) = self.chosen.load(frame) else {
            return Ok(None);
        };
        let item = self.branch(then).next(frame)?;
        if item.is_none() {
            self.base.set_finished(frame);
        }
        Ok(item)
    }

    fn close(&self, frame: &mut Frame<'_>) {
        if self.base.is_closed(frame) {
            return;
        }
        if let Some(then) = self.chosen.take(frame) {
            self.branch(then).close(frame);
        }
        self.base.set_closed(frame);
    }

    fn evaluate_eagerly(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        let then = effective_boolean_value(&self.condition, frame, "If")?;
        self.branch(then).evaluate_eagerly(frame)
    }

    fn state(&self, frame: &Frame<'_>) -> OperatorState {
        self.base.state(frame)
    }

    fn name(&self) -> &'static str {
        "If"
    }
}

/// A boolean connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOperator {
    /// `and`
    And,
    /// `or`
    Or,
}

/// `a and b` / `a or b` over effective boolean values.
///
/// The right operand is not evaluated when the left one decides the result.
#[derive(Debug)]
pub struct LogicOp {
    scalar: ScalarState,
    operator: LogicOperator,
    lhs: Box<Iter>,
    rhs: Box<Iter>,
}

impl LogicOp {
    /// Creates a connective.
    pub fn new(alloc: &mut RegisterAllocator, operator: LogicOperator, lhs: Iter, rhs: Iter) -> Self {
        Self { scalar: ScalarState::new(alloc), operator, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    fn compute(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        let lhs = effective_boolean_value(&self.lhs, frame, "Logic")?;
        let result = match (self.operator, lhs) {
            (LogicOperator::And, false) => false,
            (LogicOperator::Or, true) => true,
            _ => effective_boolean_value(&self.rhs, frame, "Logic")?,
        };
        Ok(Sequence::singleton(Item::boolean(result)))
    }
}

scalar_iterator!(LogicOp, "Logic");
