//! Typeswitch.

use xqrt_core::{Item, Sequence, SequenceType};

use super::Iter;
use crate::error::RuntimeResult;
use crate::frame::Frame;
use crate::iter::{OperatorBase, OperatorState, RuntimeIterator};
use crate::register::{LocalRegister, RegisterAllocator};

/// One `case` clause.
#[derive(Debug)]
pub struct CaseClause {
    sequence_type: SequenceType,
    variable: Option<LocalRegister<Sequence>>,
    body: Iter,
}

impl CaseClause {
    /// Creates a case clause. When `variable` is set, it receives the
    /// operand if this clause is chosen.
    #[must_use]
    pub fn new(
        sequence_type: SequenceType,
        variable: Option<LocalRegister<Sequence>>,
        body: Iter,
    ) -> Self {
        Self { sequence_type, variable, body }
    }

    /// Returns the declared type.
    #[must_use]
    pub fn sequence_type(&self) -> &SequenceType {
        &self.sequence_type
    }
}

/// The `default` clause.
#[derive(Debug)]
pub struct DefaultClause {
    variable: Option<LocalRegister<Sequence>>,
    body: Iter,
}

impl DefaultClause {
    /// Creates the default clause.
    #[must_use]
    pub fn new(variable: Option<LocalRegister<Sequence>>, body: Iter) -> Self {
        Self { variable, body }
    }
}

/// `typeswitch (operand) case ... default ...`.
///
/// The operand is evaluated once, when the operator opens. Case clauses are
/// tried in declaration order and the first one whose type matches wins,
/// even if a later clause names a more specific type. Only the chosen
/// clause's body is opened.
#[derive(Debug)]
pub struct TypeswitchOp {
    base: OperatorBase,
    operand: Box<Iter>,
    cases: Vec<CaseClause>,
    default: Box<DefaultClause>,
    /// Index of the chosen clause; `cases.len()` selects the default.
    chosen: LocalRegister<usize>,
}

impl TypeswitchOp {
    /// Creates a typeswitch.
    pub fn new(
        alloc: &mut RegisterAllocator,
        operand: Iter,
        cases: Vec<CaseClause>,
        default: DefaultClause,
    ) -> Self {
        Self {
            base: OperatorBase::new(alloc),
            operand: Box::new(operand),
            cases,
            default: Box::new(default),
            chosen: LocalRegister::new(alloc.allocate_one()),
        }
    }

    fn body(&self, index: usize) -> &Iter {
        self.cases.get(index).map_or(&self.default.body, |case| &case.body)
    }

    /// Evaluates the operand, binds the chosen clause's variable and
    /// returns the clause index.
    fn select(&self, frame: &mut Frame<'_>) -> RuntimeResult<usize> {
        let operand = self.operand.evaluate_eagerly(frame)?;
        let matched = self.cases.iter().position(|case| case.sequence_type.matches(&operand));
        let (index, variable) = match matched {
            Some(index) => (index, self.cases[index].variable),
            None => (self.cases.len(), self.default.variable),
        };
        if let Some(variable) = variable {
            variable.set(frame, operand);
        }
        Ok(index)
    }

    fn clear_variables(&self, frame: &mut Frame<'_>) {
        let variables = self.cases.iter().map(|case| case.variable).chain([self.default.variable]);
        for variable in variables.flatten() {
            variable.clear(frame);
        }
    }
}

impl RuntimeIterator for TypeswitchOp {
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()> {
        self.base.begin_open(frame);
        let index = self.select(frame)?;
        self.chosen.set(frame, index);
        self.body(index).open(frame)?;
        self.base.set_open(frame);
        Ok(())
    }

    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<Option<Item>> {
        if !self.base.is_open(frame) {
            return Ok(None);
        }
        let Some(index) = self.chosen.load(frame) else {
            return Ok(None);
        };
        let item = self.body(index).next(frame)?;
        if item.is_none() {
            self.base.set_finished(frame);
        }
        Ok(item)
    }

    fn close(&self, frame: &mut Frame<'_>) {
        if self.base.is_closed(frame) {
            return;
        }
        if let Some(index) = self.chosen.take(frame) {
            self.body(index).close(frame);
        }
        self.clear_variables(frame);
        self.base.set_closed(frame);
    }

    fn evaluate_eagerly(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        let index = self.select(frame)?;
        let result = self.body(index).evaluate_eagerly(frame);
        self.clear_variables(frame);
        result
    }

    fn state(&self, frame: &Frame<'_>) -> OperatorState {
        self.base.state(frame)
    }

    fn name(&self) -> &'static str {
        "Typeswitch"
    }
}
