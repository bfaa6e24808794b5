//! Plan operators.
//!
//! Item producers are gathered in the closed [`Iter`] enum and tuple
//! producers in [`TupleIter`]. Both dispatch statically to the concrete
//! operator types.

mod arith;
mod call;
mod compare;
mod concat;
mod conditional;
mod flwor;
mod literal;
mod path;
mod register;
mod tuple;
mod typeswitch;

pub use arith::{ArithmeticOp, ArithmeticOperator, NegateOp};
pub use call::{CallOp, UserCallOp, UserFunction};
pub use compare::{compare_atomic, CompareOp, Comparator, ComparisonKind};
pub use concat::ConcatOp;
pub use conditional::{IfOp, LogicOp, LogicOperator};
pub use flwor::FlworOp;
pub use literal::{LiteralOp, RangeOp};
pub use path::{Axis, NodeTest, PathOp};
pub use register::{GlobalVarOp, LocalVarOp};
pub use tuple::{CountOp, ForOp, LetOp, UnitOp, WhereOp};
pub use typeswitch::{CaseClause, DefaultClause, TypeswitchOp};

use xqrt_core::{Item, Sequence};

use crate::error::RuntimeResult;
use crate::frame::Frame;
use crate::iter::{OperatorState, RuntimeIterator, TupleIterator};

/// An item-producing operator.
#[derive(Debug)]
pub enum Iter {
    /// A constant sequence.
    Literal(LiteralOp),
    /// `a to b`.
    Range(RangeOp),
    /// A local variable read.
    LocalVar(LocalVarOp),
    /// An external variable read.
    GlobalVar(GlobalVarOp),
    /// `(a, b, ...)`.
    Concat(ConcatOp),
    /// Binary arithmetic.
    Arithmetic(ArithmeticOp),
    /// Unary minus.
    Negate(NegateOp),
    /// Value and general comparisons.
    Compare(CompareOp),
    /// `and` / `or`.
    Logic(LogicOp),
    /// `if (c) then a else b`.
    If(IfOp),
    /// `typeswitch`.
    Typeswitch(TypeswitchOp),
    /// A FLWOR expression.
    Flwor(FlworOp),
    /// A path step.
    Path(PathOp),
    /// A library function call.
    Call(CallOp),
    /// A user-defined function call.
    UserCall(UserCallOp),
}

macro_rules! dispatch {
    ($self:ident, $op:ident => $body:expr) => {
        match $self {
            Iter::Literal($op) => $body,
            Iter::Range($op) => $body,
            Iter::LocalVar($op) => $body,
            Iter::GlobalVar($op) => $body,
            Iter::Concat($op) => $body,
            Iter::Arithmetic($op) => $body,
            Iter::Negate($op) => $body,
            Iter::Compare($op) => $body,
            Iter::Logic($op) => $body,
            Iter::If($op) => $body,
            Iter::Typeswitch($op) => $body,
            Iter::Flwor($op) => $body,
            Iter::Path($op) => $body,
            Iter::Call($op) => $body,
            Iter::UserCall($op) => $body,
        }
    };
}

impl RuntimeIterator for Iter {
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()> {
        dispatch!(self, op => op.open(frame))
    }

    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<Option<Item>> {
        dispatch!(self, op => op.next(frame))
    }

    fn close(&self, frame: &mut Frame<'_>) {
        dispatch!(self, op => op.close(frame));
    }

    fn evaluate_eagerly(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        dispatch!(self, op => op.evaluate_eagerly(frame))
    }

    fn state(&self, frame: &Frame<'_>) -> OperatorState {
        dispatch!(self, op => op.state(frame))
    }

    fn name(&self) -> &'static str {
        dispatch!(self, op => op.name())
    }
}

/// A tuple-producing FLWOR clause.
#[derive(Debug)]
pub enum TupleIter {
    /// The single empty tuple at the head of a clause chain.
    Unit(UnitOp),
    /// `for $x at $i in expr`.
    For(ForOp),
    /// `let $x := expr`.
    Let(LetOp),
    /// `where expr`.
    Where(WhereOp),
    /// `count $n`.
    Count(CountOp),
}

macro_rules! dispatch_tuple {
    ($self:ident, $op:ident => $body:expr) => {
        match $self {
            TupleIter::Unit($op) => $body,
            TupleIter::For($op) => $body,
            TupleIter::Let($op) => $body,
            TupleIter::Where($op) => $body,
            TupleIter::Count($op) => $body,
        }
    };
}

impl TupleIterator for TupleIter {
    fn open(&self, frame: &mut Frame<'_>) -> RuntimeResult<()> {
        dispatch_tuple!(self, op => op.open(frame))
    }

    fn next(&self, frame: &mut Frame<'_>) -> RuntimeResult<bool> {
        dispatch_tuple!(self, op => op.next(frame))
    }

    fn close(&self, frame: &mut Frame<'_>) {
        dispatch_tuple!(self, op => op.close(frame));
    }

    fn state(&self, frame: &Frame<'_>) -> OperatorState {
        dispatch_tuple!(self, op => op.state(frame))
    }

    fn name(&self) -> &'static str {
        dispatch_tuple!(self, op => op.name())
    }
}

macro_rules! impl_from {
    ($enum:ident { $($variant:ident($ty:ty)),* $(,)? }) => {
        $(
            impl From<$ty> for $enum {
                fn from(op: $ty) -> Self {
                    Self::$variant(op)
                }
            }
        )*
    };
}

impl_from!(Iter {
    Literal(LiteralOp),
    Range(RangeOp),
    LocalVar(LocalVarOp),
    GlobalVar(GlobalVarOp),
    Concat(ConcatOp),
    Arithmetic(ArithmeticOp),
    Negate(NegateOp),
    Compare(CompareOp),
    Logic(LogicOp),
    If(IfOp),
    Typeswitch(TypeswitchOp),
    Flwor(FlworOp),
    Path(PathOp),
    Call(CallOp),
    UserCall(UserCallOp),
});

impl_from!(TupleIter {
    Unit(UnitOp),
    For(ForOp),
    Let(LetOp),
    Where(WhereOp),
    Count(CountOp),
});
