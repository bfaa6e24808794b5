//! The plan algebra.
//!
//! An external query compiler hands the runtime a [`Module`]: declared
//! external variables, user-defined functions and a body expression.
//! Variables are referenced by name here; the
//! [`PlanCompiler`](super::PlanCompiler) turns names into registers.

use serde::{Deserialize, Serialize};
use xqrt_core::{AtomicValue, SequenceType};

use crate::operators::{
    ArithmeticOperator, Axis, Comparator, ComparisonKind, LogicOperator, NodeTest,
};

/// An expression of the plan algebra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// A constant sequence of atomic values.
    Literal(Vec<AtomicValue>),
    /// A variable reference: FLWOR, typeswitch and parameter variables
    /// shadow external ones.
    Var(String),
    /// `(a, b, ...)`.
    Sequence(Vec<Expr>),
    /// `low to high`.
    Range {
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
    },
    /// Binary arithmetic.
    Arithmetic {
        /// The operator.
        op: ArithmeticOperator,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Unary minus.
    Negate(Box<Expr>),
    /// A value or general comparison.
    Compare {
        /// Value or general.
        kind: ComparisonKind,
        /// The comparator.
        op: Comparator,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// `and` / `or`.
    Logic {
        /// The operator.
        op: LogicOperator,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// `if (condition) then then_branch else else_branch`.
    If {
        /// The condition.
        condition: Box<Expr>,
        /// Evaluated when the condition is true.
        then_branch: Box<Expr>,
        /// Evaluated otherwise.
        else_branch: Box<Expr>,
    },
    /// `typeswitch (operand) case ... default ...`.
    Typeswitch {
        /// The operand.
        operand: Box<Expr>,
        /// Case clauses, tried in order.
        cases: Vec<TypeswitchCase>,
        /// The default clause.
        default: Box<TypeswitchDefault>,
    },
    /// A clause chain with a return expression.
    Flwor {
        /// Clauses in order.
        clauses: Vec<Clause>,
        /// The return expression.
        ret: Box<Expr>,
    },
    /// A path step.
    Path {
        /// The context expression.
        context: Box<Expr>,
        /// The axis.
        axis: Axis,
        /// The node test.
        test: NodeTest,
    },
    /// A function call, resolved against user-defined functions first and
    /// then the function registry.
    Call {
        /// The function name. Unprefixed names refer to `fn:`.
        name: String,
        /// The arguments.
        args: Vec<Expr>,
    },
}

/// A `case` clause of a typeswitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeswitchCase {
    /// Optional variable bound to the operand.
    pub var: Option<String>,
    /// The type to match.
    pub sequence_type: SequenceType,
    /// The clause body.
    pub body: Expr,
}

/// The `default` clause of a typeswitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeswitchDefault {
    /// Optional variable bound to the operand.
    pub var: Option<String>,
    /// The clause body.
    pub body: Expr,
}

/// A FLWOR clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    /// `for $var at $position in expr`.
    For {
        /// The bound variable.
        var: String,
        /// The optional positional variable.
        position: Option<String>,
        /// The binding expression.
        expr: Expr,
    },
    /// `let $var := expr`.
    Let {
        /// The bound variable.
        var: String,
        /// The binding expression.
        expr: Expr,
    },
    /// `where expr`.
    Where(Expr),
    /// `count $var`.
    Count {
        /// The bound variable.
        var: String,
    },
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// The parameter name.
    pub name: String,
    /// The declared type, if any.
    pub sequence_type: Option<SequenceType>,
}

impl Param {
    /// Creates an untyped parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), sequence_type: None }
    }

    /// Creates a typed parameter.
    #[must_use]
    pub fn typed(name: impl Into<String>, sequence_type: SequenceType) -> Self {
        Self { name: name.into(), sequence_type: Some(sequence_type) }
    }
}

/// `declare function name($params) as return_type { body }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// The function name.
    pub name: String,
    /// The parameters.
    pub params: Vec<Param>,
    /// The declared result type, if any.
    #[serde(default)]
    pub return_type: Option<SequenceType>,
    /// The body.
    pub body: Expr,
}

/// `declare variable $name as type external`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDecl {
    /// The variable name.
    pub name: String,
    /// The declared type, if any.
    #[serde(default)]
    pub sequence_type: Option<SequenceType>,
}

impl ExternalDecl {
    /// Creates an untyped declaration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), sequence_type: None }
    }

    /// Creates a typed declaration.
    #[must_use]
    pub fn typed(name: impl Into<String>, sequence_type: SequenceType) -> Self {
        Self { name: name.into(), sequence_type: Some(sequence_type) }
    }
}

/// A main module: prolog declarations and the query body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// User-defined functions.
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    /// External variables.
    #[serde(default)]
    pub externals: Vec<ExternalDecl>,
    /// The query body.
    pub body: Expr,
}

impl Module {
    /// Creates a module with only a body.
    #[must_use]
    pub fn new(body: Expr) -> Self {
        Self { functions: Vec::new(), externals: Vec::new(), body }
    }

    /// Adds a function declaration.
    #[must_use]
    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }

    /// Adds an external variable declaration.
    #[must_use]
    pub fn with_external(mut self, external: ExternalDecl) -> Self {
        self.externals.push(external);
        self
    }
}

impl Expr {
    /// The empty sequence.
    #[must_use]
    pub fn empty() -> Self {
        Self::Literal(Vec::new())
    }

    /// An integer literal.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::Literal(vec![AtomicValue::Integer(value)])
    }

    /// A double literal.
    #[must_use]
    pub fn double(value: f64) -> Self {
        Self::Literal(vec![AtomicValue::Double(value)])
    }

    /// A string literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(vec![AtomicValue::String(value.into())])
    }

    /// A boolean literal.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::Literal(vec![AtomicValue::Boolean(value)])
    }

    /// A variable reference.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    /// `(items...)`.
    #[must_use]
    pub fn sequence(items: Vec<Self>) -> Self {
        Self::Sequence(items)
    }

    /// A function call.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call { name: name.into(), args }
    }

    /// `if (condition) then then_branch else else_branch`.
    #[must_use]
    pub fn if_then_else(condition: Self, then_branch: Self, else_branch: Self) -> Self {
        Self::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    /// A FLWOR expression.
    #[must_use]
    pub fn flwor(clauses: Vec<Clause>, ret: Self) -> Self {
        Self::Flwor { clauses, ret: Box::new(ret) }
    }

    /// `self to high`.
    #[must_use]
    pub fn to(self, high: Self) -> Self {
        Self::Range { low: Box::new(self), high: Box::new(high) }
    }

    fn arithmetic(self, op: ArithmeticOperator, rhs: Self) -> Self {
        Self::Arithmetic { op, lhs: Box::new(self), rhs: Box::new(rhs) }
    }

    /// `self + rhs`.
    #[must_use]
    pub fn add(self, rhs: Self) -> Self {
        self.arithmetic(ArithmeticOperator::Add, rhs)
    }

    /// `self - rhs`.
    #[must_use]
    pub fn sub(self, rhs: Self) -> Self {
        self.arithmetic(ArithmeticOperator::Subtract, rhs)
    }

    /// `self * rhs`.
    #[must_use]
    pub fn mul(self, rhs: Self) -> Self {
        self.arithmetic(ArithmeticOperator::Multiply, rhs)
    }

    /// `self div rhs`.
    #[must_use]
    pub fn div(self, rhs: Self) -> Self {
        self.arithmetic(ArithmeticOperator::Divide, rhs)
    }

    /// `self idiv rhs`.
    #[must_use]
    pub fn idiv(self, rhs: Self) -> Self {
        self.arithmetic(ArithmeticOperator::IntegerDivide, rhs)
    }

    /// `self mod rhs`.
    #[must_use]
    pub fn modulo(self, rhs: Self) -> Self {
        self.arithmetic(ArithmeticOperator::Modulo, rhs)
    }

    /// `-self`.
    #[must_use]
    pub fn neg(self) -> Self {
        Self::Negate(Box::new(self))
    }

    /// A value comparison (`eq`, `lt`, ...).
    #[must_use]
    pub fn value_cmp(self, op: Comparator, rhs: Self) -> Self {
        Self::Compare { kind: ComparisonKind::Value, op, lhs: Box::new(self), rhs: Box::new(rhs) }
    }

    /// A general comparison (`=`, `<`, ...).
    #[must_use]
    pub fn general_cmp(self, op: Comparator, rhs: Self) -> Self {
        Self::Compare { kind: ComparisonKind::General, op, lhs: Box::new(self), rhs: Box::new(rhs) }
    }

    /// `self and rhs`.
    #[must_use]
    pub fn and(self, rhs: Self) -> Self {
        Self::Logic { op: LogicOperator::And, lhs: Box::new(self), rhs: Box::new(rhs) }
    }

    /// `self or rhs`.
    #[must_use]
    pub fn or(self, rhs: Self) -> Self {
        Self::Logic { op: LogicOperator::Or, lhs: Box::new(self), rhs: Box::new(rhs) }
    }

    /// `self/axis::test`.
    #[must_use]
    pub fn step(self, axis: Axis, test: NodeTest) -> Self {
        Self::Path { context: Box::new(self), axis, test }
    }

    /// `self/child::name`.
    #[must_use]
    pub fn child(self, name: impl Into<String>) -> Self {
        self.step(Axis::Child, NodeTest::Name(name.into()))
    }

    /// `self//name`.
    #[must_use]
    pub fn descendant(self, name: impl Into<String>) -> Self {
        self.step(Axis::Descendant, NodeTest::Name(name.into()))
    }
}

impl Clause {
    /// `for $var in expr`.
    #[must_use]
    pub fn for_in(var: impl Into<String>, expr: Expr) -> Self {
        Self::For { var: var.into(), position: None, expr }
    }

    /// `for $var at $position in expr`.
    #[must_use]
    pub fn for_at(var: impl Into<String>, position: impl Into<String>, expr: Expr) -> Self {
        Self::For { var: var.into(), position: Some(position.into()), expr }
    }

    /// `let $var := expr`.
    #[must_use]
    pub fn let_(var: impl Into<String>, expr: Expr) -> Self {
        Self::Let { var: var.into(), expr }
    }

    /// `where expr`.
    #[must_use]
    pub fn where_(expr: Expr) -> Self {
        Self::Where(expr)
    }

    /// `count $var`.
    #[must_use]
    pub fn count(var: impl Into<String>) -> Self {
        Self::Count { var: var.into() }
    }
}
