//! Arithmetic operators.
//!
//! Operands are atomized; an empty operand gives an empty result, untyped
//! operands are cast to `xs:double`, and mixed integer/double operands are
//! promoted to double. Integer arithmetic is checked: overflow raises
//! `FOAR0002` and integer division by zero raises `FOAR0001`. Double
//! arithmetic follows IEEE rules, except that `idiv` by zero is an error.

use std::fmt;

use serde::{Deserialize, Serialize};
use xqrt_core::{AtomicValue, ErrorCode, Item, Sequence};

use super::Iter;
use crate::error::{CoreResultExt, RuntimeError, RuntimeResult};
use crate::frame::Frame;
use crate::iter::{scalar_iterator, RuntimeIterator, ScalarState};
use crate::register::RegisterAllocator;

const OPERATOR: &str = "Arithmetic";

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `div`
    Divide,
    /// `idiv`
    IntegerDivide,
    /// `mod`
    Modulo,
}

impl ArithmeticOperator {
    /// Returns the operator's symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "div",
            Self::IntegerDivide => "idiv",
            Self::Modulo => "mod",
        }
    }

    /// Applies the operator to two atomic values.
    ///
    /// # Errors
    ///
    /// Returns `XPTY0004` for non-numeric operands, `FORG0001` for untyped
    /// values that are not numbers, `FOAR0001` for division by zero, and
    /// `FOAR0002` for integer overflow.
    pub fn apply(self, lhs: &AtomicValue, rhs: &AtomicValue) -> RuntimeResult<AtomicValue> {
        let lhs = numeric_operand(lhs)?;
        let rhs = numeric_operand(rhs)?;
        match (lhs, rhs) {
            (AtomicValue::Integer(a), AtomicValue::Integer(b)) => self.apply_integer(a, b),
            (a, b) => {
                let a = a.to_double().at(OPERATOR)?;
                let b = b.to_double().at(OPERATOR)?;
                self.apply_double(a, b)
            }
        }
    }

    fn apply_integer(self, a: i64, b: i64) -> RuntimeResult<AtomicValue> {
        let result = match self {
            Self::Add => a.checked_add(b),
            Self::Subtract => a.checked_sub(b),
            Self::Multiply => a.checked_mul(b),
            Self::Divide => {
                if b == 0 {
                    return Err(division_by_zero());
                }
                #[allow(clippy::cast_precision_loss)]
                let quotient = a as f64 / b as f64;
                return Ok(AtomicValue::Double(quotient));
            }
            Self::IntegerDivide => {
                if b == 0 {
                    return Err(division_by_zero());
                }
                a.checked_div(b)
            }
            Self::Modulo => {
                if b == 0 {
                    return Err(division_by_zero());
                }
                Some(a.wrapping_rem(b))
            }
        };
        result.map(AtomicValue::Integer).ok_or_else(|| {
            RuntimeError::dynamic(
                ErrorCode::FOAR0002,
                OPERATOR,
                format!("integer overflow in {a} {} {b}", self.symbol()),
            )
        })
    }

    fn apply_double(self, a: f64, b: f64) -> RuntimeResult<AtomicValue> {
        let result = match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => a / b,
            Self::Modulo => a % b,
            Self::IntegerDivide => {
                if b == 0.0 {
                    return Err(division_by_zero());
                }
                let quotient = (a / b).trunc();
                #[allow(clippy::cast_precision_loss)]
                let limit = i64::MAX as f64;
                if !quotient.is_finite() || quotient.abs() >= limit {
                    return Err(RuntimeError::dynamic(
                        ErrorCode::FOAR0002,
                        OPERATOR,
                        format!("{a} idiv {b} is not representable as xs:integer"),
                    ));
                }
                #[allow(clippy::cast_possible_truncation)]
                let quotient = quotient as i64;
                return Ok(AtomicValue::Integer(quotient));
            }
        };
        Ok(AtomicValue::Double(result))
    }
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn division_by_zero() -> RuntimeError {
    RuntimeError::dynamic(ErrorCode::FOAR0001, OPERATOR, "division by zero")
}

fn numeric_operand(value: &AtomicValue) -> RuntimeResult<AtomicValue> {
    match value {
        AtomicValue::Integer(_) | AtomicValue::Double(_) => Ok(value.clone()),
        AtomicValue::UntypedAtomic(_) => value.to_double().map(AtomicValue::Double).at(OPERATOR),
        other => Err(RuntimeError::dynamic(
            ErrorCode::XPTY0004,
            OPERATOR,
            format!("arithmetic operand must be numeric, got {}", other.atomic_type()),
        )),
    }
}

/// Evaluates `lhs <op> rhs`.
#[derive(Debug)]
pub struct ArithmeticOp {
    scalar: ScalarState,
    operator: ArithmeticOperator,
    lhs: Box<Iter>,
    rhs: Box<Iter>,
}

impl ArithmeticOp {
    /// Creates an arithmetic operator.
    pub fn new(
        alloc: &mut RegisterAllocator,
        operator: ArithmeticOperator,
        lhs: Iter,
        rhs: Iter,
    ) -> Self {
        Self { scalar: ScalarState::new(alloc), operator, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    fn compute(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        let lhs = self.lhs.evaluate_eagerly(frame)?.atomize_optional().at(OPERATOR)?;
        let rhs = self.rhs.evaluate_eagerly(frame)?.atomize_optional().at(OPERATOR)?;
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return Ok(Sequence::empty());
        };
        let result = self.operator.apply(&lhs, &rhs)?;
        Ok(Sequence::singleton(Item::Atomic(result)))
    }
}

scalar_iterator!(ArithmeticOp, "Arithmetic");

/// Unary minus.
#[derive(Debug)]
pub struct NegateOp {
    scalar: ScalarState,
    operand: Box<Iter>,
}

impl NegateOp {
    /// Creates a negation.
    pub fn new(alloc: &mut RegisterAllocator, operand: Iter) -> Self {
        Self { scalar: ScalarState::new(alloc), operand: Box::new(operand) }
    }

    fn compute(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        let Some(value) = self.operand.evaluate_eagerly(frame)?.atomize_optional().at("Negate")?
        else {
            return Ok(Sequence::empty());
        };
        let negated = match numeric_operand(&value)? {
            AtomicValue::Integer(i) => i.checked_neg().map(AtomicValue::Integer).ok_or_else(|| {
                RuntimeError::dynamic(ErrorCode::FOAR0002, "Negate", format!("integer overflow in -{i}"))
            })?,
            AtomicValue::Double(d) => AtomicValue::Double(-d),
            other => {
                return Err(RuntimeError::dynamic(
                    ErrorCode::XPTY0004,
                    "Negate",
                    format!("cannot negate {}", other.atomic_type()),
                ))
            }
        };
        Ok(Sequence::singleton(Item::Atomic(negated)))
    }
}

scalar_iterator!(NegateOp, "Negate");
