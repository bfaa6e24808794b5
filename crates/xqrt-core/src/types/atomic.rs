//! Atomic values and their types.
//!
//! # Example
//!
//! ```
//! use xqrt_core::{AtomicType, AtomicValue};
//!
//! let n: AtomicValue = 42i64.into();
//! assert_eq!(n.atomic_type(), AtomicType::Integer);
//! assert!(AtomicType::Integer.is_subtype_of(AtomicType::Numeric));
//! assert_eq!(AtomicValue::untyped("2.5").to_double().ok(), Some(2.5));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// An atomic value in the query data model.
///
/// | Variant | Language type |
/// |---------|---------------|
/// | `Integer` | `xs:integer` |
/// | `Double` | `xs:double` |
/// | `Boolean` | `xs:boolean` |
/// | `String` | `xs:string` |
/// | `UntypedAtomic` | `xs:untypedAtomic` (the typed value of an untyped node) |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AtomicValue {
    /// 64-bit signed integer.
    Integer(i64),
    /// IEEE double.
    Double(f64),
    /// Boolean.
    Boolean(bool),
    /// UTF-8 string.
    String(String),
    /// Untyped character data.
    UntypedAtomic(String),
}

/// The dynamic type of an atomic value.
///
/// `AnyAtomic` and `Numeric` never describe a value directly; they exist so
/// sequence types can name a supertype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomicType {
    /// `xs:anyAtomicType`
    AnyAtomic,
    /// `xs:numeric`
    Numeric,
    /// `xs:integer`
    Integer,
    /// `xs:double`
    Double,
    /// `xs:boolean`
    Boolean,
    /// `xs:string`
    String,
    /// `xs:untypedAtomic`
    UntypedAtomic,
}

impl AtomicType {
    /// Returns the lexical type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AnyAtomic => "xs:anyAtomicType",
            Self::Numeric => "xs:numeric",
            Self::Integer => "xs:integer",
            Self::Double => "xs:double",
            Self::Boolean => "xs:boolean",
            Self::String => "xs:string",
            Self::UntypedAtomic => "xs:untypedAtomic",
        }
    }

    /// Returns true if `self` is `other` or derives from it.
    #[must_use]
    pub const fn is_subtype_of(self, other: Self) -> bool {
        match other {
            Self::AnyAtomic => true,
            Self::Numeric => matches!(self, Self::Numeric | Self::Integer | Self::Double),
            _ => self as u8 == other as u8,
        }
    }

    /// Returns true for the numeric types.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_subtype_of(Self::Numeric)
    }
}

impl fmt::Display for AtomicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl AtomicValue {
    /// Creates an untyped atomic value.
    #[must_use]
    pub fn untyped(value: impl Into<String>) -> Self {
        Self::UntypedAtomic(value.into())
    }

    /// Returns the dynamic type of this value.
    #[must_use]
    pub const fn atomic_type(&self) -> AtomicType {
        match self {
            Self::Integer(_) => AtomicType::Integer,
            Self::Double(_) => AtomicType::Double,
            Self::Boolean(_) => AtomicType::Boolean,
            Self::String(_) => AtomicType::String,
            Self::UntypedAtomic(_) => AtomicType::UntypedAtomic,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub const fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string content for string-like values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::UntypedAtomic(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this value is numeric.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Double(_))
    }

    /// Returns the canonical lexical form (the `fn:string` value).
    #[must_use]
    pub fn string_value(&self) -> String {
        self.to_string()
    }

    /// Converts to a double, casting untyped and string values.
    pub fn to_double(&self) -> CoreResult<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(i) => Ok(*i as f64),
            Self::Double(d) => Ok(*d),
            Self::UntypedAtomic(s) | Self::String(s) => parse_double(s),
            Self::Boolean(_) => Err(CoreError::type_mismatch(
                AtomicType::Numeric.name(),
                self.atomic_type().name(),
            )),
        }
    }

    /// Casts an untyped value to the type of `target`; other values are
    /// returned unchanged.
    ///
    /// This is the promotion used by general comparisons.
    pub fn cast_untyped_like(&self, target: &Self) -> CoreResult<Self> {
        let Self::UntypedAtomic(s) = self else {
            return Ok(self.clone());
        };
        match target {
            Self::Integer(_) | Self::Double(_) => parse_double(s).map(Self::Double),
            Self::Boolean(_) => match s.trim() {
                "true" | "1" => Ok(Self::Boolean(true)),
                "false" | "0" => Ok(Self::Boolean(false)),
                _ => Err(CoreError::invalid_cast(AtomicType::Boolean.name(), s.clone())),
            },
            Self::String(_) | Self::UntypedAtomic(_) => Ok(Self::String(s.clone())),
        }
    }
}

fn parse_double(s: &str) -> CoreResult<f64> {
    let trimmed = s.trim();
    match trimmed {
        "INF" | "+INF" => Ok(f64::INFINITY),
        "-INF" => Ok(f64::NEG_INFINITY),
        "NaN" => Ok(f64::NAN),
        _ => trimmed
            .parse::<f64>()
            .map_err(|_| CoreError::invalid_cast(AtomicType::Double.name(), s)),
    }
}

impl fmt::Display for AtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Double(d) => {
                if d.is_nan() {
                    f.write_str("NaN")
                } else if d.is_infinite() {
                    f.write_str(if *d > 0.0 { "INF" } else { "-INF" })
                } else if d.fract() == 0.0 && d.abs() < 1e15 {
                    write!(f, "{d:.0}")
                } else {
                    write!(f, "{d}")
                }
            }
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) | Self::UntypedAtomic(s) => f.write_str(s),
        }
    }
}

impl From<i64> for AtomicValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AtomicValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for AtomicValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for AtomicValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AtomicValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
