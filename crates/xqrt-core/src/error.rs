//! Error types for the core crate.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length for value display in error messages.
const MAX_VALUE_DISPLAY_LEN: usize = 100;

/// Classification codes for query errors.
///
/// The codes follow the query language's own error namespace (`err:XPTY0004`
/// and friends). Codes with the `XQRT` prefix are raised by the runtime for
/// resource limits that the language itself does not name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// A value does not match a required type.
    XPTY0004,
    /// A path step was applied to a context item that is not a node.
    XPTY0019,
    /// A variable reference has no binding in scope.
    XPST0008,
    /// A function name/arity pair is not known.
    XPST0017,
    /// Two functions were declared with the same name and arity.
    XQST0034,
    /// An external variable was required but not bound.
    XPDY0002,
    /// Division by zero.
    FOAR0001,
    /// Numeric overflow.
    FOAR0002,
    /// A value cannot be cast to the target type.
    FORG0001,
    /// The effective boolean value is not defined for the operand.
    FORG0006,
    /// Error raised by `fn:error`.
    FOER0000,
    /// A materialized sequence exceeded the configured item limit.
    XQRT0001,
    /// User-defined function calls nested deeper than the configured limit.
    XQRT0002,
}

impl ErrorCode {
    /// Returns the code as it appears in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::XPTY0004 => "XPTY0004",
            Self::XPTY0019 => "XPTY0019",
            Self::XPST0008 => "XPST0008",
            Self::XPST0017 => "XPST0017",
            Self::XQST0034 => "XQST0034",
            Self::XPDY0002 => "XPDY0002",
            Self::FOAR0001 => "FOAR0001",
            Self::FOAR0002 => "FOAR0002",
            Self::FORG0001 => "FORG0001",
            Self::FORG0006 => "FORG0006",
            Self::FOER0000 => "FOER0000",
            Self::XQRT0001 => "XQRT0001",
            Self::XQRT0002 => "XQRT0002",
        }
    }

    /// Returns true for codes detected before evaluation starts.
    #[must_use]
    pub const fn is_static(self) -> bool {
        matches!(self, Self::XPST0008 | Self::XPST0017 | Self::XQST0034)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "err:{}", self.as_str())
    }
}

/// Errors that can occur in the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A value type mismatch occurred.
    #[error("type mismatch: expected {expected}, got {actual}{}", value.as_ref().map(|v| format!(" (value: {v})")).unwrap_or_default())]
    TypeMismatch {
        /// The expected type.
        expected: String,
        /// The actual type.
        actual: String,
        /// The value that caused the mismatch (truncated for display).
        value: Option<String>,
    },

    /// An atomic value could not be cast.
    #[error("cannot cast {value:?} to {target}")]
    InvalidCast {
        /// The target type name.
        target: String,
        /// The lexical form that failed to cast.
        value: String,
    },

    /// The effective boolean value of a sequence is undefined.
    #[error("effective boolean value is not defined for {0}")]
    InvalidBooleanValue(String),
}

impl CoreError {
    /// Creates a type mismatch error without a value.
    #[must_use]
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch { expected: expected.into(), actual: actual.into(), value: None }
    }

    /// Creates a type mismatch error with a value for debugging.
    ///
    /// The value is truncated to 100 characters for display.
    #[must_use]
    pub fn type_mismatch_with_value(
        expected: impl Into<String>,
        actual: impl Into<String>,
        value: impl fmt::Display,
    ) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
            value: Some(truncate(value.to_string())),
        }
    }

    /// Creates a cast error.
    #[must_use]
    pub fn invalid_cast(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidCast { target: target.into(), value: truncate(value.into()) }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TypeMismatch { .. } => ErrorCode::XPTY0004,
            Self::InvalidCast { .. } => ErrorCode::FORG0001,
            Self::InvalidBooleanValue(_) => ErrorCode::FORG0006,
        }
    }
}

fn truncate(value: String) -> String {
    if value.len() > MAX_VALUE_DISPLAY_LEN {
        let mut end = MAX_VALUE_DISPLAY_LEN;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &value[..end])
    } else {
        value
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
