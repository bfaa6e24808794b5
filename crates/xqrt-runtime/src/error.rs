//! Error types for plan compilation and evaluation.

use thiserror::Error;
use xqrt_core::{CoreError, ErrorCode};

/// Errors raised while compiling or evaluating a plan.
///
/// Dynamic and static errors carry the language's error classification.
/// Framework errors come from the environment and are opaque to the runtime;
/// they are propagated unchanged.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A dynamic evaluation error (type error, division by zero, ...).
    #[error("{code}: {message} (in {operator})")]
    Dynamic {
        /// The error classification.
        code: ErrorCode,
        /// A description of the failure.
        message: String,
        /// The kind of the operator that detected the error.
        operator: &'static str,
    },

    /// An error detected while compiling a plan.
    #[error("{code}: {message}")]
    Static {
        /// The error classification.
        code: ErrorCode,
        /// A description of the failure.
        message: String,
    },

    /// An error from the hosting platform.
    #[error("framework error: {0}")]
    Framework(String),

    /// An I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// Creates a dynamic error raised by `operator`.
    #[must_use]
    pub fn dynamic(code: ErrorCode, operator: &'static str, message: impl Into<String>) -> Self {
        Self::Dynamic { code, message: message.into(), operator }
    }

    /// Creates a static error.
    #[must_use]
    pub fn static_error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Static { code, message: message.into() }
    }

    /// Creates a framework error.
    #[must_use]
    pub fn framework(message: impl Into<String>) -> Self {
        Self::Framework(message.into())
    }

    /// Attributes a data model error to the operator that hit it.
    #[must_use]
    pub fn from_core(err: CoreError, operator: &'static str) -> Self {
        Self::dynamic(err.code(), operator, err.to_string())
    }

    /// Returns the error classification, if this is a query error.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Dynamic { code, .. } | Self::Static { code, .. } => Some(*code),
            Self::Framework(_) | Self::Io(_) => None,
        }
    }

    /// Returns the operator kind for dynamic errors.
    #[must_use]
    pub const fn operator(&self) -> Option<&'static str> {
        match self {
            Self::Dynamic { operator, .. } => Some(*operator),
            _ => None,
        }
    }
}

/// Attaches operator attribution to data model results.
pub trait CoreResultExt<T> {
    /// Converts a [`CoreError`] into a dynamic error raised by `operator`.
    fn at(self, operator: &'static str) -> RuntimeResult<T>;
}

impl<T> CoreResultExt<T> for Result<T, CoreError> {
    fn at(self, operator: &'static str) -> RuntimeResult<T> {
        self.map_err(|err| RuntimeError::from_core(err, operator))
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
