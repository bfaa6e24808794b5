//! The function library.
//!
//! Functions are looked up by name and arity while a plan is compiled.
//! [`FunctionRegistry::with_builtins`] provides the core `fn:` functions;
//! embedders register their own functions through the same [`Function`]
//! trait.

mod builtins;
mod registry;

pub use builtins::{register_builtins, BuiltinFunction};
pub use registry::FunctionRegistry;

use xqrt_core::Sequence;

use crate::error::RuntimeResult;

/// The signature of a function: name, arity and a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// The prefixed function name (e.g., "fn:count").
    pub name: String,
    /// The number of arguments.
    pub arity: usize,
    /// A description of what the function does.
    pub description: String,
}

impl FunctionSignature {
    /// Creates a new signature.
    #[must_use]
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self { name: name.into(), arity, description: String::new() }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the registry key, `name#arity`.
    #[must_use]
    pub fn key(&self) -> String {
        function_key(&self.name, self.arity)
    }
}

/// Builds the registry key for `name` with `arity` arguments.
#[must_use]
pub fn function_key(name: &str, arity: usize) -> String {
    format!("{name}#{arity}")
}

/// A callable function.
///
/// Arguments arrive fully evaluated, one sequence per parameter.
pub trait Function: Send + Sync {
    /// Returns the signature of this function.
    fn signature(&self) -> FunctionSignature;

    /// Invokes the function.
    fn invoke(&self, args: &[Sequence]) -> RuntimeResult<Sequence>;
}
