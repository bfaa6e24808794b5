//! Plans: the algebra handed to the runtime and its compiled form.
//!
//! A [`Module`] is compiled once into a [`CompiledPlan`]. The compiled plan
//! is immutable and `Send + Sync`; share it behind an `Arc` and give every
//! evaluation its own [`Frame`].

mod compiler;
mod expr;

pub use compiler::{compile, PlanCompiler};
pub use expr::{
    Clause, Expr, ExternalDecl, FunctionDecl, Module, Param, TypeswitchCase, TypeswitchDefault,
};

use std::collections::BTreeMap;

use xqrt_core::{ErrorCode, Sequence, SequenceType};

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::frame::Frame;
use crate::operators::{Iter, UserFunction};
use crate::register::{GlobalRegisterAllocator, GlobalRegisters};

/// A compiled, immutable operator tree.
#[derive(Debug)]
pub struct CompiledPlan {
    root: Iter,
    frame_size: usize,
    externals: GlobalRegisterAllocator,
    /// Declared types, indexed by global register.
    external_types: Vec<Option<SequenceType>>,
    functions: Vec<UserFunction>,
}

impl CompiledPlan {
    /// Returns the root iterator.
    #[must_use]
    pub fn root(&self) -> &Iter {
        &self.root
    }

    /// Returns the number of local registers a frame for this plan needs.
    #[must_use]
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Returns the external variable registers.
    #[must_use]
    pub fn externals(&self) -> &GlobalRegisterAllocator {
        &self.externals
    }

    /// Returns the user-defined function table.
    #[must_use]
    pub fn functions(&self) -> &[UserFunction] {
        &self.functions
    }

    /// Builds the global register set from external variable bindings.
    ///
    /// # Errors
    ///
    /// Returns `XPDY0002` if a declared variable is missing or an unknown
    /// one is bound, and `XPTY0004` if a value does not match the declared
    /// type.
    pub fn bind_externals(&self, bindings: &ExternalBindings) -> RuntimeResult<GlobalRegisters> {
        let mut globals = GlobalRegisters::new(self.externals.len());
        for (name, value) in bindings.iter() {
            let Some(index) = self.externals.lookup(name) else {
                return Err(RuntimeError::dynamic(
                    ErrorCode::XPDY0002,
                    "GlobalVar",
                    format!("${name} is not a declared external variable"),
                ));
            };
            if let Some(Some(expected)) = self.external_types.get(index) {
                if !expected.matches(value) {
                    return Err(RuntimeError::dynamic(
                        ErrorCode::XPTY0004,
                        "GlobalVar",
                        format!("value bound to ${name} does not match {expected}"),
                    ));
                }
            }
            globals.bind(index, value.clone())?;
        }

        if let Some(missing) =
            self.externals.names().iter().enumerate().find(|(i, _)| !globals.is_bound(*i))
        {
            return Err(RuntimeError::dynamic(
                ErrorCode::XPDY0002,
                "GlobalVar",
                format!("external variable ${} is not bound", missing.1),
            ));
        }
        Ok(globals)
    }

    /// Creates a frame for evaluating this plan.
    #[must_use]
    pub fn new_frame<'p>(&'p self, globals: &'p GlobalRegisters, config: RuntimeConfig) -> Frame<'p> {
        Frame::new(self.frame_size, globals).with_functions(&self.functions).with_config(config)
    }
}

/// Values for the external variables of a plan, by name.
#[derive(Debug, Clone, Default)]
pub struct ExternalBindings {
    values: BTreeMap<String, Sequence>,
}

impl ExternalBindings {
    /// Creates an empty set of bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Sequence>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a binding.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Sequence>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Sequence> {
        self.values.get(name)
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Sequence)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
