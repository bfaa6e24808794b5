//! Variable reads.

use xqrt_core::{ErrorCode, Sequence};

use crate::error::{RuntimeError, RuntimeResult};
use crate::frame::Frame;
use crate::iter::{scalar_iterator, ScalarState};
use crate::register::{GlobalRegister, LocalRegister, RegisterAllocator};

/// Yields the sequence bound to a local variable register.
#[derive(Debug)]
pub struct LocalVarOp {
    scalar: ScalarState,
    name: String,
    register: LocalRegister<Sequence>,
}

impl LocalVarOp {
    /// Creates a read of `register`, which holds the variable `name`.
    pub fn new(
        alloc: &mut RegisterAllocator,
        name: impl Into<String>,
        register: LocalRegister<Sequence>,
    ) -> Self {
        Self { scalar: ScalarState::new(alloc), name: name.into(), register }
    }

    /// Returns the register being read.
    #[must_use]
    pub const fn register(&self) -> LocalRegister<Sequence> {
        self.register
    }

    fn compute(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        self.register.get(frame).cloned().ok_or_else(|| {
            RuntimeError::dynamic(
                ErrorCode::XPDY0002,
                "LocalVar",
                format!("variable ${} has no value", self.name),
            )
        })
    }
}

scalar_iterator!(LocalVarOp, "LocalVar");

/// Yields the sequence bound to a global register.
#[derive(Debug)]
pub struct GlobalVarOp {
    scalar: ScalarState,
    name: String,
    register: GlobalRegister<Sequence>,
}

impl GlobalVarOp {
    /// Creates a read of the global `register`, which holds `name`.
    pub fn new(
        alloc: &mut RegisterAllocator,
        name: impl Into<String>,
        register: GlobalRegister<Sequence>,
    ) -> Self {
        Self { scalar: ScalarState::new(alloc), name: name.into(), register }
    }

    fn compute(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        self.register.get(frame).cloned().ok_or_else(|| {
            RuntimeError::dynamic(
                ErrorCode::XPDY0002,
                "GlobalVar",
                format!("external variable ${} is not bound", self.name),
            )
        })
    }
}

scalar_iterator!(GlobalVarOp, "GlobalVar");
