//! Function calls.

use std::fmt;
use std::sync::Arc;

use tracing::trace;
use xqrt_core::{ErrorCode, Sequence, SequenceType};

use super::Iter;
use crate::error::{RuntimeError, RuntimeResult};
use crate::frame::Frame;
use crate::function::Function;
use crate::iter::{materialize, scalar_iterator, RuntimeIterator, ScalarState};
use crate::register::{LocalRegister, RegisterAllocator, RegisterRange};

/// A call to a library function.
///
/// Arguments are evaluated eagerly, left to right, and handed to the
/// function as whole sequences.
pub struct CallOp {
    scalar: ScalarState,
    function: Arc<dyn Function>,
    args: Vec<Iter>,
}

impl CallOp {
    /// Creates a call.
    pub fn new(alloc: &mut RegisterAllocator, function: Arc<dyn Function>, args: Vec<Iter>) -> Self {
        Self { scalar: ScalarState::new(alloc), function, args }
    }

    fn compute(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        let args = self
            .args
            .iter()
            .map(|arg| arg.evaluate_eagerly(frame))
            .collect::<RuntimeResult<Vec<_>>>()?;
        self.function.invoke(&args)
    }
}

scalar_iterator!(CallOp, "Call");

impl fmt::Debug for CallOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOp")
            .field("function", &self.function.signature().key())
            .field("args", &self.args)
            .finish()
    }
}

/// A compiled user-defined function.
///
/// `window` covers every register the parameters and the body use; a call
/// saves it before binding parameters and restores it afterwards, so an
/// invocation never sees the registers of the one that called it.
#[derive(Debug)]
pub struct UserFunction {
    name: String,
    params: Vec<LocalRegister<Sequence>>,
    param_types: Vec<Option<SequenceType>>,
    return_type: Option<SequenceType>,
    body: Iter,
    window: RegisterRange,
}

impl UserFunction {
    /// Creates a compiled function.
    ///
    /// # Panics
    ///
    /// Panics if `params` and `param_types` differ in length.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        params: Vec<LocalRegister<Sequence>>,
        param_types: Vec<Option<SequenceType>>,
        return_type: Option<SequenceType>,
        body: Iter,
        window: RegisterRange,
    ) -> Self {
        assert_eq!(params.len(), param_types.len(), "one type slot per parameter");
        Self { name: name.into(), params, param_types, return_type, body, window }
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Returns the register window of the function.
    #[must_use]
    pub const fn window(&self) -> RegisterRange {
        self.window
    }

    fn bind_params(&self, frame: &mut Frame<'_>, args: Vec<Sequence>) -> RuntimeResult<()> {
        for ((param, expected), value) in self.params.iter().zip(&self.param_types).zip(args) {
            if let Some(expected) = expected {
                if !expected.matches(&value) {
                    return Err(RuntimeError::dynamic(
                        ErrorCode::XPTY0004,
                        "UserCall",
                        format!("argument of {} does not match {expected}", self.name),
                    ));
                }
            }
            param.set(frame, value);
        }
        Ok(())
    }

    fn run(&self, frame: &mut Frame<'_>, args: Vec<Sequence>) -> RuntimeResult<Sequence> {
        self.bind_params(frame, args)?;
        let result = materialize(&self.body, frame)?;
        if let Some(expected) = &self.return_type {
            if !expected.matches(&result) {
                return Err(RuntimeError::dynamic(
                    ErrorCode::XPTY0004,
                    "UserCall",
                    format!("result of {} does not match {expected}", self.name),
                ));
            }
        }
        Ok(result)
    }
}

/// A call to a user-defined function of the plan.
///
/// The callee is found by index in the frame's function table.
#[derive(Debug)]
pub struct UserCallOp {
    scalar: ScalarState,
    function: usize,
    args: Vec<Iter>,
}

impl UserCallOp {
    /// Creates a call to the function at `function` in the plan's table.
    pub fn new(alloc: &mut RegisterAllocator, function: usize, args: Vec<Iter>) -> Self {
        Self { scalar: ScalarState::new(alloc), function, args }
    }

    fn compute(&self, frame: &mut Frame<'_>) -> RuntimeResult<Sequence> {
        let function = frame.functions().get(self.function).ok_or_else(|| {
            RuntimeError::framework(format!("no user function at index {}", self.function))
        })?;

        let args = self
            .args
            .iter()
            .map(|arg| arg.evaluate_eagerly(frame))
            .collect::<RuntimeResult<Vec<_>>>()?;

        frame.enter_call(function.name())?;
        trace!(function = function.name(), depth = frame.call_depth(), "entering user function");
        let saved = frame.save_window(function.window);
        let result = function.run(frame, args);
        frame.restore_window(function.window, saved);
        frame.exit_call();
        result
    }
}

scalar_iterator!(UserCallOp, "UserCall");
