//! Activation frames.
//!
//! A [`Frame`] is the mutable half of plan evaluation: one fixed-size array of
//! local registers sized by the plan's allocator, plus shared references to
//! the job's global registers and the plan's user-defined functions. Operator
//! nodes are immutable and reach their per-invocation state only through the
//! frame, so any number of frames can evaluate one plan at the same time.
//!
//! Nested and correlated evaluation reuse the same frame. Re-entrant calls to
//! user-defined functions save and restore the callee's register window
//! around the call.

use tracing::{trace, warn};
use xqrt_core::ErrorCode;

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::operators::UserFunction;
use crate::register::{GlobalRegisters, RegisterRange, RegisterValue};

/// Counters collected while evaluating one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Items returned by the root iterator.
    pub items_produced: u64,
    /// Sequences built by the materializer.
    pub sequences_materialized: u64,
    /// Items copied into materialized sequences.
    pub items_materialized: u64,
    /// User-defined function invocations.
    pub function_calls: u64,
}

/// The register storage for one evaluation.
pub struct Frame<'p> {
    locals: Box<[RegisterValue]>,
    globals: &'p GlobalRegisters,
    functions: &'p [UserFunction],
    config: RuntimeConfig,
    stats: FrameStats,
    call_depth: usize,
}

impl<'p> Frame<'p> {
    /// Creates a frame with `size` unset local registers.
    #[must_use]
    pub fn new(size: usize, globals: &'p GlobalRegisters) -> Self {
        Self {
            locals: vec![RegisterValue::Unset; size].into_boxed_slice(),
            globals,
            functions: &[],
            config: RuntimeConfig::default(),
            stats: FrameStats::default(),
            call_depth: 0,
        }
    }

    /// Attaches the user-defined function table of the plan.
    #[must_use]
    pub fn with_functions(mut self, functions: &'p [UserFunction]) -> Self {
        self.functions = functions;
        self
    }

    /// Sets the runtime configuration.
    #[must_use]
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the number of local registers.
    #[must_use]
    pub fn size(&self) -> usize {
        self.locals.len()
    }

    #[inline]
    pub(crate) fn local(&self, index: usize) -> &RegisterValue {
        &self.locals[index]
    }

    #[inline]
    pub(crate) fn local_mut(&mut self, index: usize) -> &mut RegisterValue {
        &mut self.locals[index]
    }

    /// Returns the global register set.
    #[inline]
    #[must_use]
    pub fn globals(&self) -> &'p GlobalRegisters {
        self.globals
    }

    /// Returns the user-defined function table.
    #[inline]
    #[must_use]
    pub fn functions(&self) -> &'p [UserFunction] {
        self.functions
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Returns the evaluation counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Records an item returned by the root iterator.
    #[inline]
    pub fn record_item_produced(&mut self) {
        self.stats.items_produced += 1;
    }

    /// Records a completed materialization.
    #[inline]
    pub fn record_materialized(&mut self, items: usize) {
        self.stats.sequences_materialized += 1;
        self.stats.items_materialized += items as u64;
    }

    /// Returns the current user-function nesting depth.
    #[must_use]
    pub const fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Enters a user-defined function call.
    ///
    /// # Errors
    ///
    /// Returns `XQRT0002` if the call would exceed the configured depth.
    pub fn enter_call(&mut self, function: &str) -> RuntimeResult<()> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(RuntimeError::dynamic(
                ErrorCode::XQRT0002,
                "UserCall",
                format!(
                    "call to {function} exceeds the maximum call depth of {}",
                    self.config.max_call_depth
                ),
            ));
        }
        self.call_depth += 1;
        self.stats.function_calls += 1;
        Ok(())
    }

    /// Leaves a user-defined function call.
    pub fn exit_call(&mut self) {
        if self.call_depth == 0 {
            warn!("exit_call without a matching enter_call");
            return;
        }
        self.call_depth -= 1;
    }

    /// Moves the values of `range` out of the frame, leaving the slots unset.
    #[must_use]
    pub fn save_window(&mut self, range: RegisterRange) -> Vec<RegisterValue> {
        trace!(start = range.start(), len = range.len(), "saving register window");
        self.locals[range.indices()].iter_mut().map(std::mem::take).collect()
    }

    /// Writes back values previously returned by [`save_window`](Self::save_window).
    pub fn restore_window(&mut self, range: RegisterRange, saved: Vec<RegisterValue>) {
        debug_assert_eq!(range.len(), saved.len());
        for (slot, value) in self.locals[range.indices()].iter_mut().zip(saved) {
            *slot = value;
        }
    }
}

impl std::fmt::Debug for Frame<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("size", &self.locals.len())
            .field("globals", &self.globals.len())
            .field("functions", &self.functions.len())
            .field("call_depth", &self.call_depth)
            .field("stats", &self.stats)
            .finish()
    }
}
