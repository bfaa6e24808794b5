//! Plan execution.
//!
//! The [`Executor`] drives the root iterator of a [`CompiledPlan`] over one
//! frame and hands out result items.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};
use xqrt_core::{Item, Sequence};

use crate::config::RuntimeConfig;
use crate::error::RuntimeResult;
use crate::frame::{Frame, FrameStats};
use crate::iter::{OperatorState, RuntimeIterator};
use crate::plan::{CompiledPlan, ExternalBindings};
use crate::register::GlobalRegisters;

/// A token for cancelling an evaluation from another thread.
///
/// Cancellation is checked between root items only; an item that is being
/// computed is finished first.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self { cancelled: Arc::new(AtomicBool::new(false)) }
    }

    /// Requests cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Checks if cancellation was requested.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates a compiled plan.
///
/// The executor borrows the plan and its global registers; several
/// executors may run the same plan at once, each with its own frame.
/// Dropping an executor closes the operator tree.
pub struct Executor<'p> {
    plan: &'p CompiledPlan,
    frame: Frame<'p>,
    cancellation: CancellationToken,
    opened: bool,
}

impl<'p> Executor<'p> {
    /// Creates an executor for `plan`.
    #[must_use]
    pub fn new(plan: &'p CompiledPlan, globals: &'p GlobalRegisters, config: RuntimeConfig) -> Self {
        Self {
            plan,
            frame: plan.new_frame(globals, config),
            cancellation: CancellationToken::new(),
            opened: false,
        }
    }

    /// Uses `token` to observe cancellation requests.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Returns the cancellation token.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Opens the root iterator.
    ///
    /// # Errors
    ///
    /// Propagates errors from opening the plan; the tree is closed again
    /// before returning.
    pub fn open(&mut self) -> RuntimeResult<()> {
        if self.opened {
            return Ok(());
        }
        debug!(frame_size = self.frame.size(), root = self.plan.root().name(), "opening plan");
        if let Err(err) = self.plan.root().open(&mut self.frame) {
            self.plan.root().close(&mut self.frame);
            return Err(err);
        }
        self.opened = true;
        Ok(())
    }

    /// Returns the next result item, or `None` when the result is
    /// exhausted or cancellation was requested.
    ///
    /// # Errors
    ///
    /// Propagates dynamic errors raised while computing the item.
    pub fn next(&mut self) -> RuntimeResult<Option<Item>> {
        if !self.opened {
            self.open()?;
        }
        if self.cancellation.is_cancelled() {
            debug!(items = self.frame.stats().items_produced, "evaluation cancelled");
            return Ok(None);
        }

        let item = self.plan.root().next(&mut self.frame)?;
        if item.is_some() {
            self.frame.record_item_produced();
        }
        Ok(item)
    }

    /// Closes the root iterator. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.opened {
            return;
        }
        self.plan.root().close(&mut self.frame);
        self.opened = false;
        let stats = self.frame.stats();
        debug!(
            items_produced = stats.items_produced,
            sequences_materialized = stats.sequences_materialized,
            function_calls = stats.function_calls,
            "closed plan"
        );
    }

    /// Returns the state of the root iterator.
    #[must_use]
    pub fn state(&self) -> OperatorState {
        self.plan.root().state(&self.frame)
    }

    /// Returns the evaluation counters.
    #[must_use]
    pub fn stats(&self) -> &FrameStats {
        self.frame.stats()
    }

    /// Evaluates the plan and collects every result item.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors; the tree is closed either way.
    pub fn collect(&mut self) -> RuntimeResult<Sequence> {
        self.run(|exec| {
            let mut items = Vec::new();
            while let Some(item) = exec.next()? {
                items.push(item);
            }
            Ok(Sequence::from_items(items))
        })
    }

    /// Counts the result items without keeping them.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors; the tree is closed either way.
    pub fn count(&mut self) -> RuntimeResult<usize> {
        self.run(|exec| {
            let mut count = 0;
            while exec.next()?.is_some() {
                count += 1;
            }
            Ok(count)
        })
    }

    /// Returns the first result item, if any.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors; the tree is closed either way.
    pub fn first(&mut self) -> RuntimeResult<Option<Item>> {
        self.run(Self::next)
    }

    fn run<T>(&mut self, body: impl FnOnce(&mut Self) -> RuntimeResult<T>) -> RuntimeResult<T> {
        self.open()?;
        let result = body(self);
        self.close();
        result
    }
}

impl Drop for Executor<'_> {
    fn drop(&mut self) {
        if self.opened {
            warn!(items_produced = self.frame.stats().items_produced, "executor dropped while open");
        }
        self.close();
    }
}

impl std::fmt::Debug for Executor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("frame", &self.frame)
            .field("opened", &self.opened)
            .finish_non_exhaustive()
    }
}

/// Binds `bindings`, evaluates `plan` and collects the result.
///
/// # Errors
///
/// Returns binding errors (see [`CompiledPlan::bind_externals`]) and any
/// evaluation error.
pub fn execute(
    plan: &CompiledPlan,
    bindings: &ExternalBindings,
    config: RuntimeConfig,
) -> RuntimeResult<Sequence> {
    let globals = plan.bind_externals(bindings)?;
    let mut executor = Executor::new(plan, &globals, config);
    executor.collect()
}
