//! xqrt Runtime
//!
//! A register-windowed, pull-based evaluation runtime for compiled XML query
//! plans.
//!
//! # Overview
//!
//! - **Plans**: the serializable [`plan::Module`] algebra, compiled by
//!   [`plan::PlanCompiler`] into an immutable [`CompiledPlan`]
//! - **Registers**: compile-time slot indices ([`register::LocalRegister`],
//!   [`register::GlobalRegister`]) into a per-evaluation [`Frame`]
//! - **Iterators**: the [`RuntimeIterator`] and [`TupleIterator`] protocols and
//!   the operators in [`operators`]
//! - **Functions**: the [`Function`] trait and the [`FunctionRegistry`]
//! - **Execution**: the [`Executor`], which drives a plan over one frame
//!
//! Operators never hold per-evaluation state. A compiled plan can be shared
//! between threads, each evaluating it on its own frame.
//!
//! # Example
//!
//! ```
//! use xqrt_runtime::plan::{compile, Clause, Expr, Module};
//! use xqrt_runtime::{execute, ExternalBindings, FunctionRegistry, RuntimeConfig};
//!
//! // let $x := (1, 2, 3) return ($x, $x)
//! let module = Module::new(Expr::flwor(
//!     vec![Clause::let_("x", Expr::integer(1).to(Expr::integer(3)))],
//!     Expr::sequence(vec![Expr::var("x"), Expr::var("x")]),
//! ));
//! let plan = compile(&module, &FunctionRegistry::with_builtins()).unwrap();
//! let result = execute(&plan, &ExternalBindings::new(), RuntimeConfig::default()).unwrap();
//! assert_eq!(result.len(), 6);
//! ```

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod error;
pub mod executor;
pub mod frame;
pub mod function;
pub mod iter;
pub mod operators;
pub mod plan;
pub mod register;

pub use config::RuntimeConfig;
pub use error::{CoreResultExt, RuntimeError, RuntimeResult};
pub use executor::{execute, CancellationToken, Executor};
pub use frame::{Frame, FrameStats};
pub use function::{Function, FunctionRegistry, FunctionSignature};
pub use iter::{materialize, OperatorState, RuntimeIterator, TupleIterator};
pub use plan::{CompiledPlan, ExternalBindings};
