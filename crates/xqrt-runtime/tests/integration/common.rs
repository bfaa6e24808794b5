//! Shared helpers.

use xqrt_core::{Item, Sequence};
use xqrt_runtime::plan::{compile, Module};
use xqrt_runtime::{execute, ExternalBindings, FunctionRegistry, RuntimeConfig, RuntimeResult};

/// Routes runtime logs to the test output. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Compiles `module` against the built-in functions and evaluates it.
pub fn run(module: &Module) -> RuntimeResult<Sequence> {
    run_with(module, &FunctionRegistry::with_builtins(), &ExternalBindings::new())
}

/// Compiles and evaluates `module` with a custom registry and bindings.
pub fn run_with(
    module: &Module,
    registry: &FunctionRegistry,
    bindings: &ExternalBindings,
) -> RuntimeResult<Sequence> {
    init_tracing();
    let plan = compile(module, registry)?;
    execute(&plan, bindings, RuntimeConfig::default())
}

pub fn ints(values: &[i64]) -> Sequence {
    values.iter().copied().map(Item::integer).collect()
}

pub fn strings(values: &[&str]) -> Sequence {
    values.iter().map(|s| Item::string(*s)).collect()
}
