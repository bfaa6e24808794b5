//! Library and user-defined functions.

use std::sync::Arc;

use xqrt_core::{AtomicType, ErrorCode, Item, Sequence, SequenceType};
use xqrt_runtime::operators::Comparator;
use xqrt_runtime::plan::{compile, Clause, Expr, FunctionDecl, Module, Param};
use xqrt_runtime::register::GlobalRegisters;
use xqrt_runtime::{
    execute, Executor, ExternalBindings, Function, FunctionRegistry, FunctionSignature,
    RuntimeConfig, RuntimeResult,
};

use crate::common::{ints, run, run_with, strings};

fn integer() -> SequenceType {
    SequenceType::atomic(AtomicType::Integer)
}

/// declare function local:fib($n as xs:integer) as xs:integer {
///   if ($n lt 2) then $n else local:fib($n - 1) + local:fib($n - 2)
/// }
fn fib() -> FunctionDecl {
    let n = || Expr::var("n");
    FunctionDecl {
        name: "local:fib".into(),
        params: vec![Param::typed("n", integer())],
        return_type: Some(integer()),
        body: Expr::if_then_else(
            n().value_cmp(Comparator::Lt, Expr::integer(2)),
            n(),
            Expr::call("local:fib", vec![n().sub(Expr::integer(1))])
                .add(Expr::call("local:fib", vec![n().sub(Expr::integer(2))])),
        ),
    }
}

#[test]
fn recursive_function() {
    // for $i in 0 to 10 return local:fib($i)
    let module = Module::new(Expr::flwor(
        vec![Clause::for_in("i", Expr::integer(0).to(Expr::integer(10)))],
        Expr::call("local:fib", vec![Expr::var("i")]),
    ))
    .with_function(fib());
    assert_eq!(run(&module).unwrap(), ints(&[0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55]));
}

#[test]
fn mutual_recursion() {
    // local:even($n) { if ($n eq 0) then true() else local:odd($n - 1) }
    // local:odd($n)  { if ($n eq 0) then false() else local:even($n - 1) }
    let decl = |name: &str, base: bool, other: &str| FunctionDecl {
        name: name.into(),
        params: vec![Param::new("n")],
        return_type: None,
        body: Expr::if_then_else(
            Expr::var("n").value_cmp(Comparator::Eq, Expr::integer(0)),
            Expr::boolean(base),
            Expr::call(other, vec![Expr::var("n").sub(Expr::integer(1))]),
        ),
    };
    let module = Module::new(Expr::sequence(vec![
        Expr::call("local:even", vec![Expr::integer(10)]),
        Expr::call("local:odd", vec![Expr::integer(7)]),
        Expr::call("local:even", vec![Expr::integer(3)]),
    ]))
    .with_function(decl("local:even", true, "local:odd"))
    .with_function(decl("local:odd", false, "local:even"));

    let result = run(&module).unwrap();
    let flags: Vec<_> = result.iter().map(|i| i.string_value()).collect();
    assert_eq!(flags, vec!["true", "true", "false"]);
}

#[test]
fn call_depth_limit() {
    // local:down($n) { if ($n eq 0) then 0 else local:down($n - 1) }
    let module = Module::new(Expr::call("local:down", vec![Expr::integer(100)])).with_function(
        FunctionDecl {
            name: "local:down".into(),
            params: vec![Param::new("n")],
            return_type: None,
            body: Expr::if_then_else(
                Expr::var("n").value_cmp(Comparator::Eq, Expr::integer(0)),
                Expr::integer(0),
                Expr::call("local:down", vec![Expr::var("n").sub(Expr::integer(1))]),
            ),
        },
    );
    let plan = compile(&module, &FunctionRegistry::with_builtins()).unwrap();
    let bindings = ExternalBindings::new();

    let ok = execute(&plan, &bindings, RuntimeConfig::default()).unwrap();
    assert_eq!(ok, ints(&[0]));

    let shallow = RuntimeConfig::new().with_max_call_depth(50);
    let err = execute(&plan, &bindings, shallow).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::XQRT0002));
}

#[test]
fn calls_are_counted() {
    let module = Module::new(Expr::call("local:fib", vec![Expr::integer(5)])).with_function(fib());
    let plan = compile(&module, &FunctionRegistry::with_builtins()).unwrap();
    let globals = GlobalRegisters::new(0);
    let mut exec = Executor::new(&plan, &globals, RuntimeConfig::default());

    assert_eq!(exec.collect().unwrap(), ints(&[5]));
    // fib(5) makes 15 calls in total
    assert_eq!(exec.stats().function_calls, 15);
}

#[test]
fn parameter_type_is_checked() {
    let module =
        Module::new(Expr::call("local:fib", vec![Expr::string("7")])).with_function(fib());
    let err = run(&module).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::XPTY0004));
}

/// An embedder-provided function: joins strings with a separator.
struct Join;

impl Function for Join {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature::new("app:join", 2).with_description("Joins strings")
    }

    fn invoke(&self, args: &[Sequence]) -> RuntimeResult<Sequence> {
        let separator = args[1].first().map(Item::string_value).unwrap_or_default();
        let parts: Vec<_> = args[0].iter().map(Item::string_value).collect();
        Ok(Sequence::singleton(Item::string(parts.join(&separator))))
    }
}

#[test]
fn external_function() {
    let mut registry = FunctionRegistry::with_builtins();
    registry.register(Arc::new(Join));
    let module = Module::new(Expr::call(
        "app:join",
        vec![
            Expr::sequence(vec![Expr::string("a"), Expr::integer(1), Expr::string("b")]),
            Expr::string("-"),
        ],
    ));
    let result = run_with(&module, &registry, &ExternalBindings::new()).unwrap();
    assert_eq!(result, strings(&["a-1-b"]));
}

#[test]
fn unknown_function_is_xpst0017() {
    let module = Module::new(Expr::call("app:missing", vec![Expr::integer(1)]));
    let err = compile(&module, &FunctionRegistry::with_builtins()).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::XPST0017));
}
