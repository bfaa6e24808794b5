//! External variables and the global register set.

use xqrt_core::{AtomicType, ErrorCode, Item, Sequence, SequenceType};
use xqrt_runtime::plan::{compile, Clause, Expr, ExternalDecl, Module};
use xqrt_runtime::register::GlobalRegisters;
use xqrt_runtime::{execute, ExternalBindings, FunctionRegistry, RuntimeConfig};

use crate::common::{ints, run_with};

#[test]
fn global_is_written_once_and_read_many_times() {
    // for $i in 1 to 3 return $base + $i
    let module = Module::new(Expr::flwor(
        vec![Clause::for_in("i", Expr::integer(1).to(Expr::integer(3)))],
        Expr::var("base").add(Expr::var("i")),
    ))
    .with_external(ExternalDecl::typed("base", SequenceType::atomic(AtomicType::Integer)));
    let bindings = ExternalBindings::new().with("base", Sequence::singleton(Item::integer(100)));

    let result = run_with(&module, &FunctionRegistry::with_builtins(), &bindings).unwrap();
    assert_eq!(result, ints(&[101, 102, 103]));
}

#[test]
fn rebinding_a_global_is_rejected() {
    let mut globals = GlobalRegisters::new(1);
    globals.bind(0, ints(&[1])).unwrap();
    assert!(globals.bind(0, ints(&[2])).is_err());
    assert_eq!(globals.get(0), Some(&ints(&[1])));
}

#[test]
fn missing_external_is_xpdy0002() {
    let module = Module::new(Expr::var("x")).with_external(ExternalDecl::new("x"));
    let plan = compile(&module, &FunctionRegistry::with_builtins()).unwrap();
    let err = execute(&plan, &ExternalBindings::new(), RuntimeConfig::default()).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::XPDY0002));
}

#[test]
fn undeclared_variable_is_a_static_error() {
    let module = Module::new(Expr::var("nope"));
    let err = compile(&module, &FunctionRegistry::with_builtins()).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::XPST0008));
    assert!(err.code().is_some_and(ErrorCode::is_static));
}

#[test]
fn one_plan_different_bindings() {
    let module = Module::new(Expr::var("n").mul(Expr::integer(2)))
        .with_external(ExternalDecl::new("n"));
    let plan = compile(&module, &FunctionRegistry::with_builtins()).unwrap();

    for n in [1, 5, 9] {
        let bindings = ExternalBindings::new().with("n", Sequence::singleton(Item::integer(n)));
        let result = execute(&plan, &bindings, RuntimeConfig::default()).unwrap();
        assert_eq!(result, ints(&[n * 2]));
    }
}
