//! Error classification and propagation.

use xqrt_core::{ErrorCode, Item, Sequence};
use xqrt_runtime::plan::{compile, Clause, Expr, Module};
use xqrt_runtime::register::GlobalRegisters;
use xqrt_runtime::{
    execute, Executor, ExternalBindings, FunctionRegistry, OperatorState, RuntimeConfig,
    RuntimeError,
};

use crate::common::run;

fn code_of(body: Expr) -> Option<ErrorCode> {
    run(&Module::new(body)).unwrap_err().code()
}

#[test]
fn arithmetic_errors() {
    assert_eq!(code_of(Expr::integer(1).idiv(Expr::integer(0))), Some(ErrorCode::FOAR0001));
    assert_eq!(code_of(Expr::integer(1).modulo(Expr::integer(0))), Some(ErrorCode::FOAR0001));
    assert_eq!(
        code_of(Expr::integer(i64::MAX).add(Expr::integer(1))),
        Some(ErrorCode::FOAR0002)
    );
    assert_eq!(
        code_of(Expr::integer(1).to(Expr::integer(2)).add(Expr::integer(1))),
        Some(ErrorCode::XPTY0004)
    );
    assert_eq!(code_of(Expr::string("a").add(Expr::integer(1))), Some(ErrorCode::XPTY0004));
}

#[test]
fn ebv_errors() {
    let ebv = Expr::if_then_else(
        Expr::integer(1).to(Expr::integer(2)),
        Expr::integer(1),
        Expr::integer(0),
    );
    assert_eq!(code_of(ebv), Some(ErrorCode::FORG0006));
}

#[test]
fn fn_error_is_foer0000() {
    let err = run(&Module::new(Expr::call(
        "error",
        vec![Expr::string("app:E1"), Expr::string("custom failure")],
    )))
    .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::FOER0000));
    assert!(err.to_string().contains("custom failure"));
}

#[test]
fn errors_carry_the_operator_kind() {
    let err = run(&Module::new(Expr::integer(1).div(Expr::integer(0)))).unwrap_err();
    assert!(matches!(err, RuntimeError::Dynamic { operator: "Arithmetic", .. }));
}

#[test]
fn error_inside_flwor_closes_the_tree() {
    // for $i in (1, 0) return 10 idiv $i
    let module = Module::new(Expr::flwor(
        vec![Clause::for_in("i", Expr::sequence(vec![Expr::integer(1), Expr::integer(0)]))],
        Expr::integer(10).idiv(Expr::var("i")),
    ));
    let plan = compile(&module, &FunctionRegistry::with_builtins()).unwrap();
    let globals = GlobalRegisters::new(0);
    let mut exec = Executor::new(&plan, &globals, RuntimeConfig::default());

    exec.open().unwrap();
    assert_eq!(exec.next().unwrap(), Some(Item::integer(10)));
    let err = exec.next().unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::FOAR0001));
    exec.close();
    assert_eq!(exec.state(), OperatorState::Closed);

    // the failed evaluation leaves the plan reusable
    let mut exec = Executor::new(&plan, &globals, RuntimeConfig::default());
    assert_eq!(exec.first().unwrap(), Some(Item::integer(10)));
}

#[test]
fn oversized_materialization_is_xqrt0001() {
    // let $x := 1 to 100 return count($x)
    let module = Module::new(Expr::flwor(
        vec![Clause::let_("x", Expr::integer(1).to(Expr::integer(100)))],
        Expr::call("count", vec![Expr::var("x")]),
    ));
    let plan = compile(&module, &FunctionRegistry::with_builtins()).unwrap();
    let bindings = ExternalBindings::new();

    let limited = RuntimeConfig::new().with_max_materialized_items(10);
    let err = execute(&plan, &bindings, limited).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::XQRT0001));

    let unlimited = RuntimeConfig::new().with_max_materialized_items(0);
    let ok = execute(&plan, &bindings, unlimited).unwrap();
    assert_eq!(ok, Sequence::singleton(Item::integer(100)));
}
