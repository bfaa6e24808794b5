//! Variable binding through FLWOR clauses and registers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use xqrt_core::{Item, Sequence};
use xqrt_runtime::operators::{Comparator, LocalVarOp};
use xqrt_runtime::plan::{compile, Clause, Expr, Module};
use xqrt_runtime::register::{GlobalRegisters, LocalRegister, RegisterAllocator};
use xqrt_runtime::{
    Executor, ExternalBindings, Frame, Function, FunctionRegistry, FunctionSignature,
    RuntimeConfig, RuntimeIterator, RuntimeResult,
};

use crate::common::{ints, run, run_with};

/// Returns `(1, 2, 3)` and counts its invocations.
struct Tick {
    calls: Arc<AtomicUsize>,
}

impl Function for Tick {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature::new("test:tick", 0)
    }

    fn invoke(&self, _args: &[Sequence]) -> RuntimeResult<Sequence> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ints(&[1, 2, 3]))
    }
}

fn registry_with_tick() -> (FunctionRegistry, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = FunctionRegistry::with_builtins();
    registry.register(Arc::new(Tick { calls: Arc::clone(&calls) }));
    (registry, calls)
}

#[test]
fn one_plus_one() {
    let module = Module::new(Expr::integer(1).add(Expr::integer(1)));
    assert_eq!(run(&module).unwrap(), ints(&[2]));
}

#[test]
fn let_binding_is_evaluated_once() {
    // let $x := test:tick() return ($x, $x)
    let (registry, calls) = registry_with_tick();
    let module = Module::new(Expr::flwor(
        vec![Clause::let_("x", Expr::call("test:tick", vec![]))],
        Expr::sequence(vec![Expr::var("x"), Expr::var("x")]),
    ));
    let plan = compile(&module, &registry).unwrap();
    let globals = GlobalRegisters::new(0);
    let mut exec = Executor::new(&plan, &globals, RuntimeConfig::default());

    assert_eq!(exec.collect().unwrap(), ints(&[1, 2, 3, 1, 2, 3]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(exec.stats().items_produced, 6);
    assert_eq!(exec.stats().sequences_materialized, 1);
}

#[test]
fn let_inside_for_is_evaluated_per_tuple() {
    // for $i in 1 to 4 let $x := test:tick() return count($x)
    let (registry, calls) = registry_with_tick();
    let module = Module::new(Expr::flwor(
        vec![
            Clause::for_in("i", Expr::integer(1).to(Expr::integer(4))),
            Clause::let_("x", Expr::call("test:tick", vec![])),
        ],
        Expr::call("count", vec![Expr::var("x")]),
    ));
    let result = run_with(&module, &registry, &ExternalBindings::new()).unwrap();
    assert_eq!(result, ints(&[3, 3, 3, 3]));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn bound_register_reads_are_stable() {
    let mut alloc = RegisterAllocator::new();
    let x: LocalRegister<Sequence> = LocalRegister::new(alloc.allocate_one());
    let read = LocalVarOp::new(&mut alloc, "x", x);
    let globals = GlobalRegisters::new(0);
    let mut frame = Frame::new(alloc.frame_size(), &globals);

    x.set(&mut frame, ints(&[4, 5]));
    let first = read.evaluate_eagerly(&mut frame).unwrap();
    let second = read.evaluate_eagerly(&mut frame).unwrap();
    assert_eq!(first, second);
    assert_eq!(x.get(&frame), Some(&ints(&[4, 5])));
}

#[test]
fn for_at_where_count_chain() {
    // for $x at $i in (10, 20, 30, 40)
    // where $i mod 2 = 0
    // count $n
    // return ($n, $x)
    let module = Module::new(Expr::flwor(
        vec![
            Clause::for_at(
                "x",
                "i",
                Expr::sequence(vec![
                    Expr::integer(10),
                    Expr::integer(20),
                    Expr::integer(30),
                    Expr::integer(40),
                ]),
            ),
            Clause::where_(
                Expr::var("i").modulo(Expr::integer(2)).general_cmp(Comparator::Eq, Expr::integer(0)),
            ),
            Clause::count("n"),
        ],
        Expr::sequence(vec![Expr::var("n"), Expr::var("x")]),
    ));
    assert_eq!(run(&module).unwrap(), ints(&[1, 20, 2, 40]));
}

#[test]
fn nested_for_is_a_cross_product() {
    // for $a in 1 to 2, $b in 1 to 3 return $a * 10 + $b
    let module = Module::new(Expr::flwor(
        vec![
            Clause::for_in("a", Expr::integer(1).to(Expr::integer(2))),
            Clause::for_in("b", Expr::integer(1).to(Expr::integer(3))),
        ],
        Expr::var("a").mul(Expr::integer(10)).add(Expr::var("b")),
    ));
    assert_eq!(run(&module).unwrap(), ints(&[11, 12, 13, 21, 22, 23]));
}

#[test]
fn for_streams_without_materializing() {
    let module = Module::new(Expr::flwor(
        vec![Clause::for_in("i", Expr::integer(1).to(Expr::integer(1_000_000)))],
        Expr::var("i"),
    ));
    let plan = compile(&module, &FunctionRegistry::with_builtins()).unwrap();
    let globals = GlobalRegisters::new(0);
    let mut exec = Executor::new(&plan, &globals, RuntimeConfig::default());

    assert_eq!(exec.first().unwrap(), Some(Item::integer(1)));
    assert_eq!(exec.stats().sequences_materialized, 0);
}
