//! Iterator lifecycle: open, next, close, reopen.

use std::sync::Arc;
use std::thread;

use xqrt_core::{AtomicType, DocumentBuilder, Item, Sequence, SequenceType};
use xqrt_runtime::operators::{
    Comparator, ConcatOp, CountOp, ForOp, Iter, LetOp, LiteralOp, RangeOp, TupleIter, UnitOp,
    WhereOp,
};
use xqrt_runtime::plan::{
    compile, Clause, Expr, ExternalDecl, FunctionDecl, Module, Param, TypeswitchCase,
    TypeswitchDefault,
};
use xqrt_runtime::register::{GlobalRegisters, LocalRegister, RegisterAllocator};
use xqrt_runtime::{
    execute, materialize, Executor, ExternalBindings, Frame, FunctionRegistry, OperatorState,
    RuntimeConfig, RuntimeIterator, TupleIterator,
};

use crate::common::ints;

fn range(alloc: &mut RegisterAllocator, low: i64, high: i64) -> Iter {
    let low = LiteralOp::new(alloc, Sequence::singleton(Item::integer(low))).into();
    let high = LiteralOp::new(alloc, Sequence::singleton(Item::integer(high))).into();
    RangeOp::new(alloc, low, high).into()
}

#[test]
fn close_without_open_and_double_close() {
    let mut alloc = RegisterAllocator::new();
    let children = vec![range(&mut alloc, 1, 2), range(&mut alloc, 3, 3)];
    let concat: Iter = ConcatOp::new(&mut alloc, children).into();
    let globals = GlobalRegisters::new(0);
    let mut frame = Frame::new(alloc.frame_size(), &globals);

    concat.close(&mut frame);
    concat.close(&mut frame);
    assert_eq!(concat.state(&frame), OperatorState::Closed);

    // still usable afterwards
    assert_eq!(materialize(&concat, &mut frame).unwrap(), ints(&[1, 2, 3]));
    concat.close(&mut frame);
    assert_eq!(concat.state(&frame), OperatorState::Closed);
}

#[test]
fn no_resurrection_after_exhaustion() {
    let mut alloc = RegisterAllocator::new();
    let iter = range(&mut alloc, 1, 2);
    let globals = GlobalRegisters::new(0);
    let mut frame = Frame::new(alloc.frame_size(), &globals);

    iter.open(&mut frame).unwrap();
    assert_eq!(iter.next(&mut frame).unwrap(), Some(Item::integer(1)));
    assert_eq!(iter.next(&mut frame).unwrap(), Some(Item::integer(2)));
    for _ in 0..3 {
        assert_eq!(iter.next(&mut frame).unwrap(), None);
    }
    assert_eq!(iter.state(&frame), OperatorState::Finished);
    iter.close(&mut frame);

    // a reopened iterator starts over
    iter.open(&mut frame).unwrap();
    assert_eq!(iter.next(&mut frame).unwrap(), Some(Item::integer(1)));
    iter.close(&mut frame);
}

#[test]
fn materialization_matches_pulled_items_across_opens() {
    let mut alloc = RegisterAllocator::new();
    let children = vec![range(&mut alloc, 1, 3), range(&mut alloc, 2, 1), range(&mut alloc, 7, 8)];
    let concat: Iter = ConcatOp::new(&mut alloc, children).into();
    let globals = GlobalRegisters::new(0);
    let mut frame = Frame::new(alloc.frame_size(), &globals);

    let mut pulled = Vec::new();
    concat.open(&mut frame).unwrap();
    while let Some(item) = concat.next(&mut frame).unwrap() {
        pulled.push(item);
    }
    concat.close(&mut frame);

    let first = materialize(&concat, &mut frame).unwrap();
    let second = materialize(&concat, &mut frame).unwrap();
    assert_eq!(first, Sequence::from(pulled));
    assert_eq!(first, second);
    assert_eq!(first, ints(&[1, 2, 3, 7, 8]));
}

#[test]
fn executor_close_is_idempotent() {
    let module = Module::new(Expr::integer(1).to(Expr::integer(3)));
    let plan = compile(&module, &FunctionRegistry::with_builtins()).unwrap();
    let globals = GlobalRegisters::new(0);
    let mut exec = Executor::new(&plan, &globals, RuntimeConfig::default());

    exec.close();
    exec.open().unwrap();
    assert_eq!(exec.next().unwrap(), Some(Item::integer(1)));
    exec.close();
    exec.close();
    assert_eq!(exec.state(), OperatorState::Closed);
    assert_eq!(exec.collect().unwrap(), ints(&[1, 2, 3]));
}

#[test]
fn one_plan_many_threads() {
    // for $i in 1 to 50 return $i * $i
    let module = Module::new(Expr::flwor(
        vec![Clause::for_in("i", Expr::integer(1).to(Expr::integer(50)))],
        Expr::var("i").mul(Expr::var("i")),
    ));
    let plan = Arc::new(compile(&module, &FunctionRegistry::with_builtins()).unwrap());
    let expected: Sequence = (1..=50).map(|i| Item::integer(i * i)).collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let plan = Arc::clone(&plan);
            thread::spawn(move || {
                execute(&plan, &ExternalBindings::new(), RuntimeConfig::default()).unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

/// One plan per operator kind, each rooted at that operator.
fn sample_plans() -> Vec<(&'static str, Expr)> {
    let typeswitch = Expr::Typeswitch {
        operand: Box::new(Expr::integer(1).to(Expr::integer(3))),
        cases: vec![TypeswitchCase {
            var: Some("n".into()),
            sequence_type: SequenceType::atomic(AtomicType::Integer),
            body: Expr::var("n"),
        }],
        default: Box::new(TypeswitchDefault { var: Some("all".into()), body: Expr::var("all") }),
    };
    vec![
        ("Literal", Expr::string("a")),
        ("Range", Expr::integer(1).to(Expr::integer(4))),
        ("GlobalVar", Expr::var("doc")),
        ("Concat", Expr::sequence(vec![Expr::integer(1), Expr::integer(2).to(Expr::integer(3))])),
        ("Arithmetic", Expr::integer(6).idiv(Expr::integer(4))),
        ("Negate", Expr::integer(5).neg()),
        ("Compare", Expr::integer(1).general_cmp(Comparator::Lt, Expr::integer(2))),
        ("Logic", Expr::boolean(true).and(Expr::boolean(false))),
        (
            "If",
            Expr::if_then_else(Expr::boolean(true), Expr::integer(1).to(Expr::integer(2)), Expr::empty()),
        ),
        ("Typeswitch", typeswitch),
        (
            "Flwor",
            Expr::flwor(
                vec![
                    Clause::for_at("x", "i", Expr::integer(1).to(Expr::integer(4))),
                    Clause::let_("y", Expr::var("x").mul(Expr::integer(2))),
                    Clause::where_(Expr::var("i").general_cmp(Comparator::Gt, Expr::integer(1))),
                    Clause::count("n"),
                ],
                Expr::sequence(vec![Expr::var("n"), Expr::var("y")]),
            ),
        ),
        ("Path", Expr::var("doc").child("a").child("b")),
        ("Call", Expr::call("count", vec![Expr::integer(1).to(Expr::integer(5))])),
        ("UserCall", Expr::call("local:twice", vec![Expr::integer(21)])),
    ]
}

#[test]
fn every_operator_survives_close_without_open_and_double_close() {
    let mut b = DocumentBuilder::new();
    b.start_element("a").start_element("b").text("x").end_element().end_element();
    let doc = b.finish();
    let bindings = ExternalBindings::new().with("doc", Sequence::singleton(doc.root()));
    let twice = FunctionDecl {
        name: "local:twice".into(),
        params: vec![Param::new("v")],
        return_type: None,
        body: Expr::var("v").mul(Expr::integer(2)),
    };

    for (kind, body) in sample_plans() {
        let module =
            Module::new(body).with_external(ExternalDecl::new("doc")).with_function(twice.clone());
        let plan = compile(&module, &FunctionRegistry::with_builtins()).unwrap();
        let globals = plan.bind_externals(&bindings).unwrap();
        let mut frame = plan.new_frame(&globals, RuntimeConfig::default());
        let root = plan.root();
        assert_eq!(root.name(), kind);

        root.close(&mut frame);
        root.close(&mut frame);
        assert_eq!(root.state(&frame), OperatorState::Closed, "{kind}");

        let first = materialize(root, &mut frame).unwrap();
        root.close(&mut frame);
        root.close(&mut frame);
        let second = materialize(root, &mut frame).unwrap();
        assert_eq!(first, second, "{kind}");
        assert_eq!(root.state(&frame), OperatorState::Closed, "{kind}");
    }
}

#[test]
fn every_tuple_operator_survives_close_without_open_and_double_close() {
    let mut alloc = RegisterAllocator::new();
    let unit = |alloc: &mut RegisterAllocator| -> TupleIter { UnitOp::new(alloc).into() };
    let var = |alloc: &mut RegisterAllocator| -> LocalRegister<Sequence> {
        LocalRegister::new(alloc.allocate_one())
    };

    let mut tuples: Vec<(&str, TupleIter)> = Vec::new();
    tuples.push(("Unit", unit(&mut alloc)));
    let (upstream, binding, x, i) =
        (unit(&mut alloc), range(&mut alloc, 1, 3), var(&mut alloc), var(&mut alloc));
    tuples.push(("For", ForOp::new(&mut alloc, upstream, binding, x, Some(i)).into()));
    let (upstream, binding, x) = (unit(&mut alloc), range(&mut alloc, 1, 3), var(&mut alloc));
    tuples.push(("Let", LetOp::new(&mut alloc, upstream, binding, x).into()));
    let condition = LiteralOp::new(&mut alloc, Sequence::singleton(Item::boolean(true))).into();
    let upstream = unit(&mut alloc);
    tuples.push(("Where", WhereOp::new(&mut alloc, upstream, condition).into()));
    let (upstream, n) = (unit(&mut alloc), var(&mut alloc));
    tuples.push(("Count", CountOp::new(&mut alloc, upstream, n).into()));

    let globals = GlobalRegisters::new(0);
    let mut frame = Frame::new(alloc.frame_size(), &globals);
    for (kind, tuple) in &tuples {
        assert_eq!(tuple.name(), *kind);
        tuple.close(&mut frame);
        tuple.close(&mut frame);
        assert_eq!(tuple.state(&frame), OperatorState::Closed, "{kind}");

        let mut count = 0;
        tuple.open(&mut frame).unwrap();
        while tuple.next(&mut frame).unwrap() {
            count += 1;
        }
        tuple.close(&mut frame);
        tuple.close(&mut frame);
        assert_eq!(tuple.state(&frame), OperatorState::Closed, "{kind}");
        assert_eq!(count, if *kind == "For" { 3 } else { 1 }, "{kind}");
    }
}
