//! Path navigation over bound documents.

use std::sync::Arc;

use xqrt_core::{Document, DocumentBuilder, ErrorCode, ItemType, Sequence};
use xqrt_runtime::operators::{Axis, Comparator, NodeTest};
use xqrt_runtime::plan::{Clause, Expr, ExternalDecl, Module};
use xqrt_runtime::{ExternalBindings, FunctionRegistry};

use crate::common::{ints, run_with, strings};

fn library() -> Arc<Document> {
    let mut b = DocumentBuilder::new();
    b.start_element("library")
        .start_element_with("book", [("year", "1965")])
        .start_element("title")
        .text("Dune")
        .end_element()
        .end_element()
        .start_element_with("book", [("year", "2005")])
        .start_element("title")
        .text("Anathem")
        .end_element()
        .end_element()
        .start_element_with("book", [("year", "2008")])
        .start_element("title")
        .text("Little Brother")
        .end_element()
        .end_element()
        .end_element();
    b.finish()
}

fn run_on(doc: &Arc<Document>, body: Expr) -> xqrt_runtime::RuntimeResult<Sequence> {
    let module = Module::new(body).with_external(ExternalDecl::new("doc"));
    let bindings = ExternalBindings::new().with("doc", Sequence::singleton(doc.root()));
    run_with(&module, &FunctionRegistry::with_builtins(), &bindings)
}

#[test]
fn descendant_titles_in_document_order() {
    let doc = library();
    let titles = run_on(&doc, Expr::var("doc").descendant("title")).unwrap();
    let text: Vec<_> = titles.iter().map(|i| i.string_value()).collect();
    assert_eq!(text, vec!["Dune", "Anathem", "Little Brother"]);
}

#[test]
fn flwor_over_attributes() {
    // for $b in $doc//book where $b/@year > 2000 return string($b/title)
    let doc = library();
    let year = Expr::var("b").step(Axis::Attribute, NodeTest::Name("year".into()));
    let body = Expr::flwor(
        vec![
            Clause::for_in("b", Expr::var("doc").descendant("book")),
            Clause::where_(year.general_cmp(Comparator::Gt, Expr::integer(2000))),
        ],
        Expr::call("string", vec![Expr::var("b").child("title")]),
    );
    assert_eq!(run_on(&doc, body).unwrap(), strings(&["Anathem", "Little Brother"]));
}

#[test]
fn parent_steps_are_deduplicated() {
    let doc = library();
    let body = Expr::call(
        "count",
        vec![Expr::var("doc")
            .descendant("title")
            .step(Axis::Parent, NodeTest::Name("*".into()))
            .step(Axis::Parent, NodeTest::Kind(ItemType::AnyNode))],
    );
    assert_eq!(run_on(&doc, body).unwrap(), ints(&[1]));
}

#[test]
fn local_names_of_children() {
    let doc = library();
    // for $c in $doc/* return local-name($c)
    let body = Expr::flwor(
        vec![Clause::for_in("c", Expr::var("doc").child("*"))],
        Expr::call("local-name", vec![Expr::var("c")]),
    );
    assert_eq!(run_on(&doc, body).unwrap(), strings(&["library"]));
}

#[test]
fn path_from_an_atomic_value_is_xpty0019() {
    let doc = library();
    let err = run_on(&doc, Expr::integer(1).child("a")).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::XPTY0019));
    assert_eq!(err.operator(), Some("Path"));
}
