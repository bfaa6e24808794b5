//! Typeswitch clause selection.

use xqrt_core::{AtomicType, ItemType, SequenceType};
use xqrt_runtime::plan::{Expr, Module, TypeswitchCase, TypeswitchDefault};

use crate::common::{ints, run, strings};

fn case(var: Option<&str>, sequence_type: SequenceType, body: Expr) -> TypeswitchCase {
    TypeswitchCase { var: var.map(str::to_owned), sequence_type, body }
}

fn typeswitch(operand: Expr, cases: Vec<TypeswitchCase>, default: Expr) -> Expr {
    Expr::Typeswitch {
        operand: Box::new(operand),
        cases,
        default: Box::new(TypeswitchDefault { var: None, body: default }),
    }
}

#[test]
fn first_matching_case_wins() {
    // xs:numeric is listed before the more specific xs:integer
    let expr = typeswitch(
        Expr::integer(5),
        vec![
            case(None, SequenceType::atomic(AtomicType::String), Expr::string("string")),
            case(None, SequenceType::atomic(AtomicType::Numeric), Expr::string("numeric")),
            case(None, SequenceType::atomic(AtomicType::Integer), Expr::string("integer")),
        ],
        Expr::string("other"),
    );
    assert_eq!(run(&Module::new(expr)).unwrap(), strings(&["numeric"]));
}

#[test]
fn case_variable_receives_the_operand() {
    let expr = typeswitch(
        Expr::integer(1).to(Expr::integer(3)),
        vec![
            case(None, SequenceType::Empty, Expr::string("empty")),
            case(
                Some("xs"),
                SequenceType::one_or_more(ItemType::Atomic(AtomicType::Integer)),
                Expr::call("sum", vec![Expr::var("xs")]),
            ),
        ],
        Expr::string("other"),
    );
    assert_eq!(run(&Module::new(expr)).unwrap(), ints(&[6]));
}

#[test]
fn default_clause_and_its_variable() {
    let expr = Expr::Typeswitch {
        operand: Box::new(Expr::string("abc")),
        cases: vec![case(None, SequenceType::atomic(AtomicType::Integer), Expr::integer(0))],
        default: Box::new(TypeswitchDefault {
            var: Some("v".into()),
            body: Expr::call("string-length", vec![Expr::var("v")]),
        }),
    };
    assert_eq!(run(&Module::new(expr)).unwrap(), ints(&[3]));
}

#[test]
fn empty_operand_matches_empty_sequence() {
    let expr = typeswitch(
        Expr::empty(),
        vec![
            case(None, SequenceType::atomic(AtomicType::Integer), Expr::string("one")),
            case(None, SequenceType::Empty, Expr::string("none")),
        ],
        Expr::string("other"),
    );
    assert_eq!(run(&Module::new(expr)).unwrap(), strings(&["none"]));
}
