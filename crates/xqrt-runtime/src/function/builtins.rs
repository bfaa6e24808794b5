//! Built-in functions.
//!
//! - `fn:count`, `fn:empty`, `fn:exists`: sequence cardinality
//! - `fn:not`, `fn:boolean`, `fn:true`, `fn:false`: booleans
//! - `fn:sum`: numeric aggregation
//! - `fn:data`, `fn:string`, `fn:string-length`, `fn:concat`,
//!   `fn:local-name`: accessors and strings
//! - `fn:error`: raises `FOER0000`

use std::fmt;
use std::sync::Arc;

use xqrt_core::{AtomicValue, ErrorCode, Item, Sequence};

use super::{Function, FunctionRegistry, FunctionSignature};
use crate::error::{CoreResultExt, RuntimeError, RuntimeResult};
use crate::operators::ArithmeticOperator;

const OPERATOR: &str = "Call";

type Body = fn(&[Sequence]) -> RuntimeResult<Sequence>;

/// A function implemented by a plain Rust function.
#[derive(Clone, Copy)]
pub struct BuiltinFunction {
    name: &'static str,
    arity: usize,
    description: &'static str,
    body: Body,
}

impl BuiltinFunction {
    /// Creates a built-in function.
    #[must_use]
    pub const fn new(name: &'static str, arity: usize, description: &'static str, body: Body) -> Self {
        Self { name, arity, description, body }
    }
}

impl Function for BuiltinFunction {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature::new(self.name, self.arity).with_description(self.description)
    }

    fn invoke(&self, args: &[Sequence]) -> RuntimeResult<Sequence> {
        if args.len() != self.arity {
            return Err(RuntimeError::framework(format!(
                "{}#{} called with {} arguments",
                self.name,
                self.arity,
                args.len()
            )));
        }
        (self.body)(args)
    }
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFunction({}#{})", self.name, self.arity)
    }
}

const BUILTINS: &[BuiltinFunction] = &[
    BuiltinFunction::new("fn:count", 1, "Returns the number of items", count),
    BuiltinFunction::new("fn:empty", 1, "Returns true for the empty sequence", empty),
    BuiltinFunction::new("fn:exists", 1, "Returns true for a non-empty sequence", exists),
    BuiltinFunction::new("fn:not", 1, "Negates the effective boolean value", not),
    BuiltinFunction::new("fn:boolean", 1, "Returns the effective boolean value", boolean),
    BuiltinFunction::new("fn:true", 0, "Returns true", true_),
    BuiltinFunction::new("fn:false", 0, "Returns false", false_),
    BuiltinFunction::new("fn:sum", 1, "Sums numeric values", sum),
    BuiltinFunction::new("fn:data", 1, "Atomizes a sequence", data),
    BuiltinFunction::new("fn:string", 1, "Returns the string value", string),
    BuiltinFunction::new("fn:string-length", 1, "Returns the length of the string value", string_length),
    BuiltinFunction::new("fn:concat", 2, "Concatenates string values", concat),
    BuiltinFunction::new("fn:concat", 3, "Concatenates string values", concat),
    BuiltinFunction::new("fn:local-name", 1, "Returns the local name of a node", local_name),
    BuiltinFunction::new("fn:error", 0, "Raises an error", error),
    BuiltinFunction::new("fn:error", 1, "Raises an error", error),
    BuiltinFunction::new("fn:error", 2, "Raises an error with a description", error),
];

/// Registers all built-in functions with the given registry.
pub fn register_builtins(registry: &mut FunctionRegistry) {
    for builtin in BUILTINS {
        registry.register(Arc::new(*builtin));
    }
}

fn bool_seq(value: bool) -> Sequence {
    Sequence::singleton(Item::boolean(value))
}

// Bodies only run after `invoke` has checked the arity.
fn arg(args: &[Sequence], index: usize) -> &Sequence {
    &args[index]
}

fn count(args: &[Sequence]) -> RuntimeResult<Sequence> {
    let len = i64::try_from(arg(args, 0).len())
        .map_err(|_| RuntimeError::dynamic(ErrorCode::FOAR0002, OPERATOR, "count overflow"))?;
    Ok(Sequence::singleton(Item::integer(len)))
}

fn empty(args: &[Sequence]) -> RuntimeResult<Sequence> {
    Ok(bool_seq(arg(args, 0).is_empty()))
}

fn exists(args: &[Sequence]) -> RuntimeResult<Sequence> {
    Ok(bool_seq(!arg(args, 0).is_empty()))
}

fn true_(_: &[Sequence]) -> RuntimeResult<Sequence> {
    Ok(bool_seq(true))
}

fn false_(_: &[Sequence]) -> RuntimeResult<Sequence> {
    Ok(bool_seq(false))
}

fn not(args: &[Sequence]) -> RuntimeResult<Sequence> {
    Ok(bool_seq(!arg(args, 0).effective_boolean_value().at(OPERATOR)?))
}

fn boolean(args: &[Sequence]) -> RuntimeResult<Sequence> {
    Ok(bool_seq(arg(args, 0).effective_boolean_value().at(OPERATOR)?))
}

fn sum(args: &[Sequence]) -> RuntimeResult<Sequence> {
    let mut total = AtomicValue::Integer(0);
    for value in arg(args, 0).atomize() {
        let value = match value {
            AtomicValue::UntypedAtomic(_) => AtomicValue::Double(value.to_double().at(OPERATOR)?),
            AtomicValue::Integer(_) | AtomicValue::Double(_) => value,
            other => {
                return Err(RuntimeError::dynamic(
                    ErrorCode::FORG0006,
                    OPERATOR,
                    format!("fn:sum cannot add {}", other.atomic_type()),
                ))
            }
        };
        total = ArithmeticOperator::Add.apply(&total, &value)?;
    }
    Ok(Sequence::singleton(Item::Atomic(total)))
}

fn data(args: &[Sequence]) -> RuntimeResult<Sequence> {
    Ok(arg(args, 0).atomize().into_iter().map(Item::Atomic).collect())
}

fn string_of(seq: &Sequence) -> RuntimeResult<String> {
    match seq.items() {
        [] => Ok(String::new()),
        [item] => Ok(item.string_value()),
        items => Err(RuntimeError::dynamic(
            ErrorCode::XPTY0004,
            OPERATOR,
            format!("expected at most one item, got {}", items.len()),
        )),
    }
}

fn string(args: &[Sequence]) -> RuntimeResult<Sequence> {
    Ok(Sequence::singleton(Item::string(string_of(arg(args, 0))?)))
}

fn string_length(args: &[Sequence]) -> RuntimeResult<Sequence> {
    let len = string_of(arg(args, 0))?.chars().count();
    #[allow(clippy::cast_possible_wrap)]
    let len = len as i64;
    Ok(Sequence::singleton(Item::integer(len)))
}

fn concat(args: &[Sequence]) -> RuntimeResult<Sequence> {
    let mut out = String::new();
    for seq in args {
        if let Some(value) = seq.atomize_optional().at(OPERATOR)? {
            out.push_str(&value.string_value());
        }
    }
    Ok(Sequence::singleton(Item::string(out)))
}

fn local_name(args: &[Sequence]) -> RuntimeResult<Sequence> {
    let name = match arg(args, 0).items() {
        [] => String::new(),
        [Item::Node(node)] => node.local_name().unwrap_or_default().to_owned(),
        [other] => {
            return Err(RuntimeError::dynamic(
                ErrorCode::XPTY0004,
                OPERATOR,
                format!("fn:local-name expects a node, got {}", other.type_name()),
            ))
        }
        items => {
            return Err(RuntimeError::dynamic(
                ErrorCode::XPTY0004,
                OPERATOR,
                format!("fn:local-name expects at most one node, got {} items", items.len()),
            ))
        }
    };
    Ok(Sequence::singleton(Item::string(name)))
}

fn error(args: &[Sequence]) -> RuntimeResult<Sequence> {
    let mut message = String::from("error raised by fn:error");
    if let Some(code) = args.first().and_then(Sequence::first) {
        message = format!("{message} ({})", code.string_value());
    }
    if let Some(description) = args.get(1) {
        message = format!("{message}: {}", string_of(description)?);
    }
    Err(RuntimeError::dynamic(ErrorCode::FOER0000, OPERATOR, message))
}
