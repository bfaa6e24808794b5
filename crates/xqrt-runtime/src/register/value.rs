//! Register contents.

use xqrt_core::{Item, Sequence};

use crate::iter::OperatorState;

/// The value held by one register.
///
/// Registers are dynamically typed. Variable registers hold sequences;
/// operators also keep their per-invocation state (lifecycle, cursors,
/// flags, buffered results) in registers so that operator nodes stay
/// immutable.
#[derive(Debug, Clone, Default)]
pub enum RegisterValue {
    /// Nothing written yet, or cleared.
    #[default]
    Unset,
    /// An operator lifecycle state.
    State(OperatorState),
    /// A flag.
    Flag(bool),
    /// A cursor or counter.
    Cursor(usize),
    /// A signed integer.
    Integer(i64),
    /// A single item.
    Item(Item),
    /// A materialized sequence.
    Sequence(Sequence),
}

impl RegisterValue {
    /// Returns true if nothing has been written.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

/// A type that can be stored in a register.
///
/// Accessors are parameterized by the type they expect; a slot holding
/// another type reads as absent.
pub trait RegisterType: Sized {
    /// Borrows the value if the register holds this type.
    fn from_register(value: &RegisterValue) -> Option<&Self>;

    /// Takes the value if the register holds this type.
    fn take_register(value: RegisterValue) -> Option<Self>;

    /// Wraps the value for storage.
    fn into_register(self) -> RegisterValue;
}

macro_rules! register_type {
    ($ty:ty, $variant:ident) => {
        impl RegisterType for $ty {
            fn from_register(value: &RegisterValue) -> Option<&Self> {
                match value {
                    RegisterValue::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn take_register(value: RegisterValue) -> Option<Self> {
                match value {
                    RegisterValue::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_register(self) -> RegisterValue {
                RegisterValue::$variant(self)
            }
        }
    };
}

register_type!(OperatorState, State);
register_type!(bool, Flag);
register_type!(usize, Cursor);
register_type!(i64, Integer);
register_type!(Item, Item);
register_type!(Sequence, Sequence);
