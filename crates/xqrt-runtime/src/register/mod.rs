//! Registers: compile-time allocation and typed frame access.
//!
//! The plan compiler hands every operator a [`RegisterAllocator`]; operators
//! reserve slots for the variables they bind and for their own
//! per-invocation state. At runtime a [`Frame`](crate::Frame) holds one
//! [`RegisterValue`] per reserved slot and operators reach their slots
//! through [`LocalRegister`] handles.

mod accessor;
mod allocator;
mod value;

pub use accessor::{GlobalRegister, GlobalRegisters, LocalRegister};
pub use allocator::{GlobalRegisterAllocator, RegisterAllocator, RegisterRange};
pub use value::{RegisterType, RegisterValue};
