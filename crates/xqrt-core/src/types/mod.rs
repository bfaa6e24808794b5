//! Core data types for the query data model.

mod atomic;
mod item;
mod node;
mod sequence;
mod sequence_type;

pub use atomic::{AtomicType, AtomicValue};
pub use item::Item;
pub use node::{Document, DocumentBuilder, NodeKind, NodeRef};
pub use sequence::Sequence;
pub use sequence_type::{ItemType, Occurrence, SequenceType};
