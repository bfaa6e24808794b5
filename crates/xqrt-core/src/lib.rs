//! xqrt Core
//!
//! This crate provides the data model shared by the xqrt query runtime.
//!
//! # Overview
//!
//! - **Atomic values**: [`AtomicValue`] and the [`AtomicType`] hierarchy
//! - **Nodes**: immutable [`Document`] trees built with [`DocumentBuilder`],
//!   referenced through [`NodeRef`]
//! - **Items and sequences**: [`Item`] and the materialized [`Sequence`]
//! - **Sequence types**: [`SequenceType`] and the dynamic type test used by
//!   typeswitch
//! - **Errors**: [`CoreError`] and the [`ErrorCode`] classification
//!
//! # Example
//!
//! ```
//! use xqrt_core::{AtomicType, Item, Sequence, SequenceType};
//!
//! let seq: Sequence = vec![Item::integer(1), Item::integer(2)].into();
//! assert_eq!(seq.len(), 2);
//! assert!(!SequenceType::atomic(AtomicType::Integer).matches(&seq));
//! assert!(seq.effective_boolean_value().is_err());
//! ```

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod types;

#[cfg(test)]
mod proptest_tests;

pub use error::{CoreError, CoreResult, ErrorCode};
pub use types::{
    AtomicType, AtomicValue, Document, DocumentBuilder, Item, ItemType, NodeKind, NodeRef,
    Occurrence, Sequence, SequenceType,
};
