//! Integration tests for the xqrt runtime.
//!
//! Plans are built from the public algebra, compiled and evaluated through
//! the executor, except where a test exercises the iterator protocol
//! directly.

mod bindings;
mod common;
mod errors;
mod functions;
mod globals;
mod lifecycle;
mod paths;
mod typeswitch;
