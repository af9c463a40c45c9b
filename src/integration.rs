//! Integration layer
//!
//! Wires the pure update function to the command executor and exposes the
//! history list to callers.

pub mod runtime;

pub use runtime::Runtime;
