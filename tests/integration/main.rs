//! Cross-layer integration tests for Burrow
//!
//! Tests that verify correct interaction between multiple crates, driven
//! through the umbrella `burrow` crate.

mod arithmetic;
mod repl;
mod tracing;
