//! Burrow - combinator grammars on a packrat parsing VM
//!
//! This crate re-exports all layers of the Burrow system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: burrow_runtime     - REPL, CLI
//! Layer 2: burrow_debug       - VM tracing, trace buffer, formatters
//! Layer 1: burrow_language    - Combinator compiler, grammar, memo table, VM
//! Layer 0: burrow_foundation  - Core types (Value, Token, Error)
//! ```

pub use burrow_debug as debug;
pub use burrow_foundation as foundation;
pub use burrow_language as language;
pub use burrow_runtime as runtime;
