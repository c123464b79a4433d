//! REPL and CLI support for Burrow.
//!
//! This crate provides:
//! - [`Repl`] - Interactive loop that parses each line against a grammar
//! - [`LineEditor`] - The editor seam, with a rustyline implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod editor;
pub mod repl;

pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{COMMANDS, Repl};
