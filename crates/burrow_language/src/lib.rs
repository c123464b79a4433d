//! Grammar compiler and packrat parsing VM for Burrow.
//!
//! This crate provides:
//! - [`compiler`] - Parsing combinators and their compiler to flat bytecode
//! - [`Grammar`] - Named parsers linked by import aliases
//! - [`TokenIndex`] - The indexed input plus its memo table
//! - [`Vm`] - An explicit-stack interpreter with packrat memoization
//!
//! # Example
//!
//! ```
//! use burrow_language::compiler::{end, literal, rule};
//! use burrow_language::{Grammar, NamedParser, parse_str};
//!
//! let grammar = Grammar::single(NamedParser::new(
//!     "demo",
//!     vec![rule("S", [literal("a"), end()])],
//! ));
//! assert!(parse_str(&grammar, "S", "a").unwrap().is_match());
//! assert!(!parse_str(&grammar, "S", "ab").unwrap().is_match());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod compiler;
pub mod grammar;
pub mod grammars;
pub mod memo;
pub mod opcode;
pub mod pretty;
pub mod resolver;
pub mod token_index;
pub mod vm;


pub use compiler::{Combinator, Compiler, Continuation};
pub use grammar::{Grammar, GrammarId, NamedParser, Rule, RuleId};
pub use memo::{MemoEntry, MemoState, MemoTable, Polarity, Settled};
pub use opcode::{Bytecode, CallSite, Instruction, JumpLabel, RulePath};
pub use token_index::{IndexNode, NodeId, TokenIndex};
pub use vm::{Diagnostic, Expected, NoObserver, ParseOutcome, Vm, VmConfig, VmObserver};

use burrow_foundation::Result;

/// Tokenizes `source` one character per token and parses it with the rule
/// at `start`.
///
/// # Errors
///
/// Returns any fault raised while resolving or running the grammar.
pub fn parse_str(grammar: &Grammar, start: &str, source: &str) -> Result<ParseOutcome> {
    let mut index = TokenIndex::from_source(source);
    Vm::new().parse(grammar, &RulePath::from(start), &mut index)
}
