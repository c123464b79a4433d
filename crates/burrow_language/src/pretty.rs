//! Disassembly of compiled rules.
//!
//! Instructions render as one short mnemonic each; a rule renders as its
//! qualified name followed by a numbered listing.
//!
//! # Example
//!
//! ```
//! use burrow_language::compiler::{literal, rule};
//!
//! let listing = rule("A", [literal("a")]).to_string();
//! assert!(listing.starts_with("rule A:\n"));
//! assert!(listing.contains("0: test 'a'"));
//! ```

use std::fmt;

use crate::grammar::Rule;
use crate::opcode::Instruction;

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Fail => write!(f, "fail"),
            Self::Return => write!(f, "return"),
            Self::TakeToken => write!(f, "take"),
            Self::TestLiteral(value) => write!(f, "test '{}'", value.escape_debug()),
            Self::TestEnd => write!(f, "test $"),
            Self::Jump(target) => write!(f, "jump {target}"),
            Self::JumpIfNegative(target) => write!(f, "jump-if-negative {target}"),
            Self::SetLocal(name) => write!(f, "set {name}"),
            Self::ZeroOrMoreInit => write!(f, "loop-init"),
            Self::ZeroOrMoreTest => write!(f, "loop-test"),
            Self::FindMore => write!(f, "find-more"),
            Self::NoMore => write!(f, "no-more"),
            Self::CallRule(site) => match site.resolved() {
                Some(id) => write!(f, "call {} ({id})", site.path),
                None => write!(f, "call {}", site.path),
            },
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {}:", self.qualified_name())?;
        let width = self.code().len().to_string().len();
        for (ip, op) in self.code().iter().enumerate() {
            write!(f, "\n  {ip:>width$}: {op}")?;
        }
        Ok(())
    }
}
