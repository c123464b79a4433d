//! Parse results and failure diagnostics.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use burrow_foundation::{SourcePosition, Token, Value};

use crate::memo::Polarity;

/// What a failed test was looking for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expected {
    /// A token equal to the literal.
    Literal(Arc<str>),
    /// The end of input.
    End,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "'{}'", value.escape_debug()),
            Self::End => write!(f, "end of input"),
        }
    }
}

/// A failed expectation at the furthest position any test reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Where the test ran.
    pub position: SourcePosition,
    /// What it wanted.
    pub expected: Expected,
    /// What was there.
    pub found: Token,
}

impl Diagnostic {
    fn found_text(&self) -> String {
        if self.found.is_end() {
            "end of input".to_string()
        } else {
            format!("'{}'", self.found.text.escape_debug())
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.position,
            self.expected,
            self.found_text()
        )
    }
}

/// The result of a completed parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Whether the start rule matched.
    pub polarity: Polarity,
    /// The start rule's value; `Some` only when it matched.
    pub value: Option<Value>,
    /// Where the start rule stopped. On failure this is how far its own
    /// steps got before giving up, not the furthest any nested rule reached.
    pub position: SourcePosition,
    /// The furthest position any rule advanced to.
    pub longest_match: SourcePosition,
    /// Expectations that failed at the furthest failure position.
    pub diagnostics: Vec<Diagnostic>,
    /// Named captures of the start rule.
    pub bindings: BTreeMap<Arc<str>, Value>,
}

impl ParseOutcome {
    /// Returns true if the start rule matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.polarity.is_positive()
    }

    /// Returns the value captured under `name`.
    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Describes why the parse failed, or `None` if it matched.
    ///
    /// Expectations at the same position are merged into one line:
    /// `1:4: expected '+' or '-', found 'x'`.
    #[must_use]
    pub fn describe_failure(&self) -> Option<String> {
        if self.is_match() {
            return None;
        }
        let Some(first) = self.diagnostics.first() else {
            return Some(format!("nothing matched past {}", self.longest_match));
        };
        let expected = self
            .diagnostics
            .iter()
            .map(|d| d.expected.to_string())
            .collect::<Vec<_>>()
            .join(" or ");
        Some(format!(
            "{}: expected {expected}, found {}",
            first.position,
            first.found_text()
        ))
    }
}

impl fmt::Display for ParseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, self.describe_failure()) {
            (_, Some(failure)) => write!(f, "no match: {failure}"),
            (Some(value), None) => write!(f, "ok: {value}"),
            (None, None) => write!(f, "ok"),
        }
    }
}
