//! Values produced while parsing.

use std::fmt;
use std::sync::Arc;

/// A value carried through the VM.
///
/// `TakeToken` copies the current token's text into the frame's most recent
/// value; rules hand that value back to their caller when they settle.
/// Values are immutable and cheaply cloneable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Value {
    /// No value has been produced yet.
    #[default]
    Nil,
    /// The text of a consumed or tested token.
    Token(Arc<str>),
}

impl Value {
    /// Creates a token value.
    #[must_use]
    pub fn token(text: impl Into<Arc<str>>) -> Self {
        Self::Token(text.into())
    }

    /// Returns true if this is nil.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns the token text, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Nil => None,
            Self::Token(text) => Some(text),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Token(text) => write!(f, "'{}'", text.escape_debug()),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::token(text)
    }
}
