//! Input tokens and source positions.
//!
//! The parser core consumes an ordered sequence of [`Token`]s that must end
//! with exactly one end-of-stream marker. [`tokenize`] is the simplest
//! producer: one token per character.

use std::fmt;
use std::sync::Arc;

/// Whether a token carries text or marks the end of input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A token with raw text.
    Text,
    /// The end-of-stream marker. Never equal to any literal.
    EndOfStream,
}

/// A single input token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Raw text (empty for the end marker).
    pub text: Arc<str>,
    /// Offset in the token sequence.
    pub offset: usize,
    /// Text or end marker.
    pub kind: TokenKind,
}

impl Token {
    /// Creates a text token.
    #[must_use]
    pub fn new(text: impl Into<Arc<str>>, offset: usize) -> Self {
        Self {
            text: text.into(),
            offset,
            kind: TokenKind::Text,
        }
    }

    /// Creates the end-of-stream marker.
    #[must_use]
    pub fn end_of_stream(offset: usize) -> Self {
        Self {
            text: Arc::from(""),
            offset,
            kind: TokenKind::EndOfStream,
        }
    }

    /// Returns true if this is the end-of-stream marker.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfStream
    }

    /// Returns true if this is a text token equal to `literal`.
    #[must_use]
    pub fn matches(&self, literal: &str) -> bool {
        self.kind == TokenKind::Text && &*self.text == literal
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Text => write!(f, "{}:{}", self.offset, self.text.escape_debug()),
            TokenKind::EndOfStream => write!(f, "{}:<end>", self.offset),
        }
    }
}

/// A location in the input, for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SourcePosition {
    /// Offset in the token sequence.
    pub offset: usize,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl SourcePosition {
    /// Creates a new position.
    #[must_use]
    pub const fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// The position of the first token.
    #[must_use]
    pub const fn at_start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Returns the position that follows a token with the given text.
    #[must_use]
    pub fn advance(self, text: &str) -> Self {
        let mut next = Self {
            offset: self.offset + 1,
            ..self
        };
        for c in text.chars() {
            if c == '\n' {
                next.line += 1;
                next.column = 1;
            } else {
                next.column += 1;
            }
        }
        next
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Splits source text into one token per character, followed by the
/// end-of-stream marker.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = source
        .chars()
        .enumerate()
        .map(|(offset, c)| Token::new(c.to_string(), offset))
        .collect();
    tokens.push(Token::end_of_stream(tokens.len()));
    tokens
}
