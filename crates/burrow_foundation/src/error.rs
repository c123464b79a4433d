//! Error types for the Burrow system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every fault raised while compiling or running a grammar is fatal to the
//! parse that raised it; none of them are retried.

use std::fmt;

use thiserror::Error;

/// The main error type for Burrow operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a rule resolution error.
    #[must_use]
    pub fn resolution(fault: ResolutionFault) -> Self {
        Self::new(ErrorKind::Resolution(fault))
    }

    /// Creates a loop-did-not-advance error.
    #[must_use]
    pub fn loop_no_progress(rule: impl Into<String>) -> Self {
        Self::new(ErrorKind::LoopNoProgress { rule: rule.into() })
    }

    /// Creates a left recursion error.
    #[must_use]
    pub fn left_recursion(rule: impl Into<String>) -> Self {
        Self::new(ErrorKind::LeftRecursionUnsupported { rule: rule.into() })
    }

    /// Creates a stack underflow error for the named stack.
    #[must_use]
    pub fn stack_underflow(stack: &'static str) -> Self {
        Self::new(ErrorKind::StackUnderflow(stack))
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput(message.into()))
    }

    /// Creates a semantic limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: SemanticLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this error came from rule resolution.
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        matches!(self.kind, ErrorKind::Resolution(_))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A rule path could not be resolved against the grammar.
    #[error("resolution failed: {0}")]
    Resolution(ResolutionFault),

    /// A repetition body succeeded without consuming input.
    #[error("loop did not advance in rule {rule}")]
    LoopNoProgress {
        /// Qualified name of the rule running the loop.
        rule: String,
    },

    /// A rule was re-entered at the same position before it settled.
    #[error("left recursion in rule {rule}: grow not yet implemented")]
    LeftRecursionUnsupported {
        /// Qualified name of the re-entered rule.
        rule: String,
    },

    /// Popped an empty call, step, or loop stack.
    #[error("{0} stack underflow")]
    StackUnderflow(&'static str),

    /// The instruction pointer left the rule's code.
    #[error("instruction pointer {ip} out of range (rule has {len} instructions)")]
    InvalidInstructionPointer {
        /// The offending instruction pointer.
        ip: usize,
        /// Number of instructions in the rule.
        len: usize,
    },

    /// The token sequence handed to the parser is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Semantic limit exceeded (kill switch triggered).
    #[error("limit exceeded: {0}")]
    LimitExceeded(SemanticLimit),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Ways a dotted rule path can fail to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFault {
    /// The path has no segments.
    EmptyPath {
        /// Rule containing the call.
        from: String,
    },
    /// A path segment names an import the parser does not have.
    UnknownImport {
        /// The missing alias.
        alias: String,
        /// The full dotted path.
        path: String,
        /// Rule containing the call.
        from: String,
    },
    /// An import points past the end of the parser registry.
    ParserIndexOutOfRange {
        /// The imported index.
        index: usize,
        /// Number of registered parsers.
        len: usize,
    },
    /// The final segment names no rule in the target parser.
    UnknownRule {
        /// The full dotted path.
        path: String,
        /// Rule containing the call.
        from: String,
    },
}

impl fmt::Display for ResolutionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath { from } => write!(f, "empty rule path in rule {from}"),
            Self::UnknownImport { alias, path, from } => {
                write!(f, "unknown import {alias} in path {path} (rule {from})")
            }
            Self::ParserIndexOutOfRange { index, len } => {
                write!(f, "parser index out of range in import: {index} >= {len}")
            }
            Self::UnknownRule { path, from } => {
                write!(f, "rule not found for path {path} in rule {from}")
            }
        }
    }
}

/// Semantic limits (kill switches) that can be exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticLimit {
    /// Maximum depth of nested rule activations exceeded.
    MaxCallDepth {
        /// The configured limit.
        limit: usize,
        /// The rule whose activation would have exceeded it.
        rule: Option<String>,
    },
}

impl fmt::Display for SemanticLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxCallDepth { limit, rule } => {
                write!(f, "max call depth ({limit}) exceeded")?;
                if let Some(rule) = rule {
                    write!(f, " calling {rule}")?;
                }
                Ok(())
            }
        }
    }
}

/// Context about where an error occurred.
///
/// Runtime faults carry the rule, instruction pointer, and token position
/// that were active when the VM stopped.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Qualified name of the active rule.
    pub rule: Option<String>,
    /// Instruction pointer within the active rule.
    pub ip: Option<usize>,
    /// Sequence offset of the current token.
    pub offset: Option<usize>,
    /// Line number of the current token.
    pub line: Option<u32>,
    /// Column number of the current token.
    pub column: Option<u32>,
    /// Rule activations, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the active rule.
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Sets the instruction pointer.
    #[must_use]
    pub fn with_ip(mut self, ip: usize) -> Self {
        self.ip = Some(ip);
        self
    }

    /// Sets the token offset, line, and column.
    #[must_use]
    pub fn with_position(mut self, offset: usize, line: u32, column: u32) -> Self {
        self.offset = Some(offset);
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "in {rule}")?;
            if let Some(ip) = self.ip {
                write!(f, " at instruction {ip}")?;
            }
        }
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, ", input {line}:{col}")?;
            if let Some(offset) = self.offset {
                write!(f, " (token {offset})")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  called from {frame}")?;
            }
        }
        Ok(())
    }
}
