//! Core types, errors, and input tokens for Burrow.
//!
//! This crate provides:
//! - [`Value`] - Values produced while parsing
//! - [`Token`] and [`SourcePosition`] - The input contract of the parser core
//! - [`tokenize`] - A one-token-per-character tokenizer
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod token;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, ResolutionFault, SemanticLimit};
pub use token::{SourcePosition, Token, TokenKind, tokenize};
pub use value::Value;

/// Result type for Burrow operations.
pub type Result<T> = std::result::Result<T, Error>;
