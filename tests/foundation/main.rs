//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Token, SourcePosition, and Error.

mod errors;
mod tokens;
mod values;
