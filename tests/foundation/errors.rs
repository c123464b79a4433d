//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use burrow_foundation::{Error, ErrorContext, ErrorKind, ResolutionFault, SemanticLimit};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_unknown_import() {
    let err = Error::resolution(ResolutionFault::UnknownImport {
        alias: "num".to_string(),
        path: "num.Digit".to_string(),
        from: "calc.Sum".to_string(),
    });
    assert!(err.is_resolution());
    let msg = format!("{err}");
    assert!(msg.contains("num.Digit"));
    assert!(msg.contains("calc.Sum"));
}

#[test]
fn error_parser_index_out_of_range() {
    let err = Error::resolution(ResolutionFault::ParserIndexOutOfRange { index: 4, len: 2 });
    assert_eq!(
        err.to_string(),
        "resolution failed: parser index out of range in import: 4 >= 2"
    );
}

#[test]
fn error_loop_no_progress() {
    let err = Error::loop_no_progress("calc.Spaces");
    assert!(matches!(&err.kind, ErrorKind::LoopNoProgress { rule } if rule == "calc.Spaces"));
    assert!(!err.is_resolution());
}

#[test]
fn error_left_recursion() {
    let err = Error::left_recursion("calc.Expr");
    assert!(err.to_string().contains("left recursion in rule calc.Expr"));
}

#[test]
fn error_stack_underflow() {
    let err = Error::stack_underflow("loop");
    assert_eq!(err.kind, ErrorKind::StackUnderflow("loop"));
    assert_eq!(err.to_string(), "loop stack underflow");
}

#[test]
fn error_limit_exceeded() {
    let err = Error::limit_exceeded(SemanticLimit::MaxCallDepth {
        limit: 64,
        rule: Some("calc.Paren".to_string()),
    });
    assert_eq!(
        err.to_string(),
        "limit exceeded: max call depth (64) exceeded calling calc.Paren"
    );
}

#[test]
fn error_invalid_input() {
    let err = Error::invalid_input("token sequence is empty");
    assert!(matches!(err.kind, ErrorKind::InvalidInput(_)));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_is_optional() {
    let err = Error::internal("oops");
    assert!(err.context.is_none());
}

#[test]
fn context_display_names_location_and_callers() {
    let context = ErrorContext::new()
        .with_rule("calc.Digits")
        .with_ip(4)
        .with_position(7, 2, 3)
        .with_frame("calc.Number")
        .with_frame("calc.Expr");

    let text = context.to_string();
    assert!(text.starts_with("in calc.Digits at instruction 4, input 2:3 (token 7)"));
    let callers: Vec<_> = text.lines().skip(1).collect();
    assert_eq!(
        callers,
        vec!["  called from calc.Number", "  called from calc.Expr"]
    );
}

#[test]
fn context_survives_with_context() {
    let err = Error::loop_no_progress("g.S").with_context(ErrorContext::new().with_ip(2));
    assert_eq!(err.context.and_then(|c| c.ip), Some(2));
}
