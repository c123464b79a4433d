//! Integration tests for tokens and source positions

use burrow_foundation::{SourcePosition, Token, TokenKind, tokenize};

#[test]
fn tokenize_one_token_per_char() {
    let tokens = tokenize("=1+2");
    let texts: Vec<&str> = tokens.iter().map(|t| &*t.text).collect();
    assert_eq!(texts, vec!["=", "1", "+", "2", ""]);
    assert!(tokens.iter().enumerate().all(|(i, t)| t.offset == i));
}

#[test]
fn tokenize_handles_multibyte_chars() {
    let tokens = tokenize("λx");
    assert_eq!(tokens.len(), 3);
    assert!(tokens[0].matches("λ"));
    assert_eq!(tokens[1].offset, 1);
}

#[test]
fn tokenize_empty_source_is_just_the_marker() {
    let tokens = tokenize("");
    assert_eq!(tokens, vec![Token::end_of_stream(0)]);
}

#[test]
fn end_marker_never_matches() {
    let end = Token::end_of_stream(3);
    assert_eq!(end.kind, TokenKind::EndOfStream);
    assert!(end.is_end());
    assert!(!end.matches(""));
}

#[test]
fn text_token_matches_exactly() {
    let token = Token::new("ab", 0);
    assert!(token.matches("ab"));
    assert!(!token.matches("a"));
    assert!(!token.is_end());
}

#[test]
fn position_advances_columns_and_lines() {
    let start = SourcePosition::at_start();
    let next = start.advance("a");
    assert_eq!(next, SourcePosition::new(1, 1, 2));

    let after_newline = next.advance("\n");
    assert_eq!(after_newline, SourcePosition::new(2, 2, 1));
    assert_eq!(after_newline.to_string(), "2:1");
}
