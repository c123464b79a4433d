//! Integration tests for Value

use burrow_foundation::Value;

#[test]
fn default_is_nil() {
    let value = Value::default();
    assert!(value.is_nil());
    assert_eq!(value.as_str(), None);
    assert_eq!(value.to_string(), "nil");
}

#[test]
fn token_values_display_quoted() {
    let value = Value::token("7");
    assert!(!value.is_nil());
    assert_eq!(value.as_str(), Some("7"));
    assert_eq!(value.to_string(), "'7'");
}

#[test]
fn display_escapes_control_chars() {
    assert_eq!(Value::from("\n").to_string(), "'\\n'");
}

#[test]
fn values_compare_by_text() {
    assert_eq!(Value::from("x"), Value::token(String::from("x")));
    assert_ne!(Value::from("x"), Value::Nil);
}
