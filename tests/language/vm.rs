//! Integration tests for the VM
//!
//! Runs small grammars end to end through the public API.

use burrow_foundation::{Error, ErrorKind, SemanticLimit, SourcePosition, Value};
use burrow_language::compiler::{
    call, capture, choose, end, literal, one_or_more, optional, rule, sequence, zero_or_more,
};
use burrow_language::{
    Grammar, NamedParser, ParseOutcome, Polarity, Rule, RulePath, TokenIndex, Vm, VmConfig,
    VmObserver, parse_str,
};

fn grammar(rules: Vec<Rule>) -> Grammar {
    Grammar::single(NamedParser::new("g", rules))
}

fn fault(result: Result<ParseOutcome, Error>) -> Error {
    match result {
        Ok(outcome) => panic!("expected a fault, got {outcome}"),
        Err(err) => err,
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn literal_then_end() {
    let g = grammar(vec![rule("S", [literal("a"), end()])]);

    let matched = parse_str(&g, "S", "a").unwrap();
    assert_eq!(matched.polarity, Polarity::Positive);
    assert_eq!(matched.value, Some(Value::from("a")));
    assert_eq!(matched.position.offset, 1);

    let failed = parse_str(&g, "S", "ab").unwrap();
    assert_eq!(failed.polarity, Polarity::Negative);
    assert_eq!(failed.value, None);
}

#[test]
fn digits_take_exactly_three_iterations() {
    #[derive(Default)]
    struct Takes(usize);

    impl VmObserver for Takes {
        fn on_instruction(
            &mut self,
            _rule: &Rule,
            _ip: usize,
            op: &burrow_language::Instruction,
            _position: SourcePosition,
        ) {
            if *op == burrow_language::Instruction::TakeToken {
                self.0 += 1;
            }
        }
    }

    let g = grammar(vec![rule("Digits", [one_or_more(literal("0"))])]);
    let mut takes = Takes::default();
    let mut index = TokenIndex::from_source("000");
    let outcome = Vm::new()
        .parse_with_observer(&g, &RulePath::from("Digits"), &mut index, &mut takes)
        .unwrap();

    assert!(outcome.is_match());
    assert_eq!(takes.0, 3);
    assert_eq!(outcome.position.offset, 3);
}

#[test]
fn one_or_more_on_empty_input_fails_without_fault() {
    let g = grammar(vec![rule("Digits", [one_or_more(literal("0"))])]);
    let outcome = parse_str(&g, "Digits", "").unwrap();
    assert!(!outcome.is_match());
}

#[test]
fn direct_left_recursion_faults() {
    let g = grammar(vec![rule("L", [call("L"), literal("x")])]);
    let err = fault(parse_str(&g, "L", "xxx"));
    assert!(matches!(
        err.kind,
        ErrorKind::LeftRecursionUnsupported { ref rule } if rule == "g.L"
    ));
    let context = err.context.unwrap();
    assert_eq!(context.rule.as_deref(), Some("g.L"));
    assert_eq!(context.offset, Some(0));
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn sequence_failure_reports_position_after_first_step() {
    let g = grammar(vec![rule("S", [sequence([literal("a"), literal("b")])])]);

    let outcome = parse_str(&g, "S", "ac").unwrap();
    assert!(!outcome.is_match());
    assert_eq!(outcome.position.offset, 1);
    assert_eq!(outcome.describe_failure().unwrap(), "1:2: expected 'b', found 'c'");
}

#[test]
fn zero_width_loop_faults_instead_of_spinning() {
    let g = grammar(vec![rule("S", [zero_or_more(optional(literal("a")))])]);
    let err = fault(parse_str(&g, "S", "aab"));
    assert!(matches!(err.kind, ErrorKind::LoopNoProgress { .. }));
}

#[test]
fn consuming_loop_terminates() {
    let g = grammar(vec![rule("S", [zero_or_more(choose([literal("a"), literal("b")])), end()])]);
    let input = "ab".repeat(50);
    let outcome = parse_str(&g, "S", &input).unwrap();
    assert!(outcome.is_match());
    assert_eq!(outcome.position.offset, 100);
}

#[test]
fn failed_rule_consumes_nothing() {
    let g = grammar(vec![
        rule("S", [choose([call("AB"), call("AC")])]),
        rule("AB", [literal("a"), literal("b")]),
        rule("AC", [literal("a"), literal("c")]),
    ]);
    let outcome = parse_str(&g, "S", "ac").unwrap();
    assert!(outcome.is_match());
    assert_eq!(outcome.value, Some(Value::from("c")));
}

#[test]
fn captures_are_returned_as_bindings() {
    let g = grammar(vec![
        rule("S", [capture("sign", optional(literal("-"))), capture("digit", call("D"))]),
        rule("D", [choose([literal("1"), literal("2")])]),
    ]);
    let outcome = parse_str(&g, "S", "-2").unwrap();
    assert_eq!(outcome.binding("sign"), Some(&Value::from("-")));
    assert_eq!(outcome.binding("digit"), Some(&Value::from("2")));
}

// =============================================================================
// Configuration and diagnostics
// =============================================================================

#[test]
fn call_depth_limit_stops_deep_nesting() {
    let g = grammar(vec![rule(
        "P",
        [choose([
            sequence([literal("("), call("P"), literal(")")]),
            literal("x"),
        ])],
    )]);
    let start = RulePath::from("P");

    let mut index = TokenIndex::from_source("((((x))))");
    let mut vm = Vm::with_config(VmConfig::default().with_max_call_depth(3));
    let err = fault(vm.parse(&g, &start, &mut index));
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(SemanticLimit::MaxCallDepth { limit: 3, .. })
    ));

    let mut index = TokenIndex::from_source("((((x))))");
    let mut vm = Vm::with_config(VmConfig::default().with_max_call_depth(8));
    assert!(vm.parse(&g, &start, &mut index).unwrap().is_match());
}

#[test]
fn diagnostics_report_furthest_failure() {
    let g = grammar(vec![rule("S", [literal("a"), choose([literal("b"), literal("c")]), end()])]);
    let outcome = parse_str(&g, "S", "ax").unwrap();

    assert_eq!(outcome.longest_match.offset, 1);
    let expected: Vec<_> = outcome.diagnostics.iter().map(|d| d.expected.to_string()).collect();
    assert_eq!(expected, vec!["'b'", "'c'"]);
    assert_eq!(
        outcome.to_string(),
        "no match: 1:2: expected 'b' or 'c', found 'x'"
    );
}

#[test]
fn diagnostics_can_be_turned_off() {
    let g = grammar(vec![rule("S", [literal("a")])]);
    let mut index = TokenIndex::from_source("b");
    let outcome = Vm::with_config(VmConfig::default().without_diagnostics())
        .parse(&g, &RulePath::from("S"), &mut index)
        .unwrap();
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(
        outcome.describe_failure().unwrap(),
        "nothing matched past 1:1"
    );
}
