//! Tracing parses of the arithmetic grammar.

use burrow::debug::{TraceEvent, Tracer, TracerConfig};
use burrow::foundation::ErrorKind;
use burrow::language::compiler::{call, choose, end, literal, rule, sequence};
use burrow::language::grammars::{ARITHMETIC_START, arithmetic};
use burrow::language::{Grammar, NamedParser, Polarity, RulePath, TokenIndex, Vm};

fn enter_depth(tracer: &Tracer, rule: &str) -> Option<usize> {
    tracer.buffer().by_rule(rule).into_iter().find_map(|r| match r.event {
        TraceEvent::RuleEnter { depth, .. } => Some(depth),
        _ => None,
    })
}

#[test]
fn rule_events_follow_the_call_tree() {
    let grammar = arithmetic();
    let mut tracer = Tracer::new(TracerConfig::new().enabled());
    let mut index = TokenIndex::from_source("=1");

    let outcome = tracer
        .trace_parse(
            &mut Vm::new(),
            &grammar,
            &RulePath::from(ARITHMETIC_START),
            &mut index,
        )
        .unwrap();
    assert!(outcome.is_match());

    let stats = tracer.stats();
    assert_eq!(stats.parse_count, 1);
    assert_eq!(
        stats.event_counts.get("rule-enter"),
        stats.event_counts.get("rule-exit")
    );

    let number = enter_depth(&tracer, "arithmetic.Number").unwrap();
    assert_eq!(enter_depth(&tracer, "arithmetic.Float"), Some(number + 1));
    assert_eq!(enter_depth(&tracer, "arithmetic.Integer"), Some(number + 1));

    let float = tracer.buffer().by_rule("arithmetic.Float");
    assert!(matches!(
        float.last().map(|r| &r.event),
        Some(TraceEvent::RuleExit {
            polarity: Polarity::Negative,
            ..
        })
    ));
    assert!(enter_depth(&tracer, "arithmetic.ParenGroup").is_none());
}

#[test]
fn json_records_carry_the_parse_result() {
    let grammar = arithmetic();
    let mut tracer = Tracer::new(TracerConfig::new().enabled().json());
    let mut index = TokenIndex::from_source("=2*");

    let outcome = tracer
        .trace_parse(
            &mut Vm::new(),
            &grammar,
            &RulePath::from(ARITHMETIC_START),
            &mut index,
        )
        .unwrap();
    assert!(!outcome.is_match());

    let last = tracer.format_records(&tracer.buffer().recent(1));
    assert!(last.contains("\"type\":\"parse-end\""), "{last}");
    assert!(last.contains("\"matched\":false"), "{last}");
}

#[test]
fn a_fault_is_recorded_and_later_parses_still_run() {
    let grammar = Grammar::single(NamedParser::new(
        "g",
        vec![
            rule(
                "L",
                [choose([sequence([call("L"), literal("x")]), literal("x")])],
            ),
            rule("X", [literal("x"), end()]),
        ],
    ));
    let mut tracer = Tracer::new(TracerConfig::new().enabled());
    let mut vm = Vm::new();

    let mut poisoned = TokenIndex::from_source("xx");
    let err = tracer
        .trace_parse(&mut vm, &grammar, &RulePath::from("L"), &mut poisoned)
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LeftRecursionUnsupported { .. }
    ));
    assert!(matches!(
        tracer.buffer().last().map(|r| &r.event),
        Some(TraceEvent::Fault { rule: Some(rule), .. }) if rule == "g.L"
    ));
    assert!(tracer.buffer().by_event_type("parse-end").is_empty());

    let mut fresh = TokenIndex::from_source("x");
    let outcome = tracer
        .trace_parse(&mut vm, &grammar, &RulePath::from("X"), &mut fresh)
        .unwrap();
    assert!(outcome.is_match());
    assert_eq!(tracer.current_parse(), 2);
    assert_eq!(tracer.buffer().records_for_parse(2).len(), 4);
}
