//! Integration tests for grammar assembly and rule resolution

use burrow_foundation::{ErrorKind, ResolutionFault};
use burrow_language::compiler::{call, end, literal, one_of, rule};
use burrow_language::{CallSite, Grammar, Instruction, NamedParser, RuleId, RulePath, parse_str};

fn imports() -> Grammar {
    let mut grammar = Grammar::new();
    grammar.add_parser(
        NamedParser::new(
            "main",
            vec![rule("S", [call("num.Digit"), call("ops.Plus"), call("num.Digit"), end()])],
        )
        .with_import("num", 1)
        .with_import("ops", 2),
    );
    grammar.add_parser(NamedParser::new("numbers", vec![rule("Digit", [one_of(["1", "2"])])]));
    grammar.add_parser(NamedParser::new("operators", vec![rule("Plus", [literal("+")])]));
    grammar
}

fn resolution_fault(grammar: &Grammar, start: &str) -> ResolutionFault {
    match parse_str(grammar, start, "").unwrap_err().kind {
        ErrorKind::Resolution(fault) => fault,
        other => panic!("expected a resolution fault, got {other}"),
    }
}

#[test]
fn rule_names_are_qualified_by_parser() {
    let grammar = imports();
    let names: Vec<_> = grammar.rules().map(|(_, r)| r.qualified_name().to_string()).collect();
    assert_eq!(names, vec!["main.S", "numbers.Digit", "operators.Plus"]);
}

#[test]
fn cross_parser_calls_resolve_and_cache() {
    let grammar = imports();
    assert!(parse_str(&grammar, "S", "1+2").unwrap().is_match());

    let main = grammar.rule(RuleId::new(0, 0)).unwrap();
    let targets: Vec<_> = main
        .code()
        .iter()
        .filter_map(|op| match op {
            Instruction::CallRule(site) => site.resolved(),
            _ => None,
        })
        .collect();
    assert_eq!(
        targets,
        vec![RuleId::new(1, 0), RuleId::new(2, 0), RuleId::new(1, 0)]
    );
}

#[test]
fn call_site_resolves_once() {
    let site = CallSite::new(RulePath::from("num.Digit"));
    assert_eq!(site.resolved(), None);

    let first = site.resolve_with(|_| Ok(RuleId::new(1, 0))).unwrap();
    let second = site
        .resolve_with(|_| panic!("cached call sites are not re-resolved"))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn unknown_alias_aborts_before_execution() {
    let grammar = Grammar::single(NamedParser::new(
        "main",
        vec![rule("S", [literal("a")]), rule("T", [call("missing.X")])],
    ));
    // S never calls T, but the whole grammar is validated up front.
    assert!(matches!(
        resolution_fault(&grammar, "S"),
        ResolutionFault::UnknownImport { alias, .. } if alias == "missing"
    ));
}

#[test]
fn unknown_rule_in_imported_parser() {
    let mut grammar = Grammar::new();
    grammar.add_parser(
        NamedParser::new("main", vec![rule("S", [call("num.Nope")])]).with_import("num", 1),
    );
    grammar.add_parser(NamedParser::new("numbers", vec![rule("Digit", [literal("1")])]));

    assert!(matches!(
        resolution_fault(&grammar, "S"),
        ResolutionFault::UnknownRule { path, from } if path == "num.Nope" && from == "main.S"
    ));
}

#[test]
fn import_past_the_registry() {
    let grammar = Grammar::single(
        NamedParser::new("main", vec![rule("S", [call("far.X")])]).with_import("far", 9),
    );
    assert!(matches!(
        resolution_fault(&grammar, "S"),
        ResolutionFault::ParserIndexOutOfRange { index: 9, len: 1 }
    ));
}

#[test]
fn empty_call_path() {
    let grammar = Grammar::single(NamedParser::new("main", vec![rule("S", [call("")])]));
    assert!(matches!(
        resolution_fault(&grammar, "S"),
        ResolutionFault::EmptyPath { .. }
    ));
}

#[test]
fn entry_path_may_go_through_imports() {
    let grammar = imports();
    let outcome = parse_str(&grammar, "num.Digit", "2").unwrap();
    assert!(outcome.is_match());
}

#[test]
fn disassembly_lists_every_rule() {
    let listing = imports().disassemble();
    assert!(listing.contains("rule main.S:"));
    assert!(listing.contains("rule numbers.Digit:"));
    assert!(listing.contains("call num.Digit"));
}
