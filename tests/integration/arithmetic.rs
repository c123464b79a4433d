//! Grammars parsed end to end through the umbrella crate.

use burrow::foundation::{SourcePosition, Token, Value};
use burrow::language::compiler::{
    call, capture, end, literal, one_of, rule, sequence, zero_or_more,
};
use burrow::language::grammars::{ARITHMETIC_START, arithmetic};
use burrow::language::{Grammar, NamedParser, RulePath, TokenIndex, Vm, parse_str};

#[test]
fn nested_expressions_match_to_the_end() {
    let grammar = arithmetic();
    for source in ["=((1+2)*(3-4))/5", "=1.5%2", "=0", "=10-20-30"] {
        let outcome = parse_str(&grammar, ARITHMETIC_START, source).unwrap();
        assert!(outcome.is_match(), "{source}: {outcome}");
        assert_eq!(outcome.position.offset, source.len());
        assert!(outcome.diagnostics.is_empty());
    }
}

#[test]
fn unclosed_group_fails_at_the_end_marker() {
    let outcome = parse_str(&arithmetic(), ARITHMETIC_START, "=(1+2").unwrap();
    assert!(!outcome.is_match());
    assert_eq!(outcome.longest_match.offset, 5);

    let failure = outcome.describe_failure().unwrap();
    assert!(failure.starts_with("1:6: expected '0'"), "{failure}");
    assert!(failure.ends_with("found end of input"), "{failure}");
    assert!(outcome.diagnostics.iter().any(|d| d.expected.to_string() == "'.'"));
}

#[test]
fn reparsing_an_index_is_answered_from_the_memo() {
    let grammar = arithmetic();
    let start = RulePath::from(ARITHMETIC_START);
    let mut index = TokenIndex::from_source("=1+2*3");

    let mut first_vm = Vm::new();
    let first = first_vm.parse(&grammar, &start, &mut index).unwrap();
    assert!(first_vm.instructions_executed() > 0);

    let mut second_vm = Vm::new();
    let second = second_vm.parse(&grammar, &start, &mut index).unwrap();
    assert_eq!(second_vm.instructions_executed(), 0);
    assert_eq!(second.polarity, first.polarity);
    assert_eq!(second.value, first.value);
    assert_eq!(second.position, first.position);
}

#[test]
fn word_tokens_from_another_tokenizer() {
    let grammar = Grammar::single(NamedParser::new(
        "bind",
        vec![
            rule(
                "Let",
                [
                    literal("let"),
                    capture("name", call("Name")),
                    literal("="),
                    capture("value", call("Digit")),
                    end(),
                ],
            ),
            rule("Name", [one_of(["x", "y"])]),
            rule("Digit", [one_of(["1", "2"])]),
        ],
    ));
    let tokens = vec![
        Token::new("let", 0),
        Token::new("x", 1),
        Token::new("=", 2),
        Token::new("2", 3),
        Token::end_of_stream(4),
    ];
    let mut index = TokenIndex::new(tokens).unwrap();

    let outcome = Vm::new()
        .parse(&grammar, &RulePath::from("Let"), &mut index)
        .unwrap();
    assert!(outcome.is_match());
    assert_eq!(outcome.binding("name"), Some(&Value::from("x")));
    assert_eq!(outcome.binding("value"), Some(&Value::from("2")));
    assert_eq!(outcome.position, SourcePosition::new(4, 1, 7));
}

#[test]
fn imported_parser_rules_are_called_by_alias() {
    let mut grammar = Grammar::new();
    grammar.add_parser(
        NamedParser::new(
            "sum",
            vec![rule(
                "S",
                [
                    call("d.Digit"),
                    zero_or_more(sequence([literal("+"), call("d.Digit")])),
                    end(),
                ],
            )],
        )
        .with_import("d", 1),
    );
    grammar.add_parser(NamedParser::new(
        "digits",
        vec![rule("Digit", [one_of(["1", "2", "3"])])],
    ));
    grammar.validate().unwrap();

    assert!(parse_str(&grammar, "S", "1+2+3").unwrap().is_match());

    let failed = parse_str(&grammar, "S", "1+").unwrap();
    assert!(!failed.is_match());
    assert!(failed.to_string().starts_with("no match: 1:3: expected"), "{failed}");
}
