//! Integration tests for the packrat memo table

use burrow_foundation::{Token, Value};
use burrow_language::grammars::{ARITHMETIC_START, arithmetic};
use burrow_language::{
    MemoEntry, MemoState, MemoTable, NodeId, Polarity, RuleId, RulePath, Settled, TokenIndex, Vm,
};

fn settled(polarity: Polarity) -> Settled {
    Settled {
        polarity,
        value: Value::from("x"),
        next: NodeId::START,
    }
}

#[test]
fn slots_move_forward_only() {
    let mut memo = MemoTable::new();
    let rule = RuleId::new(0, 3);
    let node = NodeId::START;

    assert_eq!(memo.state(node, rule), MemoState::Unparsed);
    memo.begin(node, rule).unwrap();
    assert_eq!(memo.state(node, rule), MemoState::Parsing);
    assert_eq!(memo.get(node, rule), Some(&MemoEntry::Parsing));

    memo.settle(node, rule, settled(Polarity::Negative)).unwrap();
    assert_eq!(memo.state(node, rule), MemoState::Negative);

    assert!(memo.begin(node, rule).is_err());
    assert!(memo.settle(node, rule, settled(Polarity::Positive)).is_err());
    assert_eq!(memo.state(node, rule), MemoState::Negative);
}

#[test]
fn settling_an_unbegun_slot_fails() {
    let mut memo = MemoTable::new();
    assert!(
        memo.settle(NodeId::START, RuleId::new(0, 0), settled(Polarity::Positive))
            .is_err()
    );
    assert!(memo.is_empty());
}

#[test]
fn slots_are_per_rule_and_node() {
    let mut memo = MemoTable::new();
    memo.begin(NodeId::START, RuleId::new(0, 0)).unwrap();
    memo.begin(NodeId::START, RuleId::new(0, 1)).unwrap();
    assert_eq!(memo.len(), 2);
    assert_eq!(memo.settled_count(), 0);
}

#[test]
fn parse_settles_every_slot_it_touches() {
    let grammar = arithmetic();
    let mut index = TokenIndex::from_source("=(1+2.5)*3");
    let outcome = Vm::new()
        .parse(&grammar, &RulePath::from(ARITHMETIC_START), &mut index)
        .unwrap();

    assert!(outcome.is_match());
    assert!(!index.memo().is_empty());
    assert_eq!(index.memo().len(), index.memo().settled_count());
}

#[test]
fn second_parse_is_answered_from_the_memo() {
    let grammar = arithmetic();
    let start = RulePath::from(ARITHMETIC_START);
    let mut index = TokenIndex::from_source("=1+2");
    let mut vm = Vm::new();

    let first = vm.parse(&grammar, &start, &mut index).unwrap();
    assert!(vm.instructions_executed() > 0);

    let second = vm.parse(&grammar, &start, &mut index).unwrap();
    assert_eq!(vm.instructions_executed(), 0);
    assert_eq!(first.polarity, second.polarity);
    assert_eq!(first.value, second.value);
    assert_eq!(first.position, second.position);
}

#[test]
fn token_index_validates_its_input() {
    assert!(TokenIndex::new(Vec::new()).is_err());
    assert!(TokenIndex::new(vec![Token::new("a", 0)]).is_err());
    assert!(
        TokenIndex::new(vec![
            Token::end_of_stream(0),
            Token::new("a", 1),
            Token::end_of_stream(2),
        ])
        .is_err()
    );

    let index = TokenIndex::new(vec![Token::new("a", 0), Token::end_of_stream(1)]).unwrap();
    assert_eq!(index.len(), 2);
    assert!(index.token(index.end()).is_end());
    assert_eq!(index.next(NodeId::START), Some(index.end()));
    assert_eq!(index.next(index.end()), None);
}
