//! Integration tests for jump labels and backpatching

use burrow_language::{Bytecode, Instruction};
use proptest::prelude::*;

#[test]
fn forward_jumps_are_patched_when_bound() {
    let mut code = Bytecode::new();
    let exit = code.label();
    code.emit(Instruction::test_literal("a"));
    code.emit_jump_if_negative(exit);
    code.emit(Instruction::TakeToken);
    code.emit_jump(exit);
    code.bind(exit);
    code.emit(Instruction::Success);

    let ops = code.finish().unwrap();
    assert_eq!(ops[1], Instruction::JumpIfNegative(4));
    assert_eq!(ops[3], Instruction::Jump(4));
}

#[test]
fn backward_jumps_use_the_bound_target() {
    let mut code = Bytecode::new();
    let top = code.label();
    code.bind(top);
    code.emit(Instruction::TestEnd);
    code.emit_jump(top);

    assert_eq!(code.label_target(top), Some(0));
    assert_eq!(code.finish().unwrap()[1], Instruction::Jump(0));
}

#[test]
fn unbound_label_is_reported() {
    let mut code = Bytecode::new();
    let nowhere = code.label();
    code.emit_jump(nowhere);
    assert!(code.finish().is_err());
}

#[test]
fn unused_unbound_label_is_fine() {
    let mut code = Bytecode::new();
    let _unused = code.label();
    code.emit(Instruction::Fail);
    assert_eq!(code.finish().unwrap(), vec![Instruction::Fail]);
}

proptest! {
    /// Every jump emitted through a label before binding ends up at the bound
    /// offset, however much code was emitted in between.
    #[test]
    fn jumps_land_on_bound_offset(gaps in prop::collection::vec(0usize..8, 1..10)) {
        let mut code = Bytecode::new();
        let label = code.label();
        let mut sites = Vec::new();
        for gap in &gaps {
            for _ in 0..*gap {
                code.emit(Instruction::TakeToken);
            }
            sites.push(code.emit_jump(label));
        }
        let target = code.len();
        code.bind(label);
        code.emit(Instruction::Success);

        let ops = code.finish().unwrap();
        for site in sites {
            prop_assert_eq!(ops[site].jump_target(), Some(target));
        }
    }
}
