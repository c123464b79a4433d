//! Hooks for watching the VM run.
//!
//! The VM is generic over its observer, so running with [`NoObserver`]
//! compiles every hook away.

use burrow_foundation::{Error, SourcePosition};

use crate::grammar::Rule;
use crate::memo::Polarity;
use crate::opcode::Instruction;

/// Receives events as the VM executes.
///
/// Every hook has an empty default body; implement the ones you need.
pub trait VmObserver {
    /// Called before each instruction is executed.
    fn on_instruction(
        &mut self,
        _rule: &Rule,
        _ip: usize,
        _op: &Instruction,
        _position: SourcePosition,
    ) {
    }

    /// Called when a rule activation is pushed. `depth` counts the new frame.
    fn on_rule_enter(&mut self, _rule: &Rule, _depth: usize, _position: SourcePosition) {}

    /// Called when a rule activation settles. `position` is where the caller
    /// continues.
    fn on_rule_exit(
        &mut self,
        _rule: &Rule,
        _depth: usize,
        _polarity: Polarity,
        _position: SourcePosition,
    ) {
    }

    /// Called when a call is answered from the memo table.
    fn on_memo_hit(&mut self, _rule: &Rule, _polarity: Polarity, _position: SourcePosition) {}

    /// Called once when a parse stops with a fault.
    fn on_fault(&mut self, _error: &Error) {}
}

/// An observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoObserver;

impl VmObserver for NoObserver {}

impl<O: VmObserver + ?Sized> VmObserver for &mut O {
    fn on_instruction(
        &mut self,
        rule: &Rule,
        ip: usize,
        op: &Instruction,
        position: SourcePosition,
    ) {
        (**self).on_instruction(rule, ip, op, position);
    }

    fn on_rule_enter(&mut self, rule: &Rule, depth: usize, position: SourcePosition) {
        (**self).on_rule_enter(rule, depth, position);
    }

    fn on_rule_exit(
        &mut self,
        rule: &Rule,
        depth: usize,
        polarity: Polarity,
        position: SourcePosition,
    ) {
        (**self).on_rule_exit(rule, depth, polarity, position);
    }

    fn on_memo_hit(&mut self, rule: &Rule, polarity: Polarity, position: SourcePosition) {
        (**self).on_memo_hit(rule, polarity, position);
    }

    fn on_fault(&mut self, error: &Error) {
        (**self).on_fault(error);
    }
}
