//! Compiler from combinator trees to flat instruction arrays.
//!
//! A grammar is written as a tree of [`Combinator`] values. Compiling a node
//! takes two [`Continuation`]s, what to emit when the node matches and what
//! to emit when it does not, and appends the node's instructions followed by
//! the continuations. Jump labels are created before their targets exist and
//! patched when bound, so a node never needs to know how its continuations
//! are laid out.
//!
//! Backtracking is coarse: a failed token test consumes nothing, and a
//! failed rule call returns its caller to the call position, but a sequence
//! that fails part-way inside a rule keeps the position it reached. Factor
//! multi-token alternatives into their own rules when they share a prefix.

use std::sync::Arc;

use crate::grammar::Rule;
use crate::opcode::{Bytecode, Instruction, JumpLabel, RulePath};

/// A node of a grammar expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// All steps in order.
    Sequence(Vec<Combinator>),
    /// The first alternative that matches.
    Choose(Vec<Combinator>),
    /// The step, or nothing.
    Optional(Box<Combinator>),
    /// The step repeated until it fails.
    ZeroOrMore(Box<Combinator>),
    /// The step at least once, then repeated.
    OneOrMore(Box<Combinator>),
    /// A token equal to the literal.
    Literal(Arc<str>),
    /// The end of input, without consuming it.
    End,
    /// Another rule, by dotted path.
    Call(RulePath),
    /// The step, binding its value to a local on success.
    Capture(Arc<str>, Box<Combinator>),
    /// Always matches, consuming nothing.
    Succeed,
    /// Never matches.
    Fail,
}

/// Matches all steps in order.
#[must_use]
pub fn sequence(steps: impl IntoIterator<Item = Combinator>) -> Combinator {
    Combinator::Sequence(steps.into_iter().collect())
}

/// Matches the first alternative that succeeds.
#[must_use]
pub fn choose(alternatives: impl IntoIterator<Item = Combinator>) -> Combinator {
    Combinator::Choose(alternatives.into_iter().collect())
}

/// Matches `step` or nothing.
#[must_use]
pub fn optional(step: Combinator) -> Combinator {
    Combinator::Optional(Box::new(step))
}

/// Matches `step` as many times as it succeeds.
#[must_use]
pub fn zero_or_more(step: Combinator) -> Combinator {
    Combinator::ZeroOrMore(Box::new(step))
}

/// Matches `step` once, then as many more times as it succeeds.
#[must_use]
pub fn one_or_more(step: Combinator) -> Combinator {
    Combinator::OneOrMore(Box::new(step))
}

/// Matches a single token equal to `value`.
#[must_use]
pub fn literal(value: impl Into<Arc<str>>) -> Combinator {
    Combinator::Literal(value.into())
}

/// Matches any one of the given single-token literals.
#[must_use]
pub fn one_of<'a>(values: impl IntoIterator<Item = &'a str>) -> Combinator {
    choose(values.into_iter().map(literal))
}

/// Matches the end of input.
#[must_use]
pub fn end() -> Combinator {
    Combinator::End
}

/// Calls another rule.
#[must_use]
pub fn call(path: impl Into<RulePath>) -> Combinator {
    Combinator::Call(path.into())
}

/// Matches `step` and stores its value under `name`.
#[must_use]
pub fn capture(name: impl Into<Arc<str>>, step: Combinator) -> Combinator {
    Combinator::Capture(name.into(), Box::new(step))
}

/// Matches without testing or consuming anything.
#[must_use]
pub fn succeed() -> Combinator {
    Combinator::Succeed
}

/// Fails without testing anything.
#[must_use]
pub fn fail() -> Combinator {
    Combinator::Fail
}

/// Compiles a rule whose body is `sequence(steps)`.
#[must_use]
pub fn rule(name: impl Into<Arc<str>>, steps: impl IntoIterator<Item = Combinator>) -> Rule {
    let body = sequence(steps);
    Rule::from_instructions(name, Compiler::new().compile_body(&body))
}

/// What to emit when a node finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    /// Settle the rule as matched.
    Success,
    /// Settle the rule as failed.
    Fail,
    /// Jump to a label.
    Jump(JumpLabel),
    /// Loop body matched.
    FindMore,
    /// Loop body failed.
    NoMore,
}

/// Emits instructions for combinator trees.
#[derive(Debug, Default)]
pub struct Compiler {
    code: Bytecode,
}

impl Compiler {
    /// Creates a compiler with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles a rule body: match settles `Success`, mismatch settles `Fail`.
    #[must_use]
    pub fn compile_body(mut self, body: &Combinator) -> Vec<Instruction> {
        self.compile(body, Continuation::Success, Continuation::Fail);
        self.finish()
    }

    /// Appends `node` followed by its continuations.
    pub fn compile(&mut self, node: &Combinator, on_match: Continuation, on_fail: Continuation) {
        match node {
            Combinator::Sequence(steps) => self.compile_sequence(steps, on_match, on_fail),
            Combinator::Choose(alternatives) => {
                self.compile_choose(alternatives, on_match, on_fail);
            }
            Combinator::Optional(step) => self.compile_optional(step, on_match),
            Combinator::ZeroOrMore(step) => self.compile_zero_or_more(step, on_match),
            Combinator::OneOrMore(step) => {
                let expanded = [(**step).clone(), zero_or_more((**step).clone())];
                self.compile_sequence(&expanded, on_match, on_fail);
            }
            Combinator::Literal(value) => {
                self.compile_test(Instruction::TestLiteral(value.clone()), true, on_match, on_fail);
            }
            Combinator::End => self.compile_test(Instruction::TestEnd, false, on_match, on_fail),
            Combinator::Call(path) => {
                self.compile_test(Instruction::call(path.clone()), false, on_match, on_fail);
            }
            Combinator::Capture(name, step) => self.compile_capture(name, step, on_match, on_fail),
            Combinator::Succeed => self.emit_continuation(on_match),
            Combinator::Fail => self.emit_continuation(on_fail),
        }
    }

    fn emit_continuation(&mut self, continuation: Continuation) {
        match continuation {
            Continuation::Success => {
                self.code.emit(Instruction::Success);
            }
            Continuation::Fail => {
                self.code.emit(Instruction::Fail);
            }
            Continuation::Jump(label) => {
                self.code.emit_jump(label);
            }
            Continuation::FindMore => {
                self.code.emit(Instruction::FindMore);
            }
            Continuation::NoMore => {
                self.code.emit(Instruction::NoMore);
            }
        }
    }

    // test
    // jump if negative -> fail
    // [take]
    // <on_match>
    // fail:
    // <on_fail>
    fn compile_test(
        &mut self,
        test: Instruction,
        take: bool,
        on_match: Continuation,
        on_fail: Continuation,
    ) {
        let fail = self.code.label();
        self.code.emit(test);
        self.code.emit_jump_if_negative(fail);
        if take {
            self.code.emit(Instruction::TakeToken);
        }
        self.emit_continuation(on_match);
        self.code.bind(fail);
        self.emit_continuation(on_fail);
    }

    fn compile_sequence(
        &mut self,
        steps: &[Combinator],
        on_match: Continuation,
        on_fail: Continuation,
    ) {
        let fail = self.code.label();
        for step in steps {
            let next = self.code.label();
            self.compile(step, Continuation::Jump(next), Continuation::Jump(fail));
            self.code.bind(next);
        }
        self.emit_continuation(on_match);
        self.code.bind(fail);
        self.emit_continuation(on_fail);
    }

    fn compile_choose(
        &mut self,
        alternatives: &[Combinator],
        on_match: Continuation,
        on_fail: Continuation,
    ) {
        let matched = self.code.label();
        for alternative in alternatives {
            let next = self.code.label();
            self.compile(alternative, Continuation::Jump(matched), Continuation::Jump(next));
            self.code.bind(next);
        }
        self.emit_continuation(on_fail);
        self.code.bind(matched);
        self.emit_continuation(on_match);
    }

    fn compile_optional(&mut self, step: &Combinator, on_match: Continuation) {
        let after = self.code.label();
        self.compile(step, Continuation::Jump(after), Continuation::Jump(after));
        self.code.bind(after);
        self.emit_continuation(on_match);
    }

    // init
    // test
    // jump if negative -> done
    // <step: match -> find more, fail -> no more>
    // done:
    // <on_match>
    fn compile_zero_or_more(&mut self, step: &Combinator, on_match: Continuation) {
        let done = self.code.label();
        self.code.emit(Instruction::ZeroOrMoreInit);
        self.code.emit(Instruction::ZeroOrMoreTest);
        self.code.emit_jump_if_negative(done);
        self.compile(step, Continuation::FindMore, Continuation::NoMore);
        self.code.bind(done);
        self.emit_continuation(on_match);
    }

    fn compile_capture(
        &mut self,
        name: &Arc<str>,
        step: &Combinator,
        on_match: Continuation,
        on_fail: Continuation,
    ) {
        let matched = self.code.label();
        let fail = self.code.label();
        self.compile(step, Continuation::Jump(matched), Continuation::Jump(fail));
        self.code.bind(matched);
        self.code.emit(Instruction::SetLocal(name.clone()));
        self.emit_continuation(on_match);
        self.code.bind(fail);
        self.emit_continuation(on_fail);
    }

    /// Returns the compiled instructions.
    ///
    /// # Panics
    ///
    /// Panics if a label was left with unpatched jumps. Every label this
    /// compiler creates is bound before the node that created it returns.
    #[must_use]
    pub fn finish(self) -> Vec<Instruction> {
        match self.code.finish() {
            Ok(ops) => ops,
            Err(e) => panic!("combinator compilation left {e}"),
        }
    }
}
