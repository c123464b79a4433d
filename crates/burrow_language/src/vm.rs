//! Explicit-stack virtual machine for compiled grammars.
//!
//! The VM runs one rule activation at a time from the top of its call stack.
//! Rule calls push a [`CallFrame`](frame::CallFrame) instead of recursing, so
//! every activation passes through the memo table and left recursion is
//! caught as a re-entry of a slot that is still `Parsing`.
//!
//! # Observing
//!
//! [`Vm::parse_with_observer`] reports instructions, rule entries and exits,
//! memo hits, and faults to a [`VmObserver`]. [`Vm::parse`] uses
//! [`NoObserver`], which costs nothing.
//!
//! # Faults
//!
//! Every error is fatal to the parse. Runtime faults carry an
//! [`ErrorContext`] naming the rule, instruction pointer, token position,
//! and the rules that called it. A faulted parse leaves `Parsing` slots in
//! the index's memo table, so parse a fresh [`TokenIndex`] afterwards.

#![allow(clippy::too_many_arguments)]

mod frame;
mod observer;
mod outcome;

pub use observer::{NoObserver, VmObserver};
pub use outcome::{Diagnostic, Expected, ParseOutcome};

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use burrow_foundation::{Error, ErrorContext, ErrorKind, Result, SemanticLimit, Value};

use crate::grammar::{Grammar, Rule, RuleId};
use crate::memo::{MemoEntry, Polarity, Settled};
use crate::opcode::{Instruction, RulePath};
use crate::resolver;
use crate::token_index::{NodeId, TokenIndex};

use frame::{CallFrame, LoopState, StepFrame};

/// Default cap on expectations kept at the furthest failure.
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 16;

/// VM configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum number of nested rule activations; `None` for no limit.
    pub max_call_depth: Option<usize>,
    /// Whether failed tests record expectations.
    pub collect_diagnostics: bool,
    /// Maximum number of distinct expectations kept.
    pub max_diagnostics: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_call_depth: None,
            collect_diagnostics: true,
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
        }
    }
}

impl VmConfig {
    /// Limits the depth of the call stack.
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = Some(depth);
        self
    }

    /// Sets the expectation cap.
    #[must_use]
    pub fn with_max_diagnostics(mut self, max: usize) -> Self {
        self.max_diagnostics = max;
        self
    }

    /// Turns off expectation tracking.
    #[must_use]
    pub fn without_diagnostics(mut self) -> Self {
        self.collect_diagnostics = false;
        self
    }
}

/// The parsing virtual machine.
///
/// A `Vm` can be reused across parses; its stacks are cleared at the start
/// of each one.
#[derive(Debug, Default)]
pub struct Vm {
    config: VmConfig,
    /// Active rule activations, outermost first.
    calls: Vec<CallFrame>,
    /// Furthest node any step advanced to.
    longest: NodeId,
    /// Node of the furthest failed test.
    furthest_failure: Option<NodeId>,
    /// Distinct expectations that failed at `furthest_failure`.
    expectations: Vec<Expected>,
    /// Instructions executed by the last parse.
    executed: u64,
}

impl Vm {
    /// Creates a VM with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a VM with the given configuration.
    #[must_use]
    pub fn with_config(config: VmConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Returns how many instructions the last parse executed.
    #[must_use]
    pub fn instructions_executed(&self) -> u64 {
        self.executed
    }

    fn reset(&mut self) {
        self.calls.clear();
        self.longest = NodeId::START;
        self.furthest_failure = None;
        self.expectations.clear();
        self.executed = 0;
    }

    /// Parses `index` from its first token with the rule at `start`.
    ///
    /// `start` is resolved from the grammar's first parser. The whole
    /// grammar is validated first, so bad call paths fail before any input
    /// is read.
    ///
    /// # Errors
    ///
    /// Returns the fault that stopped the parse. A negative outcome is not
    /// an error.
    pub fn parse(
        &mut self,
        grammar: &Grammar,
        start: &RulePath,
        index: &mut TokenIndex,
    ) -> Result<ParseOutcome> {
        self.parse_with_observer(grammar, start, index, &mut NoObserver)
    }

    /// Parses like [`Vm::parse`], reporting progress to `observer`.
    ///
    /// # Errors
    ///
    /// See [`Vm::parse`].
    pub fn parse_with_observer<O: VmObserver>(
        &mut self,
        grammar: &Grammar,
        start: &RulePath,
        index: &mut TokenIndex,
        observer: &mut O,
    ) -> Result<ParseOutcome> {
        self.reset();
        match self.start(grammar, start, index, observer) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let err = if err.context.is_none() && !self.calls.is_empty() {
                    let context = self.locate(grammar, index);
                    err.with_context(context)
                } else {
                    err
                };
                observer.on_fault(&err);
                Err(err)
            }
        }
    }

    fn start<O: VmObserver>(
        &mut self,
        grammar: &Grammar,
        path: &RulePath,
        index: &mut TokenIndex,
        observer: &mut O,
    ) -> Result<ParseOutcome> {
        grammar.validate()?;
        index.bind_grammar(grammar.id())?;
        let entry = grammar.entry(path)?;
        let rule = rule_of(grammar, entry)?;

        match index.memo().get(NodeId::START, entry).cloned() {
            None => {}
            Some(MemoEntry::Parsing) => return Err(Error::left_recursion(rule.qualified_name())),
            Some(MemoEntry::Settled(settled)) => {
                observer.on_memo_hit(rule, settled.polarity, index.position(NodeId::START));
                if let Some(finished) = index.finished(entry) {
                    return Ok(finished.clone());
                }
                // Settled only as a nested call of another start rule; its
                // diagnostics and bindings were not kept.
                self.note_progress(settled.next);
                let reached = settled.next;
                return Ok(self.outcome(index, settled, reached, BTreeMap::new()));
            }
        }

        self.enter(entry, rule, NodeId::START, index, observer)?;
        self.run(grammar, index, observer)
    }

    /// The fetch-execute loop.
    fn run<O: VmObserver>(
        &mut self,
        grammar: &Grammar,
        index: &mut TokenIndex,
        observer: &mut O,
    ) -> Result<ParseOutcome> {
        loop {
            let frame = self.calls.last().ok_or_else(|| Error::stack_underflow("call"))?;
            let id = frame.rule;
            let step = *frame.steps.last().ok_or_else(|| Error::stack_underflow("step"))?;
            let rule = rule_of(grammar, id)?;
            let op = rule.instruction(step.ip).ok_or_else(|| {
                Error::new(ErrorKind::InvalidInstructionPointer {
                    ip: step.ip,
                    len: rule.code().len(),
                })
            })?;

            observer.on_instruction(rule, step.ip, op, index.position(step.pos));
            self.executed += 1;

            if let Some(outcome) = self.execute(grammar, id, rule, op, step, index, observer)? {
                return Ok(outcome);
            }
        }
    }

    fn execute<O: VmObserver>(
        &mut self,
        grammar: &Grammar,
        id: RuleId,
        rule: &Rule,
        op: &Instruction,
        step: StepFrame,
        index: &mut TokenIndex,
        observer: &mut O,
    ) -> Result<Option<ParseOutcome>> {
        let StepFrame { ip, pos } = step;

        match op {
            // === Rule Exit ===
            Instruction::Success => {
                return self.settle(grammar, Polarity::Positive, index, observer);
            }
            Instruction::Fail => {
                return self.settle(grammar, Polarity::Negative, index, observer);
            }
            Instruction::Return => {
                let polarity = self.frame()?.polarity;
                return self.settle(grammar, polarity, index, observer);
            }

            // === Input ===
            Instruction::TakeToken => {
                let text = index.token(pos).text.clone();
                let next = index.next(pos).unwrap_or(pos);
                let frame = self.frame()?;
                frame.locals.last = Value::Token(text);
                frame.push(ip + 1, next);
                self.note_progress(next);
            }
            Instruction::TestLiteral(literal) => {
                let token = index.token(pos);
                let matched = token.matches(literal);
                if matched {
                    let value = Value::Token(token.text.clone());
                    self.frame()?.locals.last = value;
                } else {
                    self.expect(pos, Expected::Literal(literal.clone()));
                }
                let frame = self.frame()?;
                frame.polarity = Polarity::from_bool(matched);
                frame.push(ip + 1, pos);
            }
            Instruction::TestEnd => {
                let matched = index.next(pos).is_none();
                if !matched {
                    self.expect(pos, Expected::End);
                }
                let frame = self.frame()?;
                frame.polarity = Polarity::from_bool(matched);
                frame.push(ip + 1, pos);
            }

            // === Control Flow ===
            Instruction::Jump(target) => {
                self.top_step()?.ip = *target;
            }
            Instruction::JumpIfNegative(target) => {
                let frame = self.frame()?;
                let next_ip = if frame.polarity.is_positive() {
                    ip + 1
                } else {
                    *target
                };
                frame.push(next_ip, pos);
            }

            // === Locals ===
            Instruction::SetLocal(name) => {
                let frame = self.frame()?;
                let value = frame.locals.last.clone();
                frame.locals.named.insert(Arc::clone(name), value);
                frame.push(ip + 1, pos);
            }

            // === Repetition ===
            Instruction::ZeroOrMoreInit => {
                let frame = self.frame()?;
                frame.loops.push(LoopState {
                    test_ip: ip + 1,
                    depth: frame.steps.len(),
                    seek_more: true,
                    body_start: None,
                });
                frame.push(ip + 1, pos);
            }
            Instruction::ZeroOrMoreTest => {
                let frame = self.frame()?;
                let state = frame
                    .loops
                    .last_mut()
                    .ok_or_else(|| Error::stack_underflow("loop"))?;
                if state.seek_more {
                    if state.body_start == Some(pos) {
                        return Err(Error::loop_no_progress(rule.qualified_name()));
                    }
                    state.body_start = Some(pos);
                    frame.polarity = Polarity::Positive;
                } else {
                    let depth = state.depth;
                    frame.loops.pop();
                    frame.steps.truncate(depth);
                    frame.polarity = Polarity::Negative;
                }
                frame.push(ip + 1, pos);
            }
            Instruction::FindMore | Instruction::NoMore => {
                let more = matches!(op, Instruction::FindMore);
                let frame = self.frame()?;
                let state = frame
                    .loops
                    .last_mut()
                    .ok_or_else(|| Error::stack_underflow("loop"))?;
                state.seek_more = more;
                let (depth, test_ip) = (state.depth, state.test_ip);

                // The step at `depth` is the loop's test, parked at the
                // position the current iteration started from.
                frame.steps.truncate(depth + 1);
                let top = frame
                    .steps
                    .last_mut()
                    .ok_or_else(|| Error::stack_underflow("step"))?;
                top.ip = test_ip;
                if more {
                    top.pos = pos;
                }
            }

            // === Rules ===
            Instruction::CallRule(site) => {
                let target =
                    site.resolve_with(|path| resolver::resolve_rule_path(grammar, id, path))?;
                let callee = rule_of(grammar, target)?;

                match index.memo().get(pos, target).cloned() {
                    None => self.enter(target, callee, pos, index, observer)?,
                    Some(MemoEntry::Parsing) => {
                        return Err(Error::left_recursion(callee.qualified_name()));
                    }
                    Some(MemoEntry::Settled(Settled {
                        polarity,
                        value,
                        next,
                    })) => {
                        observer.on_memo_hit(callee, polarity, index.position(pos));
                        let frame = self.frame()?;
                        frame.locals.last = value;
                        frame.polarity = polarity;
                        frame.push(ip + 1, next);
                        self.note_progress(next);
                    }
                }
            }
        }

        Ok(None)
    }

    /// Pushes a new activation of `rule` at `pos` and marks it `Parsing`.
    fn enter<O: VmObserver>(
        &mut self,
        id: RuleId,
        rule: &Rule,
        pos: NodeId,
        index: &mut TokenIndex,
        observer: &mut O,
    ) -> Result<()> {
        if let Some(limit) = self.config.max_call_depth {
            if self.calls.len() >= limit {
                return Err(Error::limit_exceeded(SemanticLimit::MaxCallDepth {
                    limit,
                    rule: Some(rule.qualified_name().to_string()),
                }));
            }
        }

        index.memo_mut().begin(pos, id)?;
        self.calls.push(CallFrame::new(id, pos));
        observer.on_rule_enter(rule, self.calls.len(), index.position(pos));
        Ok(())
    }

    /// Settles the active frame, writes its memo slot, and hands its
    /// result to the caller. Returns the outcome once the outermost frame
    /// settles.
    fn settle<O: VmObserver>(
        &mut self,
        grammar: &Grammar,
        polarity: Polarity,
        index: &mut TokenIndex,
        observer: &mut O,
    ) -> Result<Option<ParseOutcome>> {
        let depth = self.calls.len();
        let frame = self.calls.last().ok_or_else(|| Error::stack_underflow("call"))?;
        let reached = frame
            .steps
            .last()
            .ok_or_else(|| Error::stack_underflow("step"))?
            .pos;

        // A failed rule consumes nothing.
        let next = if polarity.is_positive() {
            reached
        } else {
            frame.start
        };
        let settled = Settled {
            polarity,
            value: frame.locals.last.clone(),
            next,
        };
        index
            .memo_mut()
            .settle(frame.start, frame.rule, settled.clone())?;
        observer.on_rule_exit(
            rule_of(grammar, frame.rule)?,
            depth,
            polarity,
            index.position(next),
        );

        let frame = self.calls.pop().ok_or_else(|| Error::stack_underflow("call"))?;
        if self.calls.is_empty() {
            let outcome = self.outcome(index, settled, reached, frame.locals.named);
            index.record_finished(frame.rule, outcome.clone());
            return Ok(Some(outcome));
        }

        let caller = self.frame()?;
        let call_ip = caller
            .steps
            .last()
            .ok_or_else(|| Error::stack_underflow("step"))?
            .ip;
        caller.locals.last = settled.value;
        caller.polarity = polarity;
        caller.push(call_ip + 1, next);
        self.note_progress(next);
        Ok(None)
    }

    fn outcome(
        &self,
        index: &TokenIndex,
        settled: Settled,
        reached: NodeId,
        bindings: BTreeMap<Arc<str>, Value>,
    ) -> ParseOutcome {
        let matched = settled.polarity.is_positive();
        let diagnostics = match self.furthest_failure {
            Some(at) if !matched => self
                .expectations
                .iter()
                .map(|expected| Diagnostic {
                    position: index.position(at),
                    expected: expected.clone(),
                    found: index.token(at).clone(),
                })
                .collect(),
            _ => Vec::new(),
        };

        ParseOutcome {
            polarity: settled.polarity,
            value: matched.then_some(settled.value),
            position: index.position(reached),
            longest_match: index.position(self.longest),
            diagnostics,
            bindings,
        }
    }

    fn note_progress(&mut self, pos: NodeId) {
        if pos > self.longest {
            self.longest = pos;
        }
    }

    /// Records a failed expectation, keeping only the furthest ones.
    fn expect(&mut self, at: NodeId, expected: Expected) {
        if !self.config.collect_diagnostics {
            return;
        }
        match self.furthest_failure.map(|furthest| at.cmp(&furthest)) {
            Some(Ordering::Less) => return,
            Some(Ordering::Equal) => {}
            Some(Ordering::Greater) | None => {
                self.furthest_failure = Some(at);
                self.expectations.clear();
            }
        }
        if self.expectations.len() < self.config.max_diagnostics
            && !self.expectations.contains(&expected)
        {
            self.expectations.push(expected);
        }
    }

    fn frame(&mut self) -> Result<&mut CallFrame> {
        self.calls
            .last_mut()
            .ok_or_else(|| Error::stack_underflow("call"))
    }

    fn top_step(&mut self) -> Result<&mut StepFrame> {
        self.frame()?
            .steps
            .last_mut()
            .ok_or_else(|| Error::stack_underflow("step"))
    }

    /// Describes where the VM stopped.
    fn locate(&self, grammar: &Grammar, index: &TokenIndex) -> ErrorContext {
        let name = |id: RuleId| {
            grammar
                .rule(id)
                .map_or_else(|| id.to_string(), |r| r.qualified_name().to_string())
        };

        let mut context = ErrorContext::new();
        if let Some(frame) = self.calls.last() {
            context = context.with_rule(name(frame.rule));
            if let Some(step) = frame.steps.last() {
                let at = index.position(step.pos);
                context = context
                    .with_ip(step.ip)
                    .with_position(at.offset, at.line, at.column);
            }
        }
        for caller in self.calls.iter().rev().skip(1) {
            context = context.with_frame(name(caller.rule));
        }
        context
    }
}

fn rule_of(grammar: &Grammar, id: RuleId) -> Result<&Rule> {
    grammar
        .rule(id)
        .ok_or_else(|| Error::internal(format!("no rule with id {id}")))
}
