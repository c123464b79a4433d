//! Bytecode instruction set for the Burrow parsing VM.
//!
//! Every instruction acts on the active call frame: its polarity, its step
//! stack, or its locals. None of them run outside a frame.

#![allow(clippy::doc_markdown)]

use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

use burrow_foundation::{Error, Result};

use crate::grammar::RuleId;

/// A dotted reference to a rule, e.g. `Number` or `math.Number`.
///
/// Every segment but the last names an import alias; the last names a rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RulePath(Vec<Arc<str>>);

impl RulePath {
    /// Creates a path from its segments.
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parses a dotted path. An empty string gives an empty path.
    #[must_use]
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self(Vec::new());
        }
        Self::new(dotted.split('.'))
    }

    /// Returns the segments.
    #[must_use]
    pub fn segments(&self) -> &[Arc<str>] {
        &self.0
    }

    /// Returns true if the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RulePath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl<const N: usize> From<[&str; N]> for RulePath {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl fmt::Display for RulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// A call site: the path as written plus the rule it resolved to.
///
/// Resolution happens once, on first execution or during eager validation,
/// and is cached here. The instruction array itself stays immutable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    /// The path as written in the grammar.
    pub path: RulePath,
    resolved: OnceCell<RuleId>,
}

impl CallSite {
    /// Creates an unresolved call site.
    #[must_use]
    pub fn new(path: RulePath) -> Self {
        Self {
            path,
            resolved: OnceCell::new(),
        }
    }

    /// Returns the cached target, if resolved.
    #[must_use]
    pub fn resolved(&self) -> Option<RuleId> {
        self.resolved.get().copied()
    }

    /// Returns the cached target or resolves and caches it.
    ///
    /// # Errors
    ///
    /// Propagates any error from `resolve`; nothing is cached in that case.
    pub fn resolve_with(
        &self,
        resolve: impl FnOnce(&RulePath) -> Result<RuleId>,
    ) -> Result<RuleId> {
        if let Some(id) = self.resolved.get() {
            return Ok(*id);
        }
        let id = resolve(&self.path)?;
        Ok(*self.resolved.get_or_init(|| id))
    }
}

/// A single bytecode instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    // === Rule Exit ===
    /// Settle the active rule as matched.
    Success,
    /// Settle the active rule as failed.
    Fail,
    /// Settle the active rule with whatever polarity it currently holds.
    Return,

    // === Input ===
    /// Copy the current token into `_`; advance if a next node exists.
    TakeToken,
    /// Positive iff the current token equals the literal.
    TestLiteral(Arc<str>),
    /// Positive iff the current node is the last one.
    TestEnd,

    // === Control Flow ===
    /// Unconditional jump to an absolute instruction index.
    Jump(usize),
    /// Jump to an absolute index if polarity is negative, else fall through.
    JumpIfNegative(usize),

    // === Locals ===
    /// Store `_` under a name.
    SetLocal(Arc<str>),

    // === Repetition ===
    /// Open a repetition loop at the current position.
    ZeroOrMoreInit,
    /// Enter the loop body (positive) or leave the loop (negative).
    ZeroOrMoreTest,
    /// Body matched: go round again from the new position.
    FindMore,
    /// Body failed: restore the pre-body position and stop looping.
    NoMore,

    // === Rules ===
    /// Invoke another rule, subject to memoization.
    CallRule(CallSite),
}

impl Instruction {
    /// Creates a rule call instruction.
    #[must_use]
    pub fn call(path: impl Into<RulePath>) -> Self {
        Self::CallRule(CallSite::new(path.into()))
    }

    /// Creates a literal test instruction.
    #[must_use]
    pub fn test_literal(literal: impl Into<Arc<str>>) -> Self {
        Self::TestLiteral(literal.into())
    }

    /// Returns the jump target, if this is a jump.
    #[must_use]
    pub const fn jump_target(&self) -> Option<usize> {
        match self {
            Self::Jump(target) | Self::JumpIfNegative(target) => Some(*target),
            _ => None,
        }
    }
}

/// A forward or backward jump target, created before its offset is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JumpLabel(usize);

#[derive(Clone, Debug, Default)]
struct LabelState {
    target: Option<usize>,
    pending: Vec<usize>,
}

/// A growable instruction buffer with backpatched jump labels.
///
/// Jumps emitted through a label before the label is bound are recorded as
/// patch sites; binding the label rewrites every one of them.
#[derive(Clone, Debug, Default)]
pub struct Bytecode {
    /// The instructions.
    pub ops: Vec<Instruction>,
    labels: Vec<LabelState>,
}

impl Bytecode {
    /// Creates an empty bytecode sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instruction and returns its index.
    pub fn emit(&mut self, op: Instruction) -> usize {
        let idx = self.ops.len();
        self.ops.push(op);
        idx
    }

    /// Returns the current instruction count (next instruction index).
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if there are no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Creates a new unbound label.
    pub fn label(&mut self) -> JumpLabel {
        self.labels.push(LabelState::default());
        JumpLabel(self.labels.len() - 1)
    }

    /// Returns the label's target, if bound.
    #[must_use]
    pub fn label_target(&self, label: JumpLabel) -> Option<usize> {
        self.labels[label.0].target
    }

    /// Emits `Jump` to `label`.
    pub fn emit_jump(&mut self, label: JumpLabel) -> usize {
        self.emit_via_label(label, Instruction::Jump)
    }

    /// Emits `JumpIfNegative` to `label`.
    pub fn emit_jump_if_negative(&mut self, label: JumpLabel) -> usize {
        self.emit_via_label(label, Instruction::JumpIfNegative)
    }

    fn emit_via_label(&mut self, label: JumpLabel, make: fn(usize) -> Instruction) -> usize {
        match self.labels[label.0].target {
            Some(target) => self.emit(make(target)),
            None => {
                let idx = self.emit(make(0));
                self.labels[label.0].pending.push(idx);
                idx
            }
        }
    }

    /// Binds `label` to the next instruction index and patches every jump
    /// that referenced it.
    pub fn bind(&mut self, label: JumpLabel) {
        let target = self.len();
        self.bind_to(label, target);
    }

    /// Binds `label` to an explicit target.
    ///
    /// # Panics
    ///
    /// Panics if the label is already bound.
    pub fn bind_to(&mut self, label: JumpLabel, target: usize) {
        let state = &mut self.labels[label.0];
        assert!(state.target.is_none(), "label bound twice");
        state.target = Some(target);
        let pending = std::mem::take(&mut state.pending);
        for idx in pending {
            self.patch_jump(idx, target);
        }
    }

    /// Patches a jump instruction at the given index with a new target.
    ///
    /// # Panics
    /// Panics if the instruction at `idx` is not a jump instruction.
    pub fn patch_jump(&mut self, idx: usize, target: usize) {
        match &mut self.ops[idx] {
            Instruction::Jump(t) | Instruction::JumpIfNegative(t) => {
                *t = target;
            }
            other => panic!("Cannot patch non-jump instruction: {other:?}"),
        }
    }

    /// Finishes the buffer, returning the instructions.
    ///
    /// # Errors
    ///
    /// Returns an internal error if any label still has unpatched jumps.
    pub fn finish(self) -> Result<Vec<Instruction>> {
        let unresolved: usize = self.labels.iter().map(|l| l.pending.len()).sum();
        if unresolved > 0 {
            return Err(Error::internal(format!(
                "{unresolved} jump(s) reference an unbound label"
            )));
        }
        Ok(self.ops)
    }
}
