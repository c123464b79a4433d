//! Call and step frames.
//!
//! Each rule activation owns a [`CallFrame`]. Its step stack records every
//! control decision as a new (instruction, position) pair, so earlier
//! positions stay reachable until a loop unwinds them.

use std::collections::BTreeMap;
use std::sync::Arc;

use burrow_foundation::Value;

use crate::grammar::RuleId;
use crate::memo::Polarity;
use crate::token_index::NodeId;

/// An instruction pointer paired with a token position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StepFrame {
    pub ip: usize,
    pub pos: NodeId,
}

/// State of one active repetition loop.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LoopState {
    /// The `ZeroOrMoreTest` instruction of this loop.
    pub test_ip: usize,
    /// Step stack height when the loop opened.
    pub depth: usize,
    /// Set while the body keeps matching.
    pub seek_more: bool,
    /// Where the latest iteration of the body started.
    pub body_start: Option<NodeId>,
}

/// The values a frame has produced.
#[derive(Clone, Debug, Default)]
pub(crate) struct Locals {
    /// `_`: the most recently produced value.
    pub last: Value,
    pub named: BTreeMap<Arc<str>, Value>,
}

/// One rule activation.
#[derive(Debug)]
pub(crate) struct CallFrame {
    pub rule: RuleId,
    pub start: NodeId,
    pub steps: Vec<StepFrame>,
    pub locals: Locals,
    pub polarity: Polarity,
    pub loops: Vec<LoopState>,
}

impl CallFrame {
    pub fn new(rule: RuleId, start: NodeId) -> Self {
        Self {
            rule,
            start,
            steps: vec![StepFrame { ip: 0, pos: start }],
            locals: Locals::default(),
            polarity: Polarity::Negative,
            loops: Vec::new(),
        }
    }

    pub fn push(&mut self, ip: usize, pos: NodeId) {
        self.steps.push(StepFrame { ip, pos });
    }
}
