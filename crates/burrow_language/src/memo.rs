//! Packrat memo table.
//!
//! One entry per (node, rule) pair. Entries only ever move forward:
//! absent (unparsed) -> `Parsing` -> settled. A settled entry is never
//! rewritten, which is what lets every activation share the table without
//! further bookkeeping.

use std::collections::HashMap;
use std::fmt;

use burrow_foundation::{Error, Result, Value};

use crate::grammar::RuleId;
use crate::token_index::NodeId;

/// Outcome polarity of a test, a rule, or a whole parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Polarity {
    /// The last test or rule matched.
    Positive,
    /// The last test or rule did not match.
    #[default]
    Negative,
}

impl Polarity {
    /// Returns true for `Positive`.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }

    /// Positive when `matched` is true.
    #[must_use]
    pub const fn from_bool(matched: bool) -> Self {
        if matched { Self::Positive } else { Self::Negative }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

/// The observable state of a memo slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoState {
    /// The rule has never been tried here.
    Unparsed,
    /// The rule is running here and has not settled.
    Parsing,
    /// The rule matched here.
    Positive,
    /// The rule failed here.
    Negative,
}

/// A settled rule result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settled {
    /// Whether the rule matched.
    pub polarity: Polarity,
    /// The value the rule produced.
    pub value: Value,
    /// Where the caller continues.
    pub next: NodeId,
}

/// A memo slot that has left the unparsed state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemoEntry {
    /// The rule is running here.
    Parsing,
    /// The rule has finished here.
    Settled(Settled),
}

/// Per-position rule results.
#[derive(Debug, Default)]
pub struct MemoTable {
    entries: HashMap<(NodeId, RuleId), MemoEntry>,
}

impl MemoTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `rule` at `node`, if it left the unparsed state.
    #[must_use]
    pub fn get(&self, node: NodeId, rule: RuleId) -> Option<&MemoEntry> {
        self.entries.get(&(node, rule))
    }

    /// Returns the state of the slot for `rule` at `node`.
    #[must_use]
    pub fn state(&self, node: NodeId, rule: RuleId) -> MemoState {
        match self.get(node, rule) {
            None => MemoState::Unparsed,
            Some(MemoEntry::Parsing) => MemoState::Parsing,
            Some(MemoEntry::Settled(s)) if s.polarity.is_positive() => MemoState::Positive,
            Some(MemoEntry::Settled(_)) => MemoState::Negative,
        }
    }

    /// Marks `rule` as running at `node`.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the slot is not unparsed.
    pub fn begin(&mut self, node: NodeId, rule: RuleId) -> Result<()> {
        if self.entries.contains_key(&(node, rule)) {
            return Err(Error::internal(format!(
                "memo slot for {rule} at node {} already begun",
                node.index()
            )));
        }
        self.entries.insert((node, rule), MemoEntry::Parsing);
        Ok(())
    }

    /// Records the result of `rule` at `node`.
    ///
    /// # Errors
    ///
    /// Returns an internal error unless the slot is currently `Parsing`.
    pub fn settle(&mut self, node: NodeId, rule: RuleId, settled: Settled) -> Result<()> {
        match self.entries.get_mut(&(node, rule)) {
            Some(slot @ MemoEntry::Parsing) => {
                *slot = MemoEntry::Settled(settled);
                Ok(())
            }
            Some(MemoEntry::Settled(_)) => Err(Error::internal(format!(
                "memo slot for {rule} at node {} already settled",
                node.index()
            ))),
            None => Err(Error::internal(format!(
                "memo slot for {rule} at node {} settled before it began",
                node.index()
            ))),
        }
    }

    /// Returns the number of slots that have left the unparsed state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no slot has been touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of settled slots.
    #[must_use]
    pub fn settled_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, MemoEntry::Settled(_)))
            .count()
    }
}
