//! Trace event and record types.
//!
//! This module defines the events that can be traced while the VM runs.

use std::sync::Arc;

use burrow_foundation::SourcePosition;
use burrow_language::Polarity;

// =============================================================================
// Trace Event
// =============================================================================

/// Events that can be traced during a parse.
#[derive(Clone, Debug, PartialEq)]
pub enum TraceEvent {
    /// A parse has started.
    ParseStart {
        /// The start rule path as written.
        start: Arc<str>,
        /// Number of tokens in the input, end marker included.
        tokens: usize,
    },

    /// A parse has finished without a fault.
    ParseEnd {
        /// Whether the start rule matched.
        matched: bool,
        /// Where the start rule stopped.
        position: SourcePosition,
    },

    /// A rule activation was pushed.
    RuleEnter {
        /// Qualified rule name.
        rule: Arc<str>,
        /// Call depth including the new activation.
        depth: usize,
        /// Where the rule starts.
        position: SourcePosition,
    },

    /// A rule activation settled.
    RuleExit {
        /// Qualified rule name.
        rule: Arc<str>,
        /// Call depth of the settled activation.
        depth: usize,
        /// Whether the rule matched.
        polarity: Polarity,
        /// Where the caller continues.
        position: SourcePosition,
    },

    /// A call was answered from the memo table.
    MemoHit {
        /// Qualified rule name.
        rule: Arc<str>,
        /// The memoized polarity.
        polarity: Polarity,
        /// Where the call was made.
        position: SourcePosition,
    },

    /// One instruction is about to execute.
    Instruction {
        /// Qualified rule name.
        rule: Arc<str>,
        /// Instruction pointer within the rule.
        ip: usize,
        /// The instruction's mnemonic.
        op: String,
        /// Current token position.
        position: SourcePosition,
    },

    /// The parse stopped with a fault.
    Fault {
        /// The rendered error.
        message: String,
        /// Innermost rule, when the fault happened inside one.
        rule: Option<String>,
    },
}

impl TraceEvent {
    /// Returns a short name for the event type.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ParseStart { .. } => "parse-start",
            Self::ParseEnd { .. } => "parse-end",
            Self::RuleEnter { .. } => "rule-enter",
            Self::RuleExit { .. } => "rule-exit",
            Self::MemoHit { .. } => "memo-hit",
            Self::Instruction { .. } => "instruction",
            Self::Fault { .. } => "fault",
        }
    }

    /// Returns true if this event opens or closes a parse.
    #[must_use]
    pub fn is_parse_boundary(&self) -> bool {
        matches!(
            self,
            Self::ParseStart { .. } | Self::ParseEnd { .. } | Self::Fault { .. }
        )
    }

    /// Returns true if this is a rule-related event.
    #[must_use]
    pub fn is_rule_event(&self) -> bool {
        matches!(
            self,
            Self::RuleEnter { .. } | Self::RuleExit { .. } | Self::MemoHit { .. }
        )
    }

    /// The rule this event belongs to, if any.
    #[must_use]
    pub fn rule(&self) -> Option<&str> {
        match self {
            Self::RuleEnter { rule, .. }
            | Self::RuleExit { rule, .. }
            | Self::MemoHit { rule, .. }
            | Self::Instruction { rule, .. } => Some(rule),
            Self::Fault { rule, .. } => rule.as_deref(),
            Self::ParseStart { .. } | Self::ParseEnd { .. } => None,
        }
    }
}

// =============================================================================
// Trace Record
// =============================================================================

/// A timestamped trace record.
#[derive(Clone, Debug)]
pub struct TraceRecord {
    /// Unique record ID within the session.
    pub id: u64,
    /// Which parse of the session produced this event, counting from 1.
    pub parse: u64,
    /// Timestamp in nanoseconds since session start.
    pub timestamp_ns: u64,
    /// The trace event.
    pub event: TraceEvent,
}

impl TraceRecord {
    /// Creates a new trace record.
    #[must_use]
    pub fn new(id: u64, parse: u64, timestamp_ns: u64, event: TraceEvent) -> Self {
        Self {
            id,
            parse,
            timestamp_ns,
            event,
        }
    }

    /// Returns the event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}
