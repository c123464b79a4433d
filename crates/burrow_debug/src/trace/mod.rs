//! Tracing system for Burrow.
//!
//! [`Tracer`] is a [`VmObserver`]: hand it to [`Vm::parse_with_observer`]
//! (or use [`Tracer::trace_parse`]) and it records rule entries, exits,
//! memo hits, and faults. A disabled tracer returns from every hook
//! immediately.
//!
//! # Example
//!
//! ```
//! use burrow_debug::{Tracer, TracerConfig};
//! use burrow_language::grammars::{ARITHMETIC_START, arithmetic};
//! use burrow_language::{RulePath, TokenIndex, Vm};
//!
//! let mut tracer = Tracer::new(TracerConfig::new().enabled());
//! let mut index = TokenIndex::from_source("=1+2");
//! let start = RulePath::from(ARITHMETIC_START);
//! let outcome = tracer
//!     .trace_parse(&mut Vm::new(), &arithmetic(), &start, &mut index)
//!     .unwrap();
//! assert!(outcome.is_match());
//! assert!(!tracer.buffer().by_event_type("rule-enter").is_empty());
//! ```

pub mod buffer;
pub mod format;
pub mod record;

pub use buffer::{DEFAULT_BUFFER_SIZE, TraceBuffer, TraceBufferStats};
pub use format::{HumanFormatter, JsonFormatter, TraceFormatter};
pub use record::{TraceEvent, TraceRecord};

use std::io::{self, Write};
use std::time::Instant;

use burrow_foundation::{Error, Result, SourcePosition};
use burrow_language::{
    Grammar, Instruction, ParseOutcome, Polarity, Rule, RulePath, TokenIndex, Vm, VmObserver,
};

// =============================================================================
// Trace Output
// =============================================================================

/// Where trace output should be sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceOutput {
    /// No output (traces still recorded in buffer).
    #[default]
    None,
    /// Write each record to stderr as it is recorded.
    Stderr,
}

// =============================================================================
// Tracer Configuration
// =============================================================================

/// Configuration for the tracer.
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// Whether tracing is enabled.
    pub enabled: bool,
    /// Maximum records to keep in buffer.
    pub buffer_size: usize,
    /// Where to output traces.
    pub output: TraceOutput,
    /// Whether to use JSON format.
    pub json_format: bool,
    /// Filter for specific event types (empty = all).
    pub event_filter: Vec<String>,
    /// Whether to record every executed instruction.
    pub instructions: bool,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            output: TraceOutput::None,
            json_format: false,
            event_filter: Vec::new(),
            instructions: false,
        }
    }
}

impl TracerConfig {
    /// Creates a new tracer configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable tracing.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Builder method to set buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Builder method to output to stderr.
    #[must_use]
    pub fn to_stderr(mut self) -> Self {
        self.output = TraceOutput::Stderr;
        self
    }

    /// Builder method to use JSON format.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Builder method to filter event types, e.g. `"rule-enter"`.
    #[must_use]
    pub fn filter_events(mut self, types: Vec<String>) -> Self {
        self.event_filter = types;
        self
    }

    /// Builder method to record every instruction. Very noisy.
    #[must_use]
    pub fn with_instructions(mut self) -> Self {
        self.instructions = true;
        self
    }
}

// =============================================================================
// Tracer
// =============================================================================

/// Records VM events into a bounded buffer.
pub struct Tracer {
    config: TracerConfig,
    buffer: TraceBuffer,
    current_parse: u64,
    start_time: Instant,
    human_formatter: HumanFormatter,
    json_formatter: JsonFormatter,
}

impl Tracer {
    /// Creates a new tracer with the given configuration.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        let buffer_size = config.buffer_size;
        Self {
            config,
            buffer: TraceBuffer::new(buffer_size),
            current_parse: 0,
            start_time: Instant::now(),
            human_formatter: HumanFormatter::new(),
            json_formatter: JsonFormatter::new(),
        }
    }

    /// Creates a tracer with default configuration (disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(TracerConfig::default())
    }

    /// Creates an enabled tracer that outputs to stderr.
    #[must_use]
    pub fn to_stderr() -> Self {
        Self::new(TracerConfig::new().enabled().to_stderr())
    }

    /// Returns whether tracing is enabled.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enables tracing.
    pub fn enable(&mut self) {
        self.config.enabled = true;
    }

    /// Disables tracing.
    pub fn disable(&mut self) {
        self.config.enabled = false;
    }

    /// Returns the number of the current parse; 0 before the first one.
    #[must_use]
    pub fn current_parse(&self) -> u64 {
        self.current_parse
    }

    /// Sets whether to use JSON output format.
    pub fn set_json_format(&mut self, json: bool) {
        self.config.json_format = json;
    }

    /// Sets the trace output destination.
    pub fn set_output(&mut self, output: TraceOutput) {
        self.config.output = output;
    }

    /// Records a trace event.
    #[inline]
    pub fn record(&mut self, event: TraceEvent) {
        if !self.config.enabled {
            return;
        }

        self.record_internal(event);
    }

    fn record_internal(&mut self, event: TraceEvent) {
        if !self.config.event_filter.is_empty()
            && !self
                .config
                .event_filter
                .iter()
                .any(|t| t == event.event_type())
        {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let timestamp_ns = self.start_time.elapsed().as_nanos() as u64;
        self.buffer.push(self.current_parse, timestamp_ns, event);

        if self.config.output == TraceOutput::Stderr {
            if let Some(record) = self.buffer.last() {
                let line = self.format_record(record);
                let _ = writeln!(io::stderr(), "{line}");
            }
        }
    }

    /// Formats a record using the current format settings.
    #[must_use]
    pub fn format_record(&self, record: &TraceRecord) -> String {
        if self.config.json_format {
            self.json_formatter.format(record)
        } else {
            self.human_formatter.format(record)
        }
    }

    /// Formats multiple records.
    #[must_use]
    pub fn format_records(&self, records: &[&TraceRecord]) -> String {
        if self.config.json_format {
            self.json_formatter.format_many(records)
        } else {
            self.human_formatter.format_many(records)
        }
    }

    /// Returns the trace buffer.
    #[must_use]
    pub fn buffer(&self) -> &TraceBuffer {
        &self.buffer
    }

    /// Clears the trace buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Returns buffer statistics.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        self.buffer.stats()
    }

    // -------------------------------------------------------------------------
    // Parse boundaries
    // -------------------------------------------------------------------------

    /// Starts a new parse and records its start event.
    pub fn begin_parse(&mut self, start: &RulePath, tokens: usize) {
        self.current_parse += 1;
        self.record(TraceEvent::ParseStart {
            start: start.to_string().into(),
            tokens,
        });
    }

    /// Records the end of a parse that did not fault.
    pub fn end_parse(&mut self, outcome: &ParseOutcome) {
        self.record(TraceEvent::ParseEnd {
            matched: outcome.is_match(),
            position: outcome.position,
        });
    }

    /// Runs `vm` over `index` with this tracer attached, bracketing the
    /// parse with start and end records.
    ///
    /// # Errors
    ///
    /// Returns the fault that stopped the parse; it is also recorded.
    pub fn trace_parse(
        &mut self,
        vm: &mut Vm,
        grammar: &Grammar,
        start: &RulePath,
        index: &mut TokenIndex,
    ) -> Result<ParseOutcome> {
        self.begin_parse(start, index.len());
        let outcome = vm.parse_with_observer(grammar, start, index, self)?;
        self.end_parse(&outcome);
        Ok(outcome)
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}

impl VmObserver for Tracer {
    fn on_instruction(
        &mut self,
        rule: &Rule,
        ip: usize,
        op: &Instruction,
        position: SourcePosition,
    ) {
        if !self.config.enabled || !self.config.instructions {
            return;
        }
        self.record_internal(TraceEvent::Instruction {
            rule: rule.qualified_name().into(),
            ip,
            op: op.to_string(),
            position,
        });
    }

    fn on_rule_enter(&mut self, rule: &Rule, depth: usize, position: SourcePosition) {
        self.record(TraceEvent::RuleEnter {
            rule: rule.qualified_name().into(),
            depth,
            position,
        });
    }

    fn on_rule_exit(
        &mut self,
        rule: &Rule,
        depth: usize,
        polarity: Polarity,
        position: SourcePosition,
    ) {
        self.record(TraceEvent::RuleExit {
            rule: rule.qualified_name().into(),
            depth,
            polarity,
            position,
        });
    }

    fn on_memo_hit(&mut self, rule: &Rule, polarity: Polarity, position: SourcePosition) {
        self.record(TraceEvent::MemoHit {
            rule: rule.qualified_name().into(),
            polarity,
            position,
        });
    }

    fn on_fault(&mut self, error: &Error) {
        self.record(TraceEvent::Fault {
            message: error.to_string(),
            rule: error.context.as_ref().and_then(|c| c.rule.clone()),
        });
    }
}
