//! Tracing for the Burrow VM.
//!
//! This crate provides:
//! - [`Tracer`] - A [`VmObserver`](burrow_language::VmObserver) that records
//!   rule entries, exits, memo hits, and faults
//! - [`TraceBuffer`] - A bounded ring buffer of trace records
//! - [`HumanFormatter`] and [`JsonFormatter`] - Renderers for those records

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod trace;

pub use trace::{
    HumanFormatter, JsonFormatter, TraceBuffer, TraceBufferStats, TraceEvent, TraceFormatter,
    TraceOutput, TraceRecord, Tracer, TracerConfig,
};
