//! Trace identifiers and the errors the trace pipeline can report.

mod span_context;

pub use span_context::{SpanContext, SpanId, SpanKind, TraceFlags, TraceId, TraceState};

use std::time::Duration;
use thiserror::Error;

/// The outcome of a span, set once at `end()` and never mutated afterward.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Status {
    /// The default status, meaning no explicit status was set.
    #[default]
    Unset,
    /// The operation completed successfully.
    Ok,
    /// The operation failed, with an optional description.
    Error {
        /// A description of the failure.
        description: std::borrow::Cow<'static, str>,
    },
}

/// Errors produced by the trace pipeline.
#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum TraceError {
    /// A single export attempt ran longer than its configured timeout.
    #[error("export timed out after {0:?}")]
    ExportTimedOut(Duration),

    /// The exporter itself reported a failure.
    #[error("exporter error: {0}")]
    ExportFailed(String),

    /// Any other trace-pipeline failure, carried as an opaque message.
    #[error("{0}")]
    Other(String),
}

impl From<String> for TraceError {
    fn from(s: String) -> Self {
        TraceError::Other(s)
    }
}

impl From<&str> for TraceError {
    fn from(s: &str) -> Self {
        TraceError::Other(s.to_string())
    }
}

/// A specialized `Result` for trace-pipeline operations.
pub type TraceResult<T> = Result<T, TraceError>;
