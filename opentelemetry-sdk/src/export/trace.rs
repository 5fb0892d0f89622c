//! The span exporter boundary and the data handed across it.

use crate::error::OTelSdkResult;
use crate::resource::Resource;
use opentelemetry::trace::{SpanContext, SpanId, SpanKind, Status};
use opentelemetry::{InstrumentationScope, KeyValue};
use std::borrow::Cow;
use std::time::SystemTime;

/// One timestamped event recorded on a span.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanEvent {
    /// The event name.
    pub name: Cow<'static, str>,
    /// When the event occurred.
    pub timestamp: SystemTime,
    /// Attributes attached to the event.
    pub attributes: Vec<KeyValue>,
    /// Number of attributes dropped due to collection limits.
    pub dropped_attributes_count: u32,
}

/// A causal reference from one span to another.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanLink {
    /// The linked span's context.
    pub span_context: SpanContext,
    /// Attributes attached to the link.
    pub attributes: Vec<KeyValue>,
    /// Number of attributes dropped due to collection limits.
    pub dropped_attributes_count: u32,
}

/// A finished span, ready for export.
///
/// This is the unit the batch span processor buffers and hands to a
/// [`SpanExporter`]; nothing upstream of `on_end` (sampling, attribute
/// limits, span building) is this crate's concern.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanData {
    /// The span's own identity: trace id, span id, sampling decision.
    pub span_context: SpanContext,
    /// The parent span's id, or the invalid id for a root span.
    pub parent_span_id: SpanId,
    /// The span's relationship to its caller.
    pub span_kind: SpanKind,
    /// The span's operation name.
    pub name: Cow<'static, str>,
    /// When the span started.
    pub start_time: SystemTime,
    /// When the span ended.
    pub end_time: SystemTime,
    /// Attributes recorded on the span.
    pub attributes: Vec<KeyValue>,
    /// Number of attributes dropped due to collection limits.
    pub dropped_attributes_count: u32,
    /// Events recorded on the span, in the order they were added.
    pub events: Vec<SpanEvent>,
    /// Links to other spans, in the order they were added.
    pub links: Vec<SpanLink>,
    /// The span's final status.
    pub status: Status,
    /// The library that produced the span.
    pub instrumentation_scope: InstrumentationScope,
}

/// Implemented by a concrete backend (stdout, OTLP, in-memory, ...) to
/// receive batches of finished spans from the batch span processor.
///
/// `export` is called from inside the processor's export runner, never on a
/// producer thread; it is expected to do its own batching/encoding and
/// report success or failure without panicking. A `shutdown` must make any
/// subsequent `export` fail rather than silently drop data.
pub trait SpanExporter: Send + Sync + std::fmt::Debug {
    /// Export a batch of spans, already grouped by instrumentation scope by
    /// the caller.
    fn export(
        &self,
        batch: Vec<SpanData>,
        resource: &Resource,
    ) -> OTelSdkResult;

    /// Release any resources held by this exporter. Subsequent calls to
    /// `export` should fail with [`crate::error::OTelSdkError::AlreadyShutdown`].
    fn shutdown(&self) -> OTelSdkResult {
        Ok(())
    }

    /// Flush any buffering internal to the exporter itself. Most exporters
    /// have none and can rely on the default no-op.
    fn force_flush(&self) -> OTelSdkResult {
        Ok(())
    }
}
