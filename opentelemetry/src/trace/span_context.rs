use std::fmt;

/// A 16-byte globally unique trace identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

impl TraceId {
    /// The all-zero, invalid trace id.
    pub const INVALID: TraceId = TraceId(0);

    /// Build a trace id from its raw bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        TraceId(u128::from_be_bytes(bytes))
    }

    /// The big-endian byte representation.
    pub fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// An 8-byte unique span identifier within a trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SpanId(u64);

impl SpanId {
    /// The all-zero, invalid span id.
    pub const INVALID: SpanId = SpanId(0);

    /// Build a span id from its raw bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        SpanId(u64::from_be_bytes(bytes))
    }

    /// The big-endian byte representation.
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Flags carried alongside a [`SpanContext`], currently just the sampled bit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceFlags(u8);

impl TraceFlags {
    /// No flags set.
    pub const NOT_SAMPLED: TraceFlags = TraceFlags(0);
    /// The sampled bit.
    pub const SAMPLED: TraceFlags = TraceFlags(1);

    /// Whether the sampled bit is set.
    pub fn is_sampled(&self) -> bool {
        self.0 & Self::SAMPLED.0 != 0
    }
}

/// W3C tracestate: an ordered list of vendor-specific key/value pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceState(Vec<(String, String)>);

impl TraceState {
    /// An empty trace state.
    pub fn empty() -> Self {
        TraceState::default()
    }

    /// Look up a vendor entry by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// The immutable identity of a span: ids, sampling decision, and tracestate.
///
/// This is the subset of span identity the export path needs; it carries no
/// mutable fields (name, timestamps, attributes live on `SpanData`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpanContext {
    trace_id: TraceId,
    span_id: SpanId,
    trace_flags: TraceFlags,
    is_remote: bool,
    trace_state: TraceState,
}

impl SpanContext {
    /// Build a new span context.
    pub fn new(
        trace_id: TraceId,
        span_id: SpanId,
        trace_flags: TraceFlags,
        is_remote: bool,
        trace_state: TraceState,
    ) -> Self {
        SpanContext {
            trace_id,
            span_id,
            trace_flags,
            is_remote,
            trace_state,
        }
    }

    /// An empty, invalid span context.
    pub fn empty_context() -> Self {
        SpanContext::default()
    }

    /// The trace id.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// The span id.
    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    /// Whether this span context is valid (non-zero trace and span ids).
    pub fn is_valid(&self) -> bool {
        self.trace_id != TraceId::INVALID && self.span_id != SpanId::INVALID
    }

    /// Whether this context originated in a remote process.
    pub fn is_remote(&self) -> bool {
        self.is_remote
    }

    /// Whether the sampling decision attached to this span is "sampled".
    pub fn is_sampled(&self) -> bool {
        self.trace_flags.is_sampled()
    }

    /// The W3C tracestate.
    pub fn trace_state(&self) -> &TraceState {
        &self.trace_state
    }
}

/// The relationship of a span to its caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpanKind {
    /// Default, no relationship asserted.
    #[default]
    Internal,
    /// Describes a synchronous request.
    Client,
    /// Serves a synchronous request.
    Server,
    /// Describes the initiator of an asynchronous request.
    Producer,
    /// Describes a child of a producer request.
    Consumer,
}
