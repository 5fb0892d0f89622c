use opentelemetry::metrics::InstrumentKind;
use opentelemetry::InstrumentationScope;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

fn next_id(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::Relaxed)
}

/// Opaque, stable identity for a reader, assigned when it registers with a
/// [`super::pipeline::Pipeline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReaderId(u64);

impl ReaderId {
    pub(crate) fn fresh() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        ReaderId(next_id(&COUNTER))
    }
}

/// Opaque identity for a registered instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstrumentId(u64);

impl InstrumentId {
    pub(crate) fn fresh() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        InstrumentId(next_id(&COUNTER))
    }
}

/// Identity of one `(instrument, reader)` aggregation binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewAggregationId(u64);

impl ViewAggregationId {
    pub(crate) fn fresh() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        ViewAggregationId(next_id(&COUNTER))
    }
}

/// A registered instrument: the identity producers record against and
/// readers report under.
#[derive(Clone, Debug)]
pub struct Instrument {
    pub id: InstrumentId,
    pub kind: InstrumentKind,
    pub name: Cow<'static, str>,
    pub unit: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub scope: InstrumentationScope,
}
