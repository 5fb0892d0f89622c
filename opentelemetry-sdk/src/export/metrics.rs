//! The metric exporter boundary and the data handed across it.

use crate::error::OTelSdkResult;
use crate::resource::Resource;
use opentelemetry::{InstrumentationScope, KeyValue};
use std::borrow::Cow;
use std::time::SystemTime;

/// Whether a metric's reported value accumulates since start, or resets
/// each collection interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Temporality {
    /// The value is a running total since the instrument was created; never
    /// reset by a collection.
    Cumulative,
    /// The value covers only the interval since the previous collection;
    /// reset to zero at checkpoint.
    Delta,
}

/// One reported value for a single attribute set.
#[derive(Clone, Debug, PartialEq)]
pub struct DataPoint {
    /// The attributes identifying this series.
    pub attributes: Vec<KeyValue>,
    /// When this series started being tracked (for a delta series, this is
    /// reset at every checkpoint; for cumulative, it is fixed at creation).
    pub start_time: SystemTime,
    /// When this value was observed.
    pub time: SystemTime,
    /// The numeric value.
    pub value: f64,
}

/// A histogram's reported value for a single attribute set.
#[derive(Clone, Debug, PartialEq)]
pub struct HistogramDataPoint {
    /// The attributes identifying this series.
    pub attributes: Vec<KeyValue>,
    /// When this series started being tracked.
    pub start_time: SystemTime,
    /// When this value was observed.
    pub time: SystemTime,
    /// Count of values recorded.
    pub count: u64,
    /// Sum of all recorded values.
    pub sum: f64,
    /// Upper bounds of each bucket, ascending.
    pub bounds: Vec<f64>,
    /// Per-bucket counts, one more entry than `bounds`.
    pub bucket_counts: Vec<u64>,
    /// The smallest recorded value, if tracked.
    pub min: Option<f64>,
    /// The largest recorded value, if tracked.
    pub max: Option<f64>,
}

/// A checkpointed, reportable aggregation for one instrument.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum AggregatedMetrics {
    /// A monotonic or non-monotonic sum.
    Sum {
        /// Whether successive values only move in one direction.
        is_monotonic: bool,
        /// How the reported value relates to the collection window.
        temporality: Temporality,
        /// One entry per distinct attribute set.
        data_points: Vec<DataPoint>,
    },
    /// The last reported value per attribute set.
    Gauge {
        /// One entry per distinct attribute set.
        data_points: Vec<DataPoint>,
    },
    /// A distribution of recorded values.
    Histogram {
        /// How the reported value relates to the collection window.
        temporality: Temporality,
        /// One entry per distinct attribute set.
        data_points: Vec<HistogramDataPoint>,
    },
}

/// One instrument's worth of aggregated data, ready for export.
#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    /// The instrument's name.
    pub name: Cow<'static, str>,
    /// A human-readable description.
    pub description: Cow<'static, str>,
    /// The instrument's unit, if any.
    pub unit: Cow<'static, str>,
    /// The checkpointed data.
    pub data: AggregatedMetrics,
}

/// All metrics produced by one instrumentation scope in a collection pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopeMetrics {
    /// The library that registered the instruments.
    pub scope: InstrumentationScope,
    /// The metrics collected for that scope.
    pub metrics: Vec<Metric>,
}

/// The full output of one collection pass, ready to hand to an exporter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceMetrics {
    /// The resource collection started with; `None` before the reader has
    /// finished registering.
    pub resource: Option<Resource>,
    /// Metrics grouped by the scope that registered their instruments.
    pub scope_metrics: Vec<ScopeMetrics>,
}

/// Implemented by a concrete backend to receive collected metrics from a
/// metric reader.
///
/// Like [`crate::export::trace::SpanExporter`], this is called synchronously
/// from the reader's own control task, never concurrently with another call
/// on the same exporter instance.
pub trait PushMetricExporter: Send + Sync + std::fmt::Debug {
    /// Export one collection pass.
    fn export(&self, metrics: &ResourceMetrics) -> OTelSdkResult;

    /// Release any resources held by this exporter.
    fn shutdown(&self) -> OTelSdkResult {
        Ok(())
    }

    /// Flush any buffering internal to the exporter itself.
    fn force_flush(&self) -> OTelSdkResult {
        Ok(())
    }

    /// The temporality this exporter wants for a given instrument kind.
    /// Most backends want one temporality for everything; the default
    /// mapping is cumulative, matching OTLP's default.
    fn temporality(&self, _kind: opentelemetry::metrics::InstrumentKind) -> Temporality {
        Temporality::Cumulative
    }
}
