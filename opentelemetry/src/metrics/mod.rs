//! Metric instrument identity and the errors the metrics pipeline can report.

use thiserror::Error;

/// The kind of an instrument, relevant to the reader because it drives the
/// default aggregation and temporality mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    /// A monotonically increasing value, reported synchronously.
    Counter,
    /// A value that can go up or down, reported synchronously.
    UpDownCounter,
    /// A distribution of values, reported synchronously.
    Histogram,
    /// A monotonically increasing value, reported via callback.
    ObservableCounter,
    /// A value that can go up or down, reported via callback.
    ObservableUpDownCounter,
    /// The last-reported value of something, reported via callback.
    ObservableGauge,
}

impl InstrumentKind {
    /// Whether this instrument kind is observed via callback rather than
    /// synchronous `add`/`record` calls.
    pub fn is_observable(&self) -> bool {
        matches!(
            self,
            InstrumentKind::ObservableCounter
                | InstrumentKind::ObservableUpDownCounter
                | InstrumentKind::ObservableGauge
        )
    }

    /// Whether successive values are expected to only move in one direction.
    pub fn is_monotonic(&self) -> bool {
        matches!(
            self,
            InstrumentKind::Counter | InstrumentKind::ObservableCounter
        )
    }
}

/// Errors produced by the metrics pipeline.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MetricError {
    /// The reader has already been shut down.
    #[error("metric reader is shut down")]
    ReaderShutdown,

    /// The reader has not finished registering with the meter server yet.
    #[error("metric reader is still registering")]
    ReaderNotRegistered,

    /// The exporter reported a failure.
    #[error("exporter error: {0}")]
    ExportFailed(String),

    /// Any other metrics-pipeline failure.
    #[error("{0}")]
    Other(String),
}

impl From<String> for MetricError {
    fn from(s: String) -> Self {
        MetricError::Other(s)
    }
}

/// A specialized `Result` for metrics-pipeline operations.
pub type MetricResult<T> = Result<T, MetricError>;
