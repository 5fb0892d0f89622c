//! Aggregation shapes and the per-datapoint state each one checkpoints from.

use crate::export::metrics::{DataPoint, HistogramDataPoint, Temporality};
use std::sync::Mutex;
use std::time::SystemTime;

/// The aggregation a view applies to an instrument's observations.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Aggregation {
    /// Observations are discarded; no datapoints are ever produced.
    Drop,
    /// The canonical aggregation for the instrument's kind.
    Default,
    /// Running total, monotonic or not.
    Sum {
        /// Whether the underlying instrument only ever increases.
        monotonic: bool,
    },
    /// The most recently observed value.
    LastValue,
    /// A distribution bucketed at fixed boundaries.
    ExplicitBucketHistogram {
        /// Ascending bucket upper bounds.
        boundaries: Vec<f64>,
        /// Whether to additionally track the min/max observed value.
        record_min_max: bool,
    },
}

/// The live, mutable state backing one `(view aggregation, attribute set)`
/// datapoint. Producers mutate this directly; only the owning reader's
/// checkpoint call resets it, and only for delta temporality.
#[derive(Debug)]
pub enum DatapointState {
    /// Backs [`Aggregation::Sum`].
    Sum(Mutex<SumState>),
    /// Backs [`Aggregation::LastValue`].
    LastValue(Mutex<LastValueState>),
    /// Backs [`Aggregation::ExplicitBucketHistogram`].
    Histogram(Mutex<HistogramState>),
}

#[derive(Debug)]
pub struct SumState {
    pub start_time: SystemTime,
    pub value: f64,
    reported_start_time: SystemTime,
    reported_value: f64,
}

#[derive(Debug)]
pub struct LastValueState {
    pub start_time: SystemTime,
    pub value: f64,
    pub time: SystemTime,
}

#[derive(Debug)]
pub struct HistogramState {
    pub start_time: SystemTime,
    pub boundaries: Vec<f64>,
    pub record_min_max: bool,
    pub count: u64,
    pub sum: f64,
    pub bucket_counts: Vec<u64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    reported_start_time: SystemTime,
    reported_count: u64,
    reported_sum: f64,
    reported_bucket_counts: Vec<u64>,
    reported_min: Option<f64>,
    reported_max: Option<f64>,
}

impl DatapointState {
    /// Allocate fresh, zeroed state for the given aggregation shape.
    pub fn new(aggregation: &Aggregation, now: SystemTime) -> Option<Self> {
        match aggregation {
            Aggregation::Drop => None,
            Aggregation::Default => Some(DatapointState::Sum(Mutex::new(SumState {
                start_time: now,
                value: 0.0,
                reported_start_time: now,
                reported_value: 0.0,
            }))),
            Aggregation::Sum { .. } => Some(DatapointState::Sum(Mutex::new(SumState {
                start_time: now,
                value: 0.0,
                reported_start_time: now,
                reported_value: 0.0,
            }))),
            Aggregation::LastValue => Some(DatapointState::LastValue(Mutex::new(LastValueState {
                start_time: now,
                value: 0.0,
                time: now,
            }))),
            Aggregation::ExplicitBucketHistogram {
                boundaries,
                record_min_max,
            } => Some(DatapointState::Histogram(Mutex::new(HistogramState {
                start_time: now,
                boundaries: boundaries.clone(),
                record_min_max: *record_min_max,
                count: 0,
                sum: 0.0,
                bucket_counts: vec![0; boundaries.len() + 1],
                min: None,
                max: None,
                reported_start_time: now,
                reported_count: 0,
                reported_sum: 0.0,
                reported_bucket_counts: vec![0; boundaries.len() + 1],
                reported_min: None,
                reported_max: None,
            }))),
        }
    }

    /// Add a value observed by a synchronous instrument, or record the
    /// latest value for an observable one.
    pub fn record(&self, value: f64, now: SystemTime) {
        match self {
            DatapointState::Sum(state) => {
                let mut state = state.lock().expect("lock poisoned");
                state.value += value;
            }
            DatapointState::LastValue(state) => {
                let mut state = state.lock().expect("lock poisoned");
                state.value = value;
                state.time = now;
            }
            DatapointState::Histogram(state) => {
                let mut state = state.lock().expect("lock poisoned");
                state.count += 1;
                state.sum += value;
                let bucket = state
                    .boundaries
                    .iter()
                    .position(|&bound| value <= bound)
                    .unwrap_or(state.boundaries.len());
                state.bucket_counts[bucket] += 1;
                if state.record_min_max {
                    state.min = Some(state.min.map_or(value, |m| m.min(value)));
                    state.max = Some(state.max.map_or(value, |m| m.max(value)));
                }
            }
        }
    }

    /// Snapshot the current value into the reportable fields `collect_*`
    /// reads and, for delta temporality, reset the live state afterwards.
    /// The snapshot must be taken unconditionally: `collect_*` never reads
    /// the live fields directly, so a cumulative checkpoint still has to
    /// publish the current value even though it resets nothing.
    pub fn checkpoint(&self, temporality: Temporality, collection_time: SystemTime) {
        match self {
            DatapointState::Sum(state) => {
                let mut state = state.lock().expect("lock poisoned");
                state.reported_start_time = state.start_time;
                state.reported_value = state.value;
                if temporality == Temporality::Delta {
                    state.value = 0.0;
                    state.start_time = collection_time;
                }
            }
            DatapointState::LastValue(_) => {
                // The last value is always the latest observation regardless
                // of temporality; there is nothing to snapshot or reset.
            }
            DatapointState::Histogram(state) => {
                let mut state = state.lock().expect("lock poisoned");
                state.reported_start_time = state.start_time;
                state.reported_count = state.count;
                state.reported_sum = state.sum;
                state.reported_bucket_counts = state.bucket_counts.clone();
                state.reported_min = state.min;
                state.reported_max = state.max;
                if temporality == Temporality::Delta {
                    state.count = 0;
                    state.sum = 0.0;
                    state.bucket_counts.iter_mut().for_each(|c| *c = 0);
                    state.min = None;
                    state.max = None;
                    state.start_time = collection_time;
                }
            }
        }
    }

    /// Build the reportable datapoint for this entry from the value
    /// `checkpoint` last snapshotted, not from the (possibly already-reset)
    /// live state. Returns `None` for a sum/last-value mismatch, which
    /// should not occur if the caller matches the aggregation it was
    /// created with.
    pub fn collect_sum(&self, attributes: Vec<opentelemetry::KeyValue>, collection_time: SystemTime) -> Option<DataPoint> {
        match self {
            DatapointState::Sum(state) => {
                let state = state.lock().expect("lock poisoned");
                Some(DataPoint {
                    attributes,
                    start_time: state.reported_start_time,
                    time: collection_time,
                    value: state.reported_value,
                })
            }
            _ => None,
        }
    }

    pub fn collect_last_value(
        &self,
        attributes: Vec<opentelemetry::KeyValue>,
        collection_time: SystemTime,
    ) -> Option<DataPoint> {
        match self {
            DatapointState::LastValue(state) => {
                let state = state.lock().expect("lock poisoned");
                Some(DataPoint {
                    attributes,
                    start_time: state.start_time,
                    time: collection_time,
                    value: state.value,
                })
            }
            _ => None,
        }
    }

    pub fn collect_histogram(
        &self,
        attributes: Vec<opentelemetry::KeyValue>,
        collection_time: SystemTime,
    ) -> Option<HistogramDataPoint> {
        match self {
            DatapointState::Histogram(state) => {
                let state = state.lock().expect("lock poisoned");
                Some(HistogramDataPoint {
                    attributes,
                    start_time: state.reported_start_time,
                    time: collection_time,
                    count: state.reported_count,
                    sum: state.reported_sum,
                    bounds: state.boundaries.clone(),
                    bucket_counts: state.reported_bucket_counts.clone(),
                    min: state.reported_min,
                    max: state.reported_max,
                })
            }
            _ => None,
        }
    }
}

/// The canonical instrument-kind to aggregation mapping used when a view
/// doesn't override it.
pub fn default_aggregation_for(kind: opentelemetry::metrics::InstrumentKind) -> Aggregation {
    use opentelemetry::metrics::InstrumentKind::*;
    match kind {
        Counter | ObservableCounter | UpDownCounter | ObservableUpDownCounter => Aggregation::Sum {
            monotonic: kind.is_monotonic(),
        },
        ObservableGauge => Aggregation::LastValue,
        Histogram => Aggregation::ExplicitBucketHistogram {
            boundaries: vec![
                0.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2500.0,
                5000.0, 7500.0, 10000.0,
            ],
            record_min_max: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Temporality::Delta, 3.0)]
    #[case(Temporality::Cumulative, 8.0)]
    fn sum_checkpoint_by_temporality(#[case] temporality: Temporality, #[case] expected_after: f64) {
        let now = SystemTime::now();
        let state = DatapointState::new(&Aggregation::Sum { monotonic: true }, now).unwrap();
        state.record(5.0, now);
        state.checkpoint(temporality, now);
        assert_eq!(state.collect_sum(vec![], now).unwrap().value, 5.0);
        state.record(3.0, now);
        state.checkpoint(temporality, now);
        assert_eq!(state.collect_sum(vec![], now).unwrap().value, expected_after);
    }

    #[test]
    fn drop_aggregation_allocates_no_state() {
        assert!(DatapointState::new(&Aggregation::Drop, SystemTime::now()).is_none());
    }
}
