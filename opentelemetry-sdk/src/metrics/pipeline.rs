//! The shared tables every reader and every instrument hangs off of: the
//! "meter server" in spec terms, minus anything about how instruments are
//! named at the call site (that lives one layer up, in the public API).

use super::aggregation::{Aggregation, DatapointState};
use super::attribute_set::AttributeSet;
use super::instrument::{Instrument, InstrumentId, ReaderId, ViewAggregationId};
use crate::export::metrics::{AggregatedMetrics, DataPoint, HistogramDataPoint, Metric, ResourceMetrics, ScopeMetrics, Temporality};
use crate::resource::Resource;
use dashmap::DashMap;
use opentelemetry::metrics::InstrumentKind;
use opentelemetry::KeyValue;
use std::sync::Arc;
use std::time::SystemTime;

/// How a reader maps an instrument kind to the aggregation and temporality
/// it wants for it.
#[derive(Clone)]
pub struct ReaderMapping {
    pub aggregation: Arc<dyn Fn(InstrumentKind) -> Aggregation + Send + Sync>,
    pub temporality: Arc<dyn Fn(InstrumentKind) -> Temporality + Send + Sync>,
}

impl Default for ReaderMapping {
    fn default() -> Self {
        ReaderMapping {
            aggregation: Arc::new(super::aggregation::default_aggregation_for),
            temporality: Arc::new(|_| Temporality::Cumulative),
        }
    }
}

#[derive(Clone)]
struct ViewAggregation {
    id: ViewAggregationId,
    reader_id: ReaderId,
    instrument_id: InstrumentId,
    aggregation: Aggregation,
    temporality: Temporality,
}

type ObservableCallback = Arc<dyn Fn() -> Vec<(AttributeSet, f64)> + Send + Sync>;

/// The tables shared by every reader registered against one provider:
/// instruments, per-(instrument, reader) view aggregations, the datapoints
/// those aggregations checkpoint from, and observable callbacks.
#[derive(Default)]
pub struct Pipeline {
    resource: Resource,
    instruments: DashMap<InstrumentId, Arc<Instrument>>,
    readers: DashMap<ReaderId, ReaderMapping>,
    view_aggregations: DashMap<ViewAggregationId, ViewAggregation>,
    metrics: DashMap<(ViewAggregationId, AttributeSet), DatapointState>,
    callbacks: DashMap<InstrumentId, ObservableCallback>,
}

impl Pipeline {
    /// Create a new, empty pipeline carrying the given resource.
    pub fn new(resource: Resource) -> Arc<Self> {
        Arc::new(Pipeline {
            resource,
            ..Default::default()
        })
    }

    /// The resource attached to every export from this pipeline.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Register a reader's aggregation/temporality preferences, assigning it
    /// a fresh id and backfilling view aggregations for every
    /// already-registered instrument.
    pub fn register_reader(&self, mapping: ReaderMapping) -> ReaderId {
        let reader_id = ReaderId::fresh();
        for instrument in self.instruments.iter() {
            self.bind_view_aggregation(reader_id, &mapping, instrument.value());
        }
        self.readers.insert(reader_id, mapping);
        reader_id
    }

    fn bind_view_aggregation(&self, reader_id: ReaderId, mapping: &ReaderMapping, instrument: &Arc<Instrument>) {
        let aggregation = (mapping.aggregation)(instrument.kind);
        let temporality = (mapping.temporality)(instrument.kind);
        let view_aggregation = ViewAggregation {
            id: ViewAggregationId::fresh(),
            reader_id,
            instrument_id: instrument.id,
            aggregation,
            temporality,
        };
        self.view_aggregations
            .insert(view_aggregation.id, view_aggregation);
    }

    /// Register a new instrument, creating a view aggregation for every
    /// reader already registered.
    pub fn register_instrument(
        &self,
        kind: InstrumentKind,
        name: impl Into<std::borrow::Cow<'static, str>>,
        unit: impl Into<std::borrow::Cow<'static, str>>,
        description: impl Into<std::borrow::Cow<'static, str>>,
        scope: opentelemetry::InstrumentationScope,
    ) -> Arc<Instrument> {
        let instrument = Arc::new(Instrument {
            id: InstrumentId::fresh(),
            kind,
            name: name.into(),
            unit: unit.into(),
            description: description.into(),
            scope,
        });
        for reader in self.readers.iter() {
            self.bind_view_aggregation(*reader.key(), reader.value(), &instrument);
        }
        self.instruments.insert(instrument.id, Arc::clone(&instrument));
        instrument
    }

    /// Register the callback for an observable instrument.
    pub fn register_callback(
        &self,
        instrument_id: InstrumentId,
        callback: impl Fn() -> Vec<(AttributeSet, f64)> + Send + Sync + 'static,
    ) {
        self.callbacks.insert(instrument_id, Arc::new(callback));
    }

    /// Record a synchronous observation against every view aggregation bound
    /// to this instrument, across all readers.
    pub fn record(&self, instrument_id: InstrumentId, attributes: AttributeSet, value: f64, now: SystemTime) {
        for va in self.view_aggregations.iter() {
            if va.instrument_id != instrument_id {
                continue;
            }
            self.record_into(va.value(), attributes.clone(), value, now);
        }
    }

    fn record_into(&self, va: &ViewAggregation, attributes: AttributeSet, value: f64, now: SystemTime) {
        if matches!(va.aggregation, Aggregation::Drop) {
            return;
        }
        let key = (va.id, attributes);
        if let Some(state) = self.metrics.get(&key) {
            state.record(value, now);
            return;
        }
        if let Some(state) = DatapointState::new(&va.aggregation, now) {
            self.metrics.entry(key).or_insert(state).record(value, now);
        }
    }

    /// Run every observable instrument's callback once, feeding its
    /// observations into the view aggregations bound to this reader.
    fn run_callbacks(&self, reader_id: ReaderId, now: SystemTime) {
        for callback in self.callbacks.iter() {
            let instrument_id = *callback.key();
            for (attributes, value) in (callback.value())() {
                for va in self.view_aggregations.iter() {
                    if va.reader_id == reader_id && va.instrument_id == instrument_id {
                        self.record_into(va.value(), attributes.clone(), value, now);
                    }
                }
            }
        }
    }

    /// Perform one full collection pass for `reader_id`: run callbacks,
    /// checkpoint every bound view aggregation, and assemble the resulting
    /// metric stream grouped by instrumentation scope.
    pub fn collect(&self, reader_id: ReaderId) -> ResourceMetrics {
        self.run_callbacks(reader_id, SystemTime::now());
        let collection_time = SystemTime::now();

        let mut by_scope: std::collections::HashMap<opentelemetry::InstrumentationScope, Vec<Metric>> =
            std::collections::HashMap::new();

        for va in self.view_aggregations.iter() {
            if va.reader_id != reader_id || matches!(va.aggregation, Aggregation::Drop) {
                continue;
            }
            let Some(instrument) = self.instruments.get(&va.instrument_id) else {
                continue;
            };

            let mut sum_points = Vec::new();
            let mut gauge_points = Vec::new();
            let mut histogram_points = Vec::new();

            let keys: Vec<(ViewAggregationId, AttributeSet)> = self
                .metrics
                .iter()
                .filter(|entry| entry.key().0 == va.id)
                .map(|entry| entry.key().clone())
                .collect();

            for key in keys {
                if let Some(state) = self.metrics.get(&key) {
                    state.checkpoint(va.temporality, collection_time);
                    let attrs: Vec<KeyValue> = key.1.as_slice().to_vec();
                    match &va.aggregation {
                        Aggregation::Sum { .. } | Aggregation::Default => {
                            if let Some(dp) = state.collect_sum(attrs, collection_time) {
                                sum_points.push(dp);
                            }
                        }
                        Aggregation::LastValue => {
                            if let Some(dp) = state.collect_last_value(attrs, collection_time) {
                                gauge_points.push(dp);
                            }
                        }
                        Aggregation::ExplicitBucketHistogram { .. } => {
                            if let Some(dp) = state.collect_histogram(attrs, collection_time) {
                                histogram_points.push(dp);
                            }
                        }
                        Aggregation::Drop => {}
                    }
                }
            }

            let data = build_aggregated(&va.aggregation, va.temporality, sum_points, gauge_points, histogram_points);
            let Some(data) = data else { continue };

            by_scope
                .entry(instrument.scope.clone())
                .or_default()
                .push(Metric {
                    name: instrument.name.clone(),
                    description: instrument.description.clone(),
                    unit: instrument.unit.clone(),
                    data,
                });
        }

        let scope_metrics = by_scope
            .into_iter()
            .map(|(scope, metrics)| ScopeMetrics { scope, metrics })
            .collect();

        ResourceMetrics {
            resource: Some(self.resource.clone()),
            scope_metrics,
        }
    }
}

fn build_aggregated(
    aggregation: &Aggregation,
    temporality: Temporality,
    sum_points: Vec<DataPoint>,
    gauge_points: Vec<DataPoint>,
    histogram_points: Vec<HistogramDataPoint>,
) -> Option<AggregatedMetrics> {
    match aggregation {
        Aggregation::Sum { monotonic } => Some(AggregatedMetrics::Sum {
            is_monotonic: *monotonic,
            temporality,
            data_points: sum_points,
        }),
        Aggregation::Default => Some(AggregatedMetrics::Sum {
            is_monotonic: true,
            temporality,
            data_points: sum_points,
        }),
        Aggregation::LastValue => Some(AggregatedMetrics::Gauge {
            data_points: gauge_points,
        }),
        Aggregation::ExplicitBucketHistogram { .. } => Some(AggregatedMetrics::Histogram {
            temporality,
            data_points: histogram_points,
        }),
        Aggregation::Drop => None,
    }
}
