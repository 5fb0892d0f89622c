//! A metric reader that collects on a timer, on demand, or both.

use super::instrument::ReaderId;
use super::pipeline::{Pipeline, ReaderMapping};
use super::reader::MetricReader;
use crate::error::{OTelSdkError, OTelSdkResult};
use crate::export::metrics::PushMetricExporter;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const ENV_EXPORT_INTERVAL: &str = "OTEL_METRIC_EXPORT_INTERVAL";
const ENV_EXPORT_TIMEOUT: &str = "OTEL_METRIC_EXPORT_TIMEOUT";

const DEFAULT_EXPORT_INTERVAL_MS: u64 = 60_000;
const DEFAULT_EXPORT_TIMEOUT_MS: u64 = 30_000;

enum Message {
    Collect(Sender<OTelSdkResult>),
    Shutdown(Duration, Sender<OTelSdkResult>),
}

/// Builder for [`PeriodicReader`].
pub struct PeriodicReaderBuilder {
    exporter: Arc<dyn PushMetricExporter>,
    interval: Option<Duration>,
    timeout: Duration,
    mapping: ReaderMapping,
}

impl PeriodicReaderBuilder {
    fn new(exporter: impl PushMetricExporter + 'static) -> Self {
        PeriodicReaderBuilder {
            exporter: Arc::new(exporter),
            // Spec default: absent, meaning collection only happens on an
            // explicit `collect()` call.
            interval: None,
            timeout: Duration::from_millis(DEFAULT_EXPORT_TIMEOUT_MS),
            mapping: ReaderMapping::default(),
        }
    }

    /// Collect automatically every `interval`, in addition to manual calls.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Adopt `OTEL_METRIC_EXPORT_INTERVAL` (default 60s) as the automatic
    /// collection interval, for parity with collector-side defaults.
    pub fn with_interval_from_env(mut self) -> Self {
        self.interval = Some(Duration::from_millis(env_u64(
            ENV_EXPORT_INTERVAL,
            DEFAULT_EXPORT_INTERVAL_MS,
        )));
        self
    }

    /// Bound a single collection-and-export by `timeout`. Defaults from
    /// `OTEL_METRIC_EXPORT_TIMEOUT`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the default aggregation/temporality mapping this reader
    /// asks the pipeline for.
    pub fn with_mapping(mut self, mapping: ReaderMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Register with `pipeline` and spawn the control thread.
    pub fn build(self, pipeline: Arc<Pipeline>) -> PeriodicReader {
        PeriodicReader::start(pipeline, self.exporter, self.mapping, self.interval, self.timeout)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// A reader that collects a pipeline's metrics and hands them to an
/// exporter, either on a fixed interval, on demand via [`MetricReader::collect`],
/// or both.
pub struct PeriodicReader {
    reader_id: ReaderId,
    sender: Sender<Message>,
    is_shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for PeriodicReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicReader")
            .field("reader_id", &self.reader_id)
            .finish_non_exhaustive()
    }
}

impl PeriodicReader {
    /// Start building a reader against `exporter`.
    pub fn builder(exporter: impl PushMetricExporter + 'static) -> PeriodicReaderBuilder {
        PeriodicReaderBuilder::new(exporter)
    }

    fn start(
        pipeline: Arc<Pipeline>,
        exporter: Arc<dyn PushMetricExporter>,
        mapping: ReaderMapping,
        interval: Option<Duration>,
        timeout: Duration,
    ) -> Self {
        let reader_id = pipeline.register_reader(mapping);
        let (sender, receiver) = crossbeam_channel::unbounded();
        let is_shutdown = Arc::new(AtomicBool::new(false));

        let worker = {
            let is_shutdown = Arc::clone(&is_shutdown);
            std::thread::Builder::new()
                .name(format!("otel-metric-reader-{}", reader_id_label(reader_id)))
                .spawn(move || run_control_loop(reader_id, pipeline, exporter, receiver, interval, timeout, is_shutdown))
                .expect("failed to spawn metric reader control thread")
        };

        PeriodicReader {
            reader_id,
            sender,
            is_shutdown,
            worker: Some(worker),
        }
    }

    /// This reader's opaque identity, as registered with its pipeline.
    pub fn reader_id(&self) -> ReaderId {
        self.reader_id
    }
}

fn reader_id_label(id: ReaderId) -> String {
    format!("{id:?}")
}

impl MetricReader for PeriodicReader {
    fn collect(&self) -> OTelSdkResult {
        if self.is_shutdown.load(Ordering::Acquire) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        if self.sender.send(Message::Collect(reply_tx)).is_err() {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        reply_rx.recv().unwrap_or(Err(OTelSdkError::AlreadyShutdown))
    }

    fn shutdown_with_timeout(&self, timeout: Duration) -> OTelSdkResult {
        self.is_shutdown.store(true, Ordering::Release);
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        if self.sender.send(Message::Shutdown(timeout, reply_tx)).is_err() {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        reply_rx.recv().unwrap_or(Err(OTelSdkError::AlreadyShutdown))
    }
}

impl Drop for PeriodicReader {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let (tx, _rx) = crossbeam_channel::bounded(1);
            let _ = self.sender.send(Message::Shutdown(Duration::from_secs(5), tx));
            let _ = worker.join();
        }
    }
}

/// Run one collection pass, bounding the exporter call by `timeout` on a
/// best-effort basis: past the deadline the export is considered lost and
/// an error is reported, but the background thread running it is not force-
/// killed (Rust has no safe mechanism for that).
fn collect_and_export(
    reader_id: ReaderId,
    pipeline: &Arc<Pipeline>,
    exporter: &Arc<dyn PushMetricExporter>,
    timeout: Duration,
) -> OTelSdkResult {
    let metrics = pipeline.collect(reader_id);
    let (tx, rx) = crossbeam_channel::bounded(1);
    let exporter = Arc::clone(exporter);
    std::thread::spawn(move || {
        let result = exporter.export(&metrics);
        let _ = tx.send(result);
    });
    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => Err(OTelSdkError::Timeout(timeout)),
    }
}

fn run_control_loop(
    reader_id: ReaderId,
    pipeline: Arc<Pipeline>,
    exporter: Arc<dyn PushMetricExporter>,
    receiver: Receiver<Message>,
    interval: Option<Duration>,
    timeout: Duration,
    is_shutdown: Arc<AtomicBool>,
) {
    let mut next_fire = interval.map(|i| Instant::now() + i);

    loop {
        let recv_result = match next_fire {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                receiver.recv_timeout(wait)
            }
            None => receiver
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };

        match recv_result {
            Ok(Message::Collect(reply)) => {
                let result = collect_and_export(reader_id, &pipeline, &exporter, timeout);
                // A manual collect cancels and rearms the periodic timer so
                // automatic collections don't pile up right behind it.
                next_fire = interval.map(|i| Instant::now() + i);
                let _ = reply.send(result);
            }
            Ok(Message::Shutdown(shutdown_timeout, reply)) => {
                let result = collect_and_export(reader_id, &pipeline, &exporter, shutdown_timeout);
                let _ = exporter.shutdown();
                let _ = reply.send(result);
                is_shutdown.store(true, Ordering::Release);
                return;
            }
            Err(RecvTimeoutError::Timeout) => {
                next_fire = interval.map(|i| Instant::now() + i);
                let _ = collect_and_export(reader_id, &pipeline, &exporter, timeout);
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::attribute_set::AttributeSet;
    use crate::resource::Resource;
    use crate::testing::metrics::InMemoryMetricExporter;
    use opentelemetry::metrics::InstrumentKind;
    use opentelemetry::InstrumentationScope;

    #[test]
    fn manual_collect_reports_sum() {
        let pipeline = Pipeline::new(Resource::empty());
        let instrument = pipeline.register_instrument(
            InstrumentKind::Counter,
            "requests",
            "1",
            "request count",
            InstrumentationScope::builder("test").build(),
        );

        let exporter = InMemoryMetricExporter::default();
        let reader = PeriodicReader::builder(exporter.clone()).build(Arc::clone(&pipeline));

        pipeline.record(instrument.id, AttributeSet::empty(), 5.0, std::time::SystemTime::now());
        reader.collect().unwrap();

        let passes = exporter.get_finished_metrics();
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].scope_metrics.len(), 1);
        reader.shutdown().unwrap();
    }

    #[test]
    fn delta_counter_resets_between_collections() {
        let pipeline = Pipeline::new(Resource::empty());
        let instrument = pipeline.register_instrument(
            InstrumentKind::Counter,
            "requests",
            "1",
            "request count",
            InstrumentationScope::builder("test").build(),
        );

        let exporter = InMemoryMetricExporter::default();
        let mapping = ReaderMapping {
            aggregation: std::sync::Arc::new(super::super::aggregation::default_aggregation_for),
            temporality: std::sync::Arc::new(|_| crate::export::metrics::Temporality::Delta),
        };
        let reader = PeriodicReaderBuilder::new(exporter.clone())
            .with_mapping(mapping)
            .build(Arc::clone(&pipeline));

        pipeline.record(instrument.id, AttributeSet::empty(), 5.0, std::time::SystemTime::now());
        reader.collect().unwrap();
        pipeline.record(instrument.id, AttributeSet::empty(), 3.0, std::time::SystemTime::now());
        reader.collect().unwrap();

        let passes = exporter.get_finished_metrics();
        assert_eq!(passes.len(), 2);
        let extract_sum = |rm: &crate::export::metrics::ResourceMetrics| match &rm.scope_metrics[0].metrics[0].data {
            crate::export::metrics::AggregatedMetrics::Sum { data_points, .. } => data_points[0].value,
            _ => panic!("expected sum"),
        };
        assert_eq!(extract_sum(&passes[0]), 5.0);
        assert_eq!(extract_sum(&passes[1]), 3.0);
        reader.shutdown().unwrap();
    }

    #[test]
    fn shutdown_is_idempotent_for_further_collects() {
        let pipeline = Pipeline::new(Resource::empty());
        let exporter = InMemoryMetricExporter::default();
        let reader = PeriodicReader::builder(exporter).build(pipeline);
        reader.shutdown().unwrap();
        assert!(reader.collect().is_err());
    }
}
