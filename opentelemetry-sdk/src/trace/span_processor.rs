//! The batch span processor finite state machine.
//!
//! Producer threads call [`SpanProcessor::on_end`] at arbitrary frequency;
//! that call only ever touches an atomically-selected buffer and must never
//! wait on export progress. A single dedicated control thread per processor
//! owns everything else: the buffer swap, the timers, and the lifetime of
//! the transient export runner.

use crate::error::{OTelSdkError, OTelSdkResult};
use crate::export::trace::SpanExporter;
use crate::resource::Resource;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use dashmap::DashMap;
use opentelemetry::trace::TraceError;
use opentelemetry::{Context, InstrumentationScope};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::export::trace::SpanData;

const ENV_MAX_QUEUE_SIZE: &str = "OTEL_BSP_MAX_QUEUE_SIZE";
const ENV_SCHEDULE_DELAY: &str = "OTEL_BSP_SCHEDULE_DELAY";
const ENV_EXPORT_TIMEOUT: &str = "OTEL_BSP_EXPORT_TIMEOUT";

const DEFAULT_MAX_QUEUE_SIZE: usize = 2048;
const DEFAULT_SCHEDULED_DELAY_MS: u64 = 5000;
const DEFAULT_EXPORTING_TIMEOUT_MS: u64 = 300_000;
const DEFAULT_CHECK_TABLE_SIZE_MS: u64 = 1000;

/// Tunables for a [`BatchSpanProcessor`]. See the field docs for the
/// corresponding `OTEL_BSP_*` environment variable each one defaults from.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Upper bound on the active buffer's entry count before ingest is
    /// disabled. Checked periodically, not on every insert. Defaults from
    /// `OTEL_BSP_MAX_QUEUE_SIZE`.
    pub max_queue_size: usize,
    /// Interval between automatic exports. Defaults from
    /// `OTEL_BSP_SCHEDULE_DELAY`.
    pub scheduled_delay: Duration,
    /// Hard cap on a single export's duration; the runner is abandoned past
    /// this point. Defaults from `OTEL_BSP_EXPORT_TIMEOUT`.
    pub exporting_timeout: Duration,
    /// Interval for the periodic size-threshold check.
    pub check_table_size_interval: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            max_queue_size: env_usize(ENV_MAX_QUEUE_SIZE, DEFAULT_MAX_QUEUE_SIZE),
            scheduled_delay: Duration::from_millis(env_u64(
                ENV_SCHEDULE_DELAY,
                DEFAULT_SCHEDULED_DELAY_MS,
            )),
            exporting_timeout: Duration::from_millis(env_u64(
                ENV_EXPORT_TIMEOUT,
                DEFAULT_EXPORTING_TIMEOUT_MS,
            )),
            check_table_size_interval: Duration::from_millis(DEFAULT_CHECK_TABLE_SIZE_MS),
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Builder for [`BatchConfig`].
#[derive(Clone, Debug, Default)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    /// Start from the environment-derived defaults.
    pub fn new() -> Self {
        BatchConfigBuilder::default()
    }

    /// Set `max_queue_size`.
    pub fn with_max_queue_size(mut self, size: usize) -> Self {
        self.config.max_queue_size = size;
        self
    }

    /// Set `scheduled_delay`.
    pub fn with_scheduled_delay(mut self, delay: Duration) -> Self {
        self.config.scheduled_delay = delay;
        self
    }

    /// Set `exporting_timeout`.
    pub fn with_exporting_timeout(mut self, timeout: Duration) -> Self {
        self.config.exporting_timeout = timeout;
        self
    }

    /// Set `check_table_size_interval`.
    pub fn with_check_table_size_interval(mut self, interval: Duration) -> Self {
        self.config.check_table_size_interval = interval;
        self
    }

    /// Finish building.
    pub fn build(self) -> BatchConfig {
        self.config
    }
}

/// The result of [`SpanProcessor::on_end`].
#[derive(Debug, PartialEq)]
pub enum OnEndOutcome {
    /// The span was appended to the active buffer.
    Accepted,
    /// The span was not sampled, the processor is disabled, or the buffer
    /// is over its size limit. Not an error.
    Dropped,
    /// The active buffer does not exist, or some other unexpected failure
    /// occurred.
    Error(TraceError),
}

/// Implemented by anything that can receive span lifecycle notifications.
/// [`BatchSpanProcessor`] is the only implementation this crate provides.
pub trait SpanProcessor: Send + Sync + std::fmt::Debug {
    /// Called when a span starts. A pass-through hook; the core does not
    /// buffer anything here.
    fn on_start(&self, _span: &mut SpanData, _cx: &Context) {}

    /// Called when a span ends, with ownership of its final data.
    fn on_end(&self, span: SpanData) -> OnEndOutcome;

    /// Request an export of whatever is currently buffered. Returns once
    /// the request has been durably enqueued with the control task; the
    /// actual export may still be in flight when this returns `Ok`.
    fn force_flush(&self) -> OTelSdkResult;

    /// Stop accepting new spans and perform one final blocking export.
    fn shutdown(&self) -> OTelSdkResult;
}

type ScopeBuffer = DashMap<InstrumentationScope, Vec<SpanData>>;

enum Message {
    Flush(Sender<OTelSdkResult>),
    SetExporter(Option<Arc<dyn SpanExporter>>, Sender<OTelSdkResult>),
    Shutdown(Sender<OTelSdkResult>),
    RunnerCompleted { generation: u64, result: OTelSdkResult },
}

/// A bounded, dual-buffered span processor that flushes to an exporter on a
/// timer, a size threshold, or an explicit [`force_flush`](SpanProcessor::force_flush).
///
/// `on_end` writes directly into whichever of the two internal buffers is
/// currently active; a dedicated control thread owns swapping buffers,
/// arming timers, and running the transient export step. There is no global
/// lock shared across processors -- each instance owns its own thread.
pub struct BatchSpanProcessor {
    name: String,
    enabled: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    buffers: Arc<[RwLock<Option<ScopeBuffer>>; 2]>,
    sender: Sender<Message>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for BatchSpanProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchSpanProcessor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Builder for [`BatchSpanProcessor`].
pub struct BatchSpanProcessorBuilder {
    config: BatchConfig,
    exporter: Option<Arc<dyn SpanExporter>>,
    resource: Resource,
    name: Option<String>,
}

impl Default for BatchSpanProcessorBuilder {
    fn default() -> Self {
        BatchSpanProcessorBuilder {
            config: BatchConfig::default(),
            exporter: None,
            resource: Resource::empty(),
            name: None,
        }
    }
}

impl BatchSpanProcessorBuilder {
    /// Start building with environment-derived defaults and no exporter.
    pub fn new() -> Self {
        BatchSpanProcessorBuilder::default()
    }

    /// Attach the exporter spans are shipped to. Without one, automatic
    /// exports simply drain and discard the buffer.
    pub fn with_exporter(mut self, exporter: impl SpanExporter + 'static) -> Self {
        self.exporter = Some(Arc::new(exporter));
        self
    }

    /// Override the full config in one call.
    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach the resource included with every export.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = resource;
        self
    }

    /// Name this processor for diagnostics; defaults to a fresh unique token.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Spawn the control thread and return the processor handle.
    pub fn build(self) -> BatchSpanProcessor {
        let name = self
            .name
            .unwrap_or_else(|| format!("bsp-{}", next_anonymous_id()));
        BatchSpanProcessor::start(name, self.config, self.exporter, self.resource)
    }
}

fn next_anonymous_id() -> u64 {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed) as u64
}

impl BatchSpanProcessor {
    /// Start building a processor.
    pub fn builder() -> BatchSpanProcessorBuilder {
        BatchSpanProcessorBuilder::new()
    }

    fn start(
        name: String,
        config: BatchConfig,
        exporter: Option<Arc<dyn SpanExporter>>,
        resource: Resource,
    ) -> Self {
        let enabled = Arc::new(AtomicBool::new(true));
        let active = Arc::new(AtomicUsize::new(0));
        let buffers = Arc::new([
            RwLock::new(Some(ScopeBuffer::new())),
            RwLock::new(Some(ScopeBuffer::new())),
        ]);
        let (sender, receiver) = crossbeam_channel::unbounded();

        let worker = {
            let enabled = Arc::clone(&enabled);
            let active = Arc::clone(&active);
            let buffers = Arc::clone(&buffers);
            let control_sender = sender.clone();
            let thread_name = name.clone();
            std::thread::Builder::new()
                .name(format!("otel-bsp-{thread_name}"))
                .spawn(move || {
                    run_control_loop(
                        enabled,
                        active,
                        buffers,
                        receiver,
                        control_sender,
                        config,
                        exporter,
                        resource,
                    )
                })
                .expect("failed to spawn batch span processor control thread")
        };

        BatchSpanProcessor {
            name,
            enabled,
            active,
            buffers,
            sender,
            worker: Some(worker),
        }
    }

    /// Replace the exporter at runtime. Ingest is re-enabled immediately;
    /// the previous exporter's `shutdown` is invoked before the new one
    /// takes over the next scheduled export.
    pub fn set_exporter(&self, exporter: Option<Arc<dyn SpanExporter>>) -> OTelSdkResult {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        if self
            .sender
            .send(Message::SetExporter(exporter, reply_tx))
            .is_err()
        {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        reply_rx
            .recv()
            .unwrap_or(Err(OTelSdkError::AlreadyShutdown))
    }

    /// This processor's diagnostic name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SpanProcessor for BatchSpanProcessor {
    fn on_end(&self, span: SpanData) -> OnEndOutcome {
        if !span.span_context.is_sampled() {
            return OnEndOutcome::Dropped;
        }
        if !self.enabled.load(Ordering::Acquire) {
            return OnEndOutcome::Dropped;
        }
        let idx = self.active.load(Ordering::Acquire);
        let guard = match self.buffers[idx].read() {
            Ok(guard) => guard,
            Err(_) => return OnEndOutcome::Error(TraceError::Other("buffer lock poisoned".into())),
        };
        match guard.as_ref() {
            Some(map) => {
                map.entry(span.instrumentation_scope.clone())
                    .or_default()
                    .push(span);
                OnEndOutcome::Accepted
            }
            None => OnEndOutcome::Error(TraceError::Other("no_export_buffer".into())),
        }
    }

    fn force_flush(&self) -> OTelSdkResult {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        if self.sender.send(Message::Flush(reply_tx)).is_err() {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        reply_rx
            .recv()
            .unwrap_or(Err(OTelSdkError::AlreadyShutdown))
    }

    fn shutdown(&self) -> OTelSdkResult {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        if self.sender.send(Message::Shutdown(reply_tx)).is_err() {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        reply_rx
            .recv()
            .unwrap_or(Err(OTelSdkError::AlreadyShutdown))
    }
}

impl Drop for BatchSpanProcessor {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.sender.send(Message::Shutdown(crossbeam_channel::bounded(1).0));
            let _ = worker.join();
        }
    }
}

/// Drain a buffer's scopes into a flat, scope-grouped batch, leaving the
/// scope table empty behind.
fn drain_buffer(map: &ScopeBuffer) -> Vec<SpanData> {
    let mut batch = Vec::with_capacity(map.len());
    for mut entry in map.iter_mut() {
        batch.append(entry.value_mut());
    }
    map.clear();
    batch
}

fn buffer_len(map: &ScopeBuffer) -> usize {
    map.iter().map(|entry| entry.value().len()).sum()
}

fn run_control_loop(
    enabled: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    buffers: Arc<[RwLock<Option<ScopeBuffer>>; 2]>,
    receiver: Receiver<Message>,
    control_sender: Sender<Message>,
    config: BatchConfig,
    mut exporter: Option<Arc<dyn SpanExporter>>,
    resource: Resource,
) {
    let mut generation: u64 = 0;
    let mut exporting_deadline: Option<Instant> = None;
    let mut waiting: HashMap<u64, Vec<Sender<OTelSdkResult>>> = HashMap::new();
    let mut queued_flush: Vec<Sender<OTelSdkResult>> = Vec::new();
    let mut deferred_export_spans = false;

    let mut next_export_at = Instant::now() + config.scheduled_delay;
    let mut next_size_check_at = Instant::now() + config.check_table_size_interval;

    // Swap the active pointer to `old_idx`'s counterpart and hand `old_idx`'s
    // contents to a runner thread, provided the buffer is non-empty and an
    // exporter is configured. Returns the generation assigned to the runner,
    // or `None` if nothing was started.
    let mut try_start_export = |exporter: &Option<Arc<dyn SpanExporter>>,
                                 generation: &mut u64|
     -> Option<u64> {
        let old_idx = active.load(Ordering::Acquire);
        let is_empty = buffers[old_idx]
            .read()
            .ok()
            .and_then(|g| g.as_ref().map(buffer_len))
            .unwrap_or(0)
            == 0;
        if is_empty {
            return None;
        }
        let Some(exp) = exporter.clone() else {
            // No exporter: drain and discard, per the "still absent" FSM
            // transition, and stay idle.
            if let Ok(mut guard) = buffers[old_idx].write() {
                if let Some(map) = guard.as_ref() {
                    drain_buffer(map);
                }
            }
            enabled.store(false, Ordering::Release);
            return None;
        };

        let new_idx = 1 - old_idx;
        active.store(new_idx, Ordering::Release);
        enabled.store(true, Ordering::Release);

        // Swap a fresh buffer into `old_idx` rather than leaving it `None`:
        // a producer that read `active` just before the store above still
        // resolves to `old_idx` and must find a buffer to write into, not a
        // spurious `no_export_buffer` error.
        let old_map = match buffers[old_idx].write() {
            Ok(mut guard) => std::mem::replace(&mut *guard, Some(ScopeBuffer::new())),
            Err(_) => None,
        };
        *generation += 1;
        let this_generation = *generation;
        let resource = resource.clone();
        let reply_sender = control_sender.clone();
        std::thread::spawn(move || {
            let result = match old_map {
                Some(map) => {
                    let batch = drain_buffer(&map);
                    exp.export(batch, &resource)
                }
                None => Err(OTelSdkError::InternalFailure("no_export_buffer".into())),
            };
            let _ = reply_sender.send(Message::RunnerCompleted {
                generation: this_generation,
                result,
            });
        });
        Some(this_generation)
    };

    loop {
        let now = Instant::now();
        let mut wake_at = next_export_at.min(next_size_check_at);
        if let Some(d) = exporting_deadline {
            wake_at = wake_at.min(d);
        }
        let timeout = wake_at.saturating_duration_since(now);

        match receiver.recv_timeout(timeout) {
            Ok(Message::Flush(reply)) => {
                if exporting_deadline.is_some() {
                    queued_flush.push(reply);
                } else if let Some(g) = try_start_export(&exporter, &mut generation) {
                    exporting_deadline = Some(Instant::now() + config.exporting_timeout);
                    waiting.entry(g).or_default().push(reply);
                } else {
                    let _ = reply.send(Ok(()));
                }
            }
            Ok(Message::SetExporter(new_exporter, reply)) => {
                if let Some(old) = exporter.take() {
                    let _ = old.shutdown();
                }
                exporter = new_exporter;
                enabled.store(true, Ordering::Release);
                let _ = reply.send(Ok(()));
            }
            Ok(Message::Shutdown(reply)) => {
                enabled.store(false, Ordering::Release);
                for (_, senders) in waiting.drain() {
                    for sender in senders {
                        let _ = sender.send(Err(OTelSdkError::AlreadyShutdown));
                    }
                }
                for sender in queued_flush.drain(..) {
                    let _ = sender.send(Err(OTelSdkError::AlreadyShutdown));
                }
                let idx = active.load(Ordering::Acquire);
                let final_result = match buffers[idx].write() {
                    Ok(mut guard) => match guard.take() {
                        Some(map) => {
                            let batch = drain_buffer(&map);
                            match &exporter {
                                Some(exp) => exp.export(batch, &resource),
                                None => Ok(()),
                            }
                        }
                        None => Ok(()),
                    },
                    Err(_) => Err(OTelSdkError::InternalFailure("buffer lock poisoned".into())),
                };
                if let Some(exp) = exporter.take() {
                    let _ = exp.shutdown();
                }
                let _ = reply.send(final_result);
                return;
            }
            Ok(Message::RunnerCompleted {
                generation: g,
                result,
            }) => {
                if exporting_deadline.is_none() || g != generation {
                    // Late completion from an abandoned runner; nothing left
                    // to do, the buffer slot it owned was already handed a
                    // fresh replacement when the runner was given up on.
                    continue;
                }
                exporting_deadline = None;
                if let Some(senders) = waiting.remove(&g) {
                    for sender in senders {
                        let _ = sender.send(result.clone());
                    }
                }
                if !queued_flush.is_empty() {
                    let senders = std::mem::take(&mut queued_flush);
                    if let Some(new_g) = try_start_export(&exporter, &mut generation) {
                        exporting_deadline = Some(Instant::now() + config.exporting_timeout);
                        waiting.entry(new_g).or_default().extend(senders);
                    } else {
                        for sender in senders {
                            let _ = sender.send(Ok(()));
                        }
                    }
                } else if deferred_export_spans {
                    deferred_export_spans = false;
                    if try_start_export(&exporter, &mut generation).is_some() {
                        exporting_deadline = Some(Instant::now() + config.exporting_timeout);
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                let now = Instant::now();
                if now >= next_size_check_at {
                    next_size_check_at = now + config.check_table_size_interval;
                    let idx = active.load(Ordering::Acquire);
                    let size = buffers[idx]
                        .read()
                        .ok()
                        .and_then(|g| g.as_ref().map(buffer_len))
                        .unwrap_or(0);
                    // Without an exporter, `try_start_export` has already
                    // disabled ingest for good; the table is only ever
                    // drained, so it would always read back under the limit
                    // and re-enable ingest right away if this didn't check
                    // exporter presence too.
                    if exporting_deadline.is_none() && exporter.is_some() {
                        enabled.store(size < config.max_queue_size, Ordering::Release);
                    }
                }
                if now >= next_export_at {
                    next_export_at = now + config.scheduled_delay;
                    if exporting_deadline.is_some() {
                        deferred_export_spans = true;
                    } else if try_start_export(&exporter, &mut generation).is_some() {
                        exporting_deadline = Some(Instant::now() + config.exporting_timeout);
                    }
                }
                if let Some(deadline) = exporting_deadline {
                    if now >= deadline {
                        // Abandon the runner; it may still be blocked inside
                        // the exporter call with the batch it took, but the
                        // buffer slot it owned was already replaced with a
                        // fresh one when the export started, so producers
                        // can keep using it without waiting for this runner.
                        exporting_deadline = None;
                        if let Some(senders) = waiting.remove(&generation) {
                            for sender in senders {
                                let _ = sender.send(Err(OTelSdkError::Timeout(config.exporting_timeout)));
                            }
                        }
                        if !queued_flush.is_empty() {
                            let senders = std::mem::take(&mut queued_flush);
                            if let Some(new_g) = try_start_export(&exporter, &mut generation) {
                                exporting_deadline = Some(Instant::now() + config.exporting_timeout);
                                waiting.entry(new_g).or_default().extend(senders);
                            } else {
                                for sender in senders {
                                    let _ = sender.send(Ok(()));
                                }
                            }
                        }
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::trace::InMemorySpanExporter;
    use opentelemetry::trace::{SpanContext, SpanId, SpanKind, Status, TraceFlags, TraceId, TraceState};
    use opentelemetry::InstrumentationScope;
    use std::time::SystemTime;

    fn sampled_span(name: &'static str) -> SpanData {
        SpanData {
            span_context: SpanContext::new(
                TraceId::from_bytes([1; 16]),
                SpanId::from_bytes([1; 8]),
                TraceFlags::SAMPLED,
                false,
                TraceState::empty(),
            ),
            parent_span_id: SpanId::INVALID,
            span_kind: SpanKind::Internal,
            name: name.into(),
            start_time: SystemTime::now(),
            end_time: SystemTime::now(),
            attributes: vec![],
            dropped_attributes_count: 0,
            events: vec![],
            links: vec![],
            status: Status::Unset,
            instrumentation_scope: InstrumentationScope::builder("test").build(),
        }
    }

    fn unsampled_span(name: &'static str) -> SpanData {
        let mut span = sampled_span(name);
        span.span_context = SpanContext::new(
            TraceId::from_bytes([1; 16]),
            SpanId::from_bytes([1; 8]),
            TraceFlags::NOT_SAMPLED,
            false,
            TraceState::empty(),
        );
        span
    }

    #[test]
    fn on_end_skips_export_if_not_sampled() {
        let exporter = InMemorySpanExporter::default();
        let processor = BatchSpanProcessor::builder()
            .with_exporter(exporter.clone())
            .with_config(BatchConfigBuilder::new().with_scheduled_delay(Duration::from_secs(60)).build())
            .build();

        assert_eq!(processor.on_end(unsampled_span("s1")), OnEndOutcome::Dropped);
        processor.force_flush().unwrap();
        assert!(exporter.get_finished_spans().is_empty());
        processor.shutdown().unwrap();
    }

    #[test]
    fn force_flush_delivers_accepted_spans() {
        let exporter = InMemorySpanExporter::default();
        let processor = BatchSpanProcessor::builder()
            .with_exporter(exporter.clone())
            .with_config(BatchConfigBuilder::new().with_scheduled_delay(Duration::from_secs(60)).build())
            .build();

        assert_eq!(processor.on_end(sampled_span("s1")), OnEndOutcome::Accepted);
        assert_eq!(processor.on_end(sampled_span("s2")), OnEndOutcome::Accepted);
        processor.force_flush().unwrap();

        let spans = exporter.get_finished_spans();
        assert_eq!(spans.len(), 2);
        processor.shutdown().unwrap();
    }

    #[test]
    fn backpressure_drops_past_queue_size() {
        let exporter = InMemorySpanExporter::default();
        let processor = BatchSpanProcessor::builder()
            .with_exporter(exporter.clone())
            .with_config(
                BatchConfigBuilder::new()
                    .with_max_queue_size(2)
                    .with_scheduled_delay(Duration::from_millis(50))
                    .with_check_table_size_interval(Duration::from_millis(5))
                    .build(),
            )
            .build();

        assert_eq!(processor.on_end(sampled_span("s1")), OnEndOutcome::Accepted);
        assert_eq!(processor.on_end(sampled_span("s2")), OnEndOutcome::Accepted);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(processor.on_end(sampled_span("s3")), OnEndOutcome::Dropped);

        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(exporter.get_finished_spans().len(), 2);
        assert_eq!(processor.on_end(sampled_span("s4")), OnEndOutcome::Accepted);
        processor.shutdown().unwrap();
    }

    #[test]
    fn exporting_timeout_returns_to_idle_and_recovers() {
        #[derive(Debug, Clone)]
        struct SlowExporter;
        impl SpanExporter for SlowExporter {
            fn export(&self, _batch: Vec<SpanData>, _resource: &Resource) -> OTelSdkResult {
                std::thread::sleep(Duration::from_millis(200));
                Ok(())
            }
        }

        let processor = BatchSpanProcessor::builder()
            .with_exporter(SlowExporter)
            .with_config(
                BatchConfigBuilder::new()
                    .with_scheduled_delay(Duration::from_millis(20))
                    .with_exporting_timeout(Duration::from_millis(50))
                    .build(),
            )
            .build();

        assert_eq!(processor.on_end(sampled_span("s1")), OnEndOutcome::Accepted);
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(processor.on_end(sampled_span("s2")), OnEndOutcome::Accepted);
        processor.shutdown().unwrap();
    }

    #[test]
    fn shutdown_performs_terminal_flush() {
        let exporter = InMemorySpanExporter::default();
        let processor = BatchSpanProcessor::builder()
            .with_exporter(exporter.clone())
            .with_config(BatchConfigBuilder::new().with_scheduled_delay(Duration::from_secs(60)).build())
            .build();

        assert_eq!(processor.on_end(sampled_span("s1")), OnEndOutcome::Accepted);
        processor.shutdown().unwrap();
        assert_eq!(exporter.get_finished_spans().len(), 1);
    }
}
