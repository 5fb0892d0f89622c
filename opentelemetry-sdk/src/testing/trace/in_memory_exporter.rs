use crate::error::{OTelSdkError, OTelSdkResult};
use crate::export::trace::{SpanData, SpanExporter};
use crate::resource::Resource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A [`SpanExporter`] that appends every exported batch to an in-memory
/// list instead of shipping it anywhere, for use in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySpanExporter {
    spans: Arc<Mutex<Vec<SpanData>>>,
    shut_down: Arc<AtomicBool>,
}

impl InMemorySpanExporter {
    /// All spans exported so far, in export order.
    pub fn get_finished_spans(&self) -> Vec<SpanData> {
        self.spans.lock().expect("lock poisoned").clone()
    }

    /// Clear the recorded spans without affecting the shutdown state.
    pub fn reset(&self) {
        self.spans.lock().expect("lock poisoned").clear();
    }
}

impl SpanExporter for InMemorySpanExporter {
    fn export(&self, batch: Vec<SpanData>, _resource: &Resource) -> OTelSdkResult {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        self.spans.lock().expect("lock poisoned").extend(batch);
        Ok(())
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.shut_down.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{SpanContext, SpanId, SpanKind, Status, TraceFlags, TraceId, TraceState};
    use opentelemetry::InstrumentationScope;
    use std::time::SystemTime;

    fn span() -> SpanData {
        SpanData {
            span_context: SpanContext::new(
                TraceId::from_bytes([2; 16]),
                SpanId::from_bytes([2; 8]),
                TraceFlags::SAMPLED,
                false,
                TraceState::empty(),
            ),
            parent_span_id: SpanId::INVALID,
            span_kind: SpanKind::Internal,
            name: "s".into(),
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

    #[test]
    fn export_after_shutdown_fails() {
        let exporter = InMemorySpanExporter::default();
        exporter.shutdown().unwrap();
        assert!(exporter.export(vec![span()], &Resource::empty()).is_err());
    }

    #[test]
    fn reset_clears_recorded_spans() {
        let exporter = InMemorySpanExporter::default();
        exporter.export(vec![span()], &Resource::empty()).unwrap();
        assert_eq!(exporter.get_finished_spans().len(), 1);
        exporter.reset();
        assert!(exporter.get_finished_spans().is_empty());
    }
}
