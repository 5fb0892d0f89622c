use super::transform::SpanData as JsonSpanData;
use opentelemetry_sdk::error::{OTelSdkError, OTelSdkResult};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::resource::Resource;
use std::sync::atomic::{AtomicBool, Ordering};

/// Writes finished spans to stdout as pretty-printed JSON.
///
/// One line of prose, one resource-spans document, per [`export`](
/// opentelemetry_sdk::export::trace::SpanExporter::export) call.
pub struct SpanExporter {
    is_shutdown: AtomicBool,
}

impl std::fmt::Debug for SpanExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SpanExporter")
    }
}

impl Default for SpanExporter {
    fn default() -> Self {
        SpanExporter {
            is_shutdown: AtomicBool::new(false),
        }
    }
}

impl opentelemetry_sdk::export::trace::SpanExporter for SpanExporter {
    fn export(&self, batch: Vec<SpanData>, resource: &Resource) -> OTelSdkResult {
        if self.is_shutdown.load(Ordering::Acquire) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        let doc = JsonSpanData::from((batch, resource));
        serde_json::to_writer_pretty(std::io::stdout(), &doc)
            .map_err(|err| OTelSdkError::InternalFailure(err.to_string()))?;
        println!();
        Ok(())
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.is_shutdown.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{SpanContext, SpanId, SpanKind, Status, TraceFlags, TraceId, TraceState};
    use opentelemetry::InstrumentationScope;
    use opentelemetry_sdk::export::trace::SpanExporter as _;
    use std::time::SystemTime;

    fn span() -> SpanData {
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
            name: "span".into(),
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
        let exporter = SpanExporter::default();
        exporter.shutdown().unwrap();
        assert!(matches!(
            exporter.export(vec![span()], &Resource::empty()),
            Err(OTelSdkError::AlreadyShutdown)
        ));
    }
}
