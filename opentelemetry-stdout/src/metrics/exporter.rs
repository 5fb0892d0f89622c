use super::transform::ResourceMetrics as JsonResourceMetrics;
use opentelemetry_sdk::error::{OTelSdkError, OTelSdkResult};
use opentelemetry_sdk::export::metrics::{ResourceMetrics, Temporality};
use opentelemetry_sdk::export::metrics::PushMetricExporter as _;
use opentelemetry::metrics::InstrumentKind;
use std::sync::atomic::{AtomicBool, Ordering};

/// Writes one collection pass to stdout as pretty-printed JSON.
pub struct MetricExporter {
    is_shutdown: AtomicBool,
    temporality: Temporality,
}

impl std::fmt::Debug for MetricExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MetricExporter")
    }
}

impl Default for MetricExporter {
    fn default() -> Self {
        MetricExporter {
            is_shutdown: AtomicBool::new(false),
            temporality: Temporality::Cumulative,
        }
    }
}

impl MetricExporter {
    /// Build an exporter that requests `temporality` for every instrument
    /// kind, instead of the default cumulative.
    pub fn with_temporality(temporality: Temporality) -> Self {
        MetricExporter {
            is_shutdown: AtomicBool::new(false),
            temporality,
        }
    }
}

impl opentelemetry_sdk::export::metrics::PushMetricExporter for MetricExporter {
    fn export(&self, metrics: &ResourceMetrics) -> OTelSdkResult {
        if self.is_shutdown.load(Ordering::Acquire) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        let doc = JsonResourceMetrics::from(metrics);
        serde_json::to_writer_pretty(std::io::stdout(), &doc)
            .map_err(|err| OTelSdkError::InternalFailure(err.to_string()))?;
        println!();
        Ok(())
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.is_shutdown.store(true, Ordering::Release);
        Ok(())
    }

    fn temporality(&self, _kind: InstrumentKind) -> Temporality {
        self.temporality
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_after_shutdown_fails() {
        let exporter = MetricExporter::default();
        exporter.shutdown().unwrap();
        assert!(matches!(
            exporter.export(&ResourceMetrics::default()),
            Err(OTelSdkError::AlreadyShutdown)
        ));
    }
}
