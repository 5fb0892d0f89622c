use crate::error::{OTelSdkError, OTelSdkResult};
use crate::export::metrics::{PushMetricExporter, ResourceMetrics};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A [`PushMetricExporter`] that appends every collection pass to an
/// in-memory list instead of shipping it anywhere, for use in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetricExporter {
    passes: Arc<Mutex<Vec<ResourceMetrics>>>,
    shut_down: Arc<AtomicBool>,
}

impl InMemoryMetricExporter {
    /// Every collection pass exported so far, in export order.
    pub fn get_finished_metrics(&self) -> Vec<ResourceMetrics> {
        self.passes.lock().expect("lock poisoned").clone()
    }

    /// Clear recorded passes without affecting the shutdown state.
    pub fn reset(&self) {
        self.passes.lock().expect("lock poisoned").clear();
    }
}

impl PushMetricExporter for InMemoryMetricExporter {
    fn export(&self, metrics: &ResourceMetrics) -> OTelSdkResult {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        self.passes.lock().expect("lock poisoned").push(metrics.clone());
        Ok(())
    }

    fn shutdown(&self) -> OTelSdkResult {
        self.shut_down.store(true, Ordering::Release);
        Ok(())
    }
}
