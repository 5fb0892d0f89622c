//! The metric reader contract: one per configured reader, driving
//! collection on a timer or on demand.

use crate::error::OTelSdkResult;
use std::time::Duration;

/// Implemented by anything that drives metric collection against a
/// registered pipeline. [`super::periodic_reader::PeriodicReader`] is the
/// only implementation this crate provides.
pub trait MetricReader: Send + Sync + std::fmt::Debug {
    /// Perform one full collection pass synchronously, and reschedule the
    /// periodic timer (if any) so automatic collections don't pile up
    /// immediately after a manual call.
    fn collect(&self) -> OTelSdkResult;

    /// Alias for [`collect`](MetricReader::collect); metric readers have no
    /// buffered-but-not-yet-collected state, so flushing is collecting.
    fn force_flush(&self) -> OTelSdkResult {
        self.collect()
    }

    /// Stop further collections. Idempotent.
    fn shutdown(&self) -> OTelSdkResult {
        self.shutdown_with_timeout(Duration::from_secs(5))
    }

    /// Stop further collections, bounding the final collection by `timeout`.
    fn shutdown_with_timeout(&self, timeout: Duration) -> OTelSdkResult;
}
