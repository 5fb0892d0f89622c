//! The span-buffering and metric-collection machinery between instrumented
//! code and an exporter.
//!
//! This crate owns two independent pipelines that share a common shape: an
//! in-process buffer or registry, a background control task, and a boundary
//! to a pluggable exporter.
//!
//! - [`trace`]: the batch span processor, which buffers finished spans and
//!   hands them to an exporter on a timer, a fullness threshold, or an
//!   explicit flush.
//! - [`metrics`]: the metric reader, which collects aggregated instrument
//!   state on a timer or on demand and hands it to an exporter.

pub mod error;
pub mod export;
pub mod resource;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(feature = "trace")]
pub mod trace;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use error::{OTelSdkError, OTelSdkResult};
pub use resource::Resource;
