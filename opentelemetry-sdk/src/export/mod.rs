//! The boundary between the pipeline core and a concrete exporter
//! implementation.
//!
//! Exporters are the one piece of the pipeline this crate does not supply a
//! concrete implementation of; [`trace::SpanExporter`] and
//! [`metrics::PushMetricExporter`] are the traits an exporter crate
//! (stdout, OTLP, or otherwise) implements to plug into the batch span
//! processor or metric reader.

#[cfg(feature = "metrics")]
pub mod metrics;
#[cfg(feature = "trace")]
pub mod trace;
