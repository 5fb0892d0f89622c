//! Write finished spans and collected metrics to stdout as pretty-printed
//! JSON. Meant for local development and for exercising a pipeline end to
//! end without standing up a collector.
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(all(feature = "metrics", feature = "trace"))]
//! {
//! use opentelemetry_sdk::metrics::{Pipeline, PeriodicReader};
//! use opentelemetry_sdk::resource::Resource;
//! use opentelemetry_sdk::trace::BatchSpanProcessor;
//!
//! let resource = Resource::new(vec![]);
//!
//! let span_processor = BatchSpanProcessor::builder()
//!     .with_exporter(opentelemetry_stdout::SpanExporter::default())
//!     .with_resource(resource.clone())
//!     .build();
//!
//! let pipeline = Pipeline::new(resource);
//! let metric_reader = PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default())
//!     .with_interval(std::time::Duration::from_secs(10))
//!     .build(pipeline);
//!
//! // finished spans and collected metrics now print to stdout as JSON.
//! # }
//! ```
#![warn(missing_debug_implementations, missing_docs)]

pub(crate) mod common;

#[cfg(feature = "metrics")]
mod metrics;
#[cfg(feature = "metrics")]
pub use metrics::*;

#[cfg(feature = "trace")]
mod trace;
#[cfg(feature = "trace")]
pub use trace::*;
