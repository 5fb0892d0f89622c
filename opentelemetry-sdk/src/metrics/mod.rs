//! The metric reader: periodic or on-demand collection of aggregated
//! instrument state, checkpointed and handed to an exporter.

pub mod aggregation;
pub mod attribute_set;
pub mod instrument;
pub mod periodic_reader;
pub mod pipeline;
pub mod reader;

pub use aggregation::Aggregation;
pub use attribute_set::AttributeSet;
pub use instrument::{Instrument, InstrumentId, ReaderId, ViewAggregationId};
pub use periodic_reader::{PeriodicReader, PeriodicReaderBuilder};
pub use pipeline::{Pipeline, ReaderMapping};
pub use reader::MetricReader;
