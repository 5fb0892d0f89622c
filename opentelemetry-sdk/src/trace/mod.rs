//! The batch span processor: the buffering and flushing machinery between a
//! span's `end()` call and the exporter that ships it out.

pub mod span_processor;

pub use span_processor::{
    BatchConfig, BatchConfigBuilder, BatchSpanProcessor, BatchSpanProcessorBuilder, OnEndOutcome,
    SpanProcessor,
};
