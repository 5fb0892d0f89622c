//! Wires a batch span processor and a periodic metric reader to the stdout
//! exporters, records a span and a counter increment, then flushes both.
//!
//! Run with `cargo run --example basic`.

use opentelemetry::trace::{SpanContext, SpanId, SpanKind, Status, TraceFlags, TraceId, TraceState};
use opentelemetry::{InstrumentationScope, KeyValue};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::metrics::{AttributeSet, MetricReader, PeriodicReader, Pipeline};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::{BatchSpanProcessor, SpanProcessor};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

fn main() {
    let resource = Resource::new(vec![KeyValue::new("service.name", "stdout-basic-example")]);

    let span_processor = BatchSpanProcessor::builder()
        .with_exporter(opentelemetry_stdout::SpanExporter::default())
        .with_resource(resource.clone())
        .build();

    let scope = InstrumentationScope::builder("basic-example").build();
    span_processor.on_end(SpanData {
        span_context: SpanContext::new(
            TraceId::from_bytes([1; 16]),
            SpanId::from_bytes([1; 8]),
            TraceFlags::SAMPLED,
            false,
            TraceState::empty(),
        ),
        parent_span_id: SpanId::INVALID,
        span_kind: SpanKind::Internal,
        name: "do-work".into(),
        start_time: SystemTime::now(),
        end_time: SystemTime::now(),
        attributes: vec![KeyValue::new("attempt", 1)],
        dropped_attributes_count: 0,
        events: vec![],
        links: vec![],
        status: Status::Ok,
        instrumentation_scope: scope.clone(),
    });
    span_processor.force_flush().expect("flush spans");

    let pipeline = Pipeline::new(resource);
    let instrument = pipeline.register_instrument(
        opentelemetry::metrics::InstrumentKind::Counter,
        "requests",
        "1",
        "number of requests handled",
        scope,
    );
    let reader = PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default())
        .with_timeout(Duration::from_secs(5))
        .build(Arc::clone(&pipeline));

    pipeline.record(instrument.id, AttributeSet::empty(), 1.0, SystemTime::now());
    reader.collect().expect("collect metrics");

    span_processor.shutdown().expect("shutdown spans");
    reader.shutdown().expect("shutdown metrics");
}
