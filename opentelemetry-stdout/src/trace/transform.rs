use crate::common::{as_human_readable, as_unix_nano, KeyValue, Resource, Scope};
use opentelemetry::InstrumentationScope;
use opentelemetry_sdk::export::trace::SpanData as SdkSpanData;
use opentelemetry_sdk::resource::Resource as SdkResource;
use serde::{Serialize, Serializer};
use std::{borrow::Cow, time::SystemTime};

/// One `export()` call's worth of spans, grouped by instrumentation scope
/// under the single resource attached to the processor.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpanData {
    resource_spans: Vec<ResourceSpans>,
}

impl From<(Vec<SdkSpanData>, &SdkResource)> for SpanData {
    fn from((batch, resource): (Vec<SdkSpanData>, &SdkResource)) -> Self {
        let mut scope_spans: Vec<(InstrumentationScope, Vec<Span>)> = Vec::new();
        for sdk_span in batch {
            let scope = sdk_span.instrumentation_scope.clone();
            match scope_spans.iter_mut().find(|(s, _)| *s == scope) {
                Some((_, spans)) => spans.push(sdk_span.into()),
                None => scope_spans.push((scope, vec![sdk_span.into()])),
            }
        }

        SpanData {
            resource_spans: vec![ResourceSpans {
                resource: resource.into(),
                scope_spans: scope_spans
                    .into_iter()
                    .map(|(scope, spans)| ScopeSpans {
                        scope: (&scope).into(),
                        spans,
                    })
                    .collect(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceSpans {
    resource: Resource,
    scope_spans: Vec<ScopeSpans>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScopeSpans {
    scope: Scope,
    spans: Vec<Span>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Span {
    trace_id: String,
    span_id: String,
    parent_span_id: String,
    name: Cow<'static, str>,
    kind: SpanKind,
    #[serde(serialize_with = "as_unix_nano")]
    start_time_unix_nano: SystemTime,
    #[serde(serialize_with = "as_human_readable")]
    start_time: SystemTime,
    #[serde(serialize_with = "as_unix_nano")]
    end_time_unix_nano: SystemTime,
    #[serde(serialize_with = "as_human_readable")]
    end_time: SystemTime,
    attributes: Vec<KeyValue>,
    dropped_attributes_count: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    events: Vec<Event>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    links: Vec<Link>,
    status: Status,
}

impl From<SdkSpanData> for Span {
    fn from(value: SdkSpanData) -> Self {
        Span {
            trace_id: value.span_context.trace_id().to_string(),
            span_id: value.span_context.span_id().to_string(),
            parent_span_id: if value.parent_span_id == opentelemetry::trace::SpanId::INVALID {
                String::new()
            } else {
                value.parent_span_id.to_string()
            },
            name: value.name,
            kind: value.span_kind.into(),
            start_time_unix_nano: value.start_time,
            start_time: value.start_time,
            end_time_unix_nano: value.end_time,
            end_time: value.end_time,
            dropped_attributes_count: value.dropped_attributes_count,
            attributes: value.attributes.iter().map(Into::into).collect(),
            events: value.events.into_iter().map(Into::into).collect(),
            links: value.links.into_iter().map(Into::into).collect(),
            status: value.status.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SpanKind {
    Internal = 1,
    Server = 2,
    Client = 3,
    Producer = 4,
    Consumer = 5,
}

impl Serialize for SpanKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

impl From<opentelemetry::trace::SpanKind> for SpanKind {
    fn from(value: opentelemetry::trace::SpanKind) -> Self {
        match value {
            opentelemetry::trace::SpanKind::Client => SpanKind::Client,
            opentelemetry::trace::SpanKind::Server => SpanKind::Server,
            opentelemetry::trace::SpanKind::Producer => SpanKind::Producer,
            opentelemetry::trace::SpanKind::Consumer => SpanKind::Consumer,
            opentelemetry::trace::SpanKind::Internal => SpanKind::Internal,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    name: Cow<'static, str>,
    #[serde(serialize_with = "as_unix_nano")]
    time_unix_nano: SystemTime,
    attributes: Vec<KeyValue>,
    dropped_attributes_count: u32,
}

impl From<opentelemetry_sdk::export::trace::SpanEvent> for Event {
    fn from(value: opentelemetry_sdk::export::trace::SpanEvent) -> Self {
        Event {
            name: value.name,
            time_unix_nano: value.timestamp,
            attributes: value.attributes.iter().map(Into::into).collect(),
            dropped_attributes_count: value.dropped_attributes_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Link {
    trace_id: String,
    span_id: String,
    attributes: Vec<KeyValue>,
    dropped_attributes_count: u32,
}

impl From<opentelemetry_sdk::export::trace::SpanLink> for Link {
    fn from(value: opentelemetry_sdk::export::trace::SpanLink) -> Self {
        Link {
            trace_id: value.span_context.trace_id().to_string(),
            span_id: value.span_context.span_id().to_string(),
            attributes: value.attributes.iter().map(Into::into).collect(),
            dropped_attributes_count: value.dropped_attributes_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<Cow<'static, str>>,
    code: u32,
}

impl From<opentelemetry::trace::Status> for Status {
    fn from(value: opentelemetry::trace::Status) -> Self {
        match value {
            opentelemetry::trace::Status::Unset => Status {
                message: None,
                code: 0,
            },
            opentelemetry::trace::Status::Error { description } => Status {
                message: Some(description),
                code: 1,
            },
            opentelemetry::trace::Status::Ok => Status {
                message: None,
                code: 2,
            },
        }
    }
}
