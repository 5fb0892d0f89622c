use crate::common::{as_human_readable, KeyValue, Resource, Scope};
use opentelemetry_sdk::export::metrics;
use serde::{Serialize, Serializer};
use std::{borrow::Cow, time::SystemTime};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceMetrics {
    resource: Resource,
    scope_metrics: Vec<ScopeMetrics>,
}

impl From<&metrics::ResourceMetrics> for ResourceMetrics {
    fn from(value: &metrics::ResourceMetrics) -> Self {
        ResourceMetrics {
            resource: value
                .resource
                .as_ref()
                .map(Resource::from)
                .unwrap_or_else(|| Resource::from(&opentelemetry_sdk::resource::Resource::empty())),
            scope_metrics: value.scope_metrics.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScopeMetrics {
    scope: Scope,
    metrics: Vec<Metric>,
}

impl From<&metrics::ScopeMetrics> for ScopeMetrics {
    fn from(value: &metrics::ScopeMetrics) -> Self {
        ScopeMetrics {
            scope: (&value.scope).into(),
            metrics: value.metrics.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Metric {
    name: Cow<'static, str>,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: Cow<'static, str>,
    #[serde(skip_serializing_if = "str::is_empty")]
    unit: Cow<'static, str>,
    #[serde(flatten)]
    data: MetricData,
}

impl From<&metrics::Metric> for Metric {
    fn from(value: &metrics::Metric) -> Self {
        Metric {
            name: value.name.clone(),
            description: value.description.clone(),
            unit: value.unit.clone(),
            data: (&value.data).into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum MetricData {
    Sum(Sum),
    Gauge(Gauge),
    Histogram(Histogram),
}

impl From<&metrics::AggregatedMetrics> for MetricData {
    fn from(value: &metrics::AggregatedMetrics) -> Self {
        match value {
            metrics::AggregatedMetrics::Sum {
                is_monotonic,
                temporality,
                data_points,
            } => MetricData::Sum(Sum {
                is_monotonic: *is_monotonic,
                aggregation_temporality: (*temporality).into(),
                data_points: data_points.iter().map(Into::into).collect(),
            }),
            metrics::AggregatedMetrics::Gauge { data_points } => MetricData::Gauge(Gauge {
                data_points: data_points.iter().map(Into::into).collect(),
            }),
            metrics::AggregatedMetrics::Histogram {
                temporality,
                data_points,
            } => MetricData::Histogram(Histogram {
                aggregation_temporality: (*temporality).into(),
                data_points: data_points.iter().map(Into::into).collect(),
            }),
            _ => unreachable!("AggregatedMetrics has no other variants"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Temporality {
    Delta = 1,
    Cumulative = 2,
}

impl Serialize for Temporality {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

impl From<metrics::Temporality> for Temporality {
    fn from(value: metrics::Temporality) -> Self {
        match value {
            metrics::Temporality::Cumulative => Temporality::Cumulative,
            metrics::Temporality::Delta => Temporality::Delta,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Sum {
    data_points: Vec<DataPoint>,
    aggregation_temporality: Temporality,
    is_monotonic: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Gauge {
    data_points: Vec<DataPoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataPoint {
    attributes: Vec<KeyValue>,
    #[serde(serialize_with = "as_human_readable")]
    start_time: SystemTime,
    #[serde(serialize_with = "as_human_readable")]
    time: SystemTime,
    value: f64,
}

impl From<&metrics::DataPoint> for DataPoint {
    fn from(value: &metrics::DataPoint) -> Self {
        DataPoint {
            attributes: value.attributes.iter().map(Into::into).collect(),
            start_time: value.start_time,
            time: value.time,
            value: value.value,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Histogram {
    data_points: Vec<HistogramDataPoint>,
    aggregation_temporality: Temporality,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistogramDataPoint {
    attributes: Vec<KeyValue>,
    #[serde(serialize_with = "as_human_readable")]
    start_time: SystemTime,
    #[serde(serialize_with = "as_human_readable")]
    time: SystemTime,
    count: u64,
    sum: f64,
    explicit_bounds: Vec<f64>,
    bucket_counts: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
}

impl From<&metrics::HistogramDataPoint> for HistogramDataPoint {
    fn from(value: &metrics::HistogramDataPoint) -> Self {
        HistogramDataPoint {
            attributes: value.attributes.iter().map(Into::into).collect(),
            start_time: value.start_time,
            time: value.time,
            count: value.count,
            sum: value.sum,
            explicit_bounds: value.bounds.clone(),
            bucket_counts: value.bucket_counts.clone(),
            min: value.min,
            max: value.max,
        }
    }
}
