use chrono::{LocalResult, TimeZone, Utc};
use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};
use std::{
    borrow::Cow,
    hash::{Hash, Hasher},
    time::{SystemTime, UNIX_EPOCH},
};

#[derive(Debug, Serialize, Clone)]
#[allow(dead_code)]
pub(crate) enum Value {
    #[serde(rename = "boolValue")]
    Bool(bool),
    #[serde(rename = "intValue")]
    Int(i64),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "arrayValue")]
    Array(Vec<Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Double(f) => OrderedFloat(*f).hash(state),
            Value::String(s) => s.hash(state),
            Value::Array(a) => a.iter().for_each(|v| v.hash(state)),
        }
    }
}

impl From<opentelemetry::Value> for Value {
    fn from(value: opentelemetry::Value) -> Self {
        match value {
            opentelemetry::Value::Bool(b) => Value::Bool(b),
            opentelemetry::Value::I64(i) => Value::Int(i),
            opentelemetry::Value::F64(f) => Value::Double(f),
            opentelemetry::Value::String(s) => Value::String(s.as_ref().to_string()),
            opentelemetry::Value::Array(a) => match a {
                opentelemetry::Array::Bool(b) => {
                    Value::Array(b.into_iter().map(Value::Bool).collect())
                }
                opentelemetry::Array::I64(i) => {
                    Value::Array(i.into_iter().map(Value::Int).collect())
                }
                opentelemetry::Array::F64(f) => {
                    Value::Array(f.into_iter().map(Value::Double).collect())
                }
                opentelemetry::Array::String(s) => {
                    Value::Array(s.into_iter().map(|s| Value::String(s.as_ref().to_string())).collect())
                }
                _ => unreachable!("opentelemetry::Array has no other variants"),
            },
            _ => unreachable!("opentelemetry::Value has no other variants"),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq, Hash, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KeyValue {
    key: Cow<'static, str>,
    value: Value,
}

impl From<opentelemetry::KeyValue> for KeyValue {
    fn from(value: opentelemetry::KeyValue) -> Self {
        KeyValue {
            key: value.key.as_str().to_string().into(),
            value: value.value.into(),
        }
    }
}

impl From<&opentelemetry::KeyValue> for KeyValue {
    fn from(value: &opentelemetry::KeyValue) -> Self {
        KeyValue::from(value.clone())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Resource {
    attributes: Vec<KeyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_url: Option<Cow<'static, str>>,
}

impl From<&opentelemetry_sdk::Resource> for Resource {
    fn from(value: &opentelemetry_sdk::Resource) -> Self {
        Resource {
            attributes: value
                .iter()
                .map(|(key, value)| {
                    opentelemetry::KeyValue::new(key.clone(), value.clone()).into()
                })
                .collect(),
            schema_url: value.schema_url().map(|s| s.to_string().into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Scope {
    #[serde(skip_serializing_if = "str::is_empty")]
    name: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_url: Option<Cow<'static, str>>,
}

impl From<&opentelemetry::InstrumentationScope> for Scope {
    fn from(value: &opentelemetry::InstrumentationScope) -> Self {
        Scope {
            name: value.name().to_string().into(),
            version: value.version().map(|v| v.to_string().into()),
            schema_url: value.schema_url().map(|s| s.to_string().into()),
        }
    }
}

pub(crate) fn as_human_readable<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let duration_since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();

    match Utc.timestamp_opt(
        duration_since_epoch.as_secs() as i64,
        duration_since_epoch.subsec_nanos(),
    ) {
        LocalResult::Single(datetime) => serializer.serialize_str(
            datetime
                .format("%Y-%m-%d %H:%M:%S.%3f")
                .to_string()
                .as_ref(),
        ),
        _ => Err(serde::ser::Error::custom("invalid timestamp")),
    }
}

pub(crate) fn as_unix_nano<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let nanos = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    serializer.serialize_u128(nanos)
}
