//! The process resource attached to everything a processor or reader exports.

use opentelemetry::{Key, KeyValue, Value};
use std::borrow::Cow;
use std::collections::HashMap;

/// An immutable set of attributes describing the process producing telemetry.
///
/// A `Resource` is fixed for the lifetime of the processor or reader it is
/// attached to; there is no mechanism here to mutate one after construction,
/// only to build a new one from a wider set of attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resource {
    attrs: HashMap<Key, Value>,
    schema_url: Option<Cow<'static, str>>,
}

impl Resource {
    /// Build a resource from a flat list of attributes, keeping the last
    /// value for any duplicate key.
    pub fn new(kvs: impl IntoIterator<Item = KeyValue>) -> Self {
        let mut attrs = HashMap::new();
        for kv in kvs {
            attrs.insert(kv.key, kv.value);
        }
        Resource {
            attrs,
            schema_url: None,
        }
    }

    /// An empty resource with no attributes.
    pub fn empty() -> Self {
        Resource::default()
    }

    /// Attach a schema URL describing the semantic conventions in use.
    pub fn with_schema_url(
        mut self,
        schema_url: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.schema_url = Some(schema_url.into());
        self
    }

    /// Look up a single attribute by key.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// Iterate over every attribute.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.attrs.iter()
    }

    /// The schema URL, if one was set.
    pub fn schema_url(&self) -> Option<&str> {
        self.schema_url.as_deref()
    }

    /// Merge another resource's attributes in, with `other` taking
    /// precedence on key collision.
    pub fn merge(&self, other: &Resource) -> Resource {
        let mut attrs = self.attrs.clone();
        attrs.extend(other.attrs.clone());
        Resource {
            attrs,
            schema_url: other.schema_url.clone().or_else(|| self.schema_url.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins_on_duplicate_key() {
        let resource = Resource::new(vec![
            KeyValue::new("service.name", "a"),
            KeyValue::new("service.name", "b"),
        ]);
        assert_eq!(
            resource.get(&Key::from_static_str("service.name")),
            Some(&Value::from("b"))
        );
    }

    #[test]
    fn merge_prefers_other() {
        let base = Resource::new(vec![KeyValue::new("service.name", "a")]);
        let overlay = Resource::new(vec![KeyValue::new("service.name", "b")]);
        let merged = base.merge(&overlay);
        assert_eq!(
            merged.get(&Key::from_static_str("service.name")),
            Some(&Value::from("b"))
        );
    }
}
