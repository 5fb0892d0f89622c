use opentelemetry::KeyValue;

/// A metric datapoint's identity within a view aggregation: an order-
/// independent set of attributes.
///
/// `Value` carries `f64`, which has no total order, so a raw `Vec<KeyValue>`
/// can't directly be a hash map key. This keeps the original pairs (for
/// reporting) alongside a canonical, sorted string rendering used only for
/// equality and hashing.
#[derive(Clone, Debug)]
pub struct AttributeSet {
    kvs: Vec<KeyValue>,
    canonical: Vec<(String, String)>,
}

impl AttributeSet {
    /// Build a set from an unordered list of attributes.
    pub fn new(mut kvs: Vec<KeyValue>) -> Self {
        kvs.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        let canonical = kvs
            .iter()
            .map(|kv| (kv.key.as_str().to_string(), format!("{:?}", kv.value)))
            .collect();
        AttributeSet { kvs, canonical }
    }

    /// The empty attribute set.
    pub fn empty() -> Self {
        AttributeSet::new(Vec::new())
    }

    /// The attributes, in canonical (sorted by key) order.
    pub fn as_slice(&self) -> &[KeyValue] {
        &self.kvs
    }
}

impl PartialEq for AttributeSet {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for AttributeSet {}

impl std::hash::Hash for AttributeSet {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}
