use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A propagation-bag passed alongside a span through `on_start`/`on_end`.
///
/// The pipeline core treats `Context` as opaque: it never inspects entries,
/// it only carries the bag from the call site into the span processor.
#[derive(Clone, Default)]
pub struct Context {
    entries: Option<Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>,
}

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Context::default()
    }

    /// Return a copy of this context with `value` attached, keyed by its type.
    pub fn with_value<T: Send + Sync + 'static>(&self, value: T) -> Self {
        let mut entries = self
            .entries
            .as_deref()
            .cloned()
            .unwrap_or_default();
        entries.insert(TypeId::of::<T>(), Arc::new(value) as Arc<dyn Any + Send + Sync>);
        Context {
            entries: Some(Arc::new(entries)),
        }
    }

    /// Look up a value previously attached with [`Context::with_value`].
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.entries
            .as_deref()
            .and_then(|entries| entries.get(&TypeId::of::<T>()))
            .and_then(|value| value.downcast_ref::<T>())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("entries", &self.entries.as_ref().map(|e| e.len()).unwrap_or(0))
            .finish()
    }
}
