//! API surface shared by the telemetry pipeline core.
//!
//! This crate holds the vocabulary that producers, the batch span processor,
//! and the metric reader all agree on: attribute values, a carrier for
//! request-scoped context, trace/span identifiers, instrumentation scope, and
//! the error types the SDK reports through. It deliberately does not define a
//! `Tracer`, `Meter`, or any global registration facade -- those belong to the
//! public API crate that sits in front of the pipeline, not to the pipeline
//! itself.

#![warn(missing_debug_implementations)]

mod common;
mod context;

pub mod global;

#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg(feature = "trace")]
pub mod trace;

pub use common::{Array, Key, KeyValue, StringValue, Value};
pub use context::Context;

/// Describes an instrumentation library: the module that produced a span or a
/// metric instrument.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct InstrumentationScope {
    name: std::borrow::Cow<'static, str>,
    version: Option<std::borrow::Cow<'static, str>>,
    schema_url: Option<std::borrow::Cow<'static, str>>,
}

impl InstrumentationScope {
    /// Start building a scope with the given library name.
    pub fn builder(name: impl Into<std::borrow::Cow<'static, str>>) -> InstrumentationScopeBuilder {
        InstrumentationScopeBuilder {
            name: name.into(),
            version: None,
            schema_url: None,
        }
    }

    /// The name of the instrumentation library.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version of the instrumentation library, if known.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The schema URL describing the semantic conventions in use, if any.
    pub fn schema_url(&self) -> Option<&str> {
        self.schema_url.as_deref()
    }
}

/// Builder for [`InstrumentationScope`].
#[derive(Debug)]
pub struct InstrumentationScopeBuilder {
    name: std::borrow::Cow<'static, str>,
    version: Option<std::borrow::Cow<'static, str>>,
    schema_url: Option<std::borrow::Cow<'static, str>>,
}

impl InstrumentationScopeBuilder {
    /// Set the library version.
    pub fn with_version(mut self, version: impl Into<std::borrow::Cow<'static, str>>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the schema URL.
    pub fn with_schema_url(mut self, schema_url: impl Into<std::borrow::Cow<'static, str>>) -> Self {
        self.schema_url = Some(schema_url.into());
        self
    }

    /// Build the scope.
    pub fn build(self) -> InstrumentationScope {
        InstrumentationScope {
            name: self.name,
            version: self.version,
            schema_url: self.schema_url,
        }
    }
}
