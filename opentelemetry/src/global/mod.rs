//! Global error reporting and internal structured logging.
//!
//! The pipeline core has no application-facing "global tracer"/"global
//! meter" registry -- that facade lives one layer up, outside this crate's
//! scope. What it does need globally is a single place to route background
//! failures (exporter errors, export timeouts) that cannot be returned to
//! any caller.

mod error_handler;

pub use error_handler::{handle_error, set_error_handler};

use thiserror::Error;

/// Wrapper for errors surfaced from the trace or metrics pipeline that have
/// no synchronous caller to return to.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A trace-pipeline failure.
    #[cfg(feature = "trace")]
    #[error(transparent)]
    Trace(#[from] crate::trace::TraceError),
    /// A metrics-pipeline failure.
    #[cfg(feature = "metrics")]
    #[error(transparent)]
    Metric(#[from] crate::metrics::MetricError),
    /// Any other failure, carried as an opaque message.
    #[error("{0}")]
    Other(String),
}

/// Macro for logging informational messages from inside the SDK.
///
/// Only emits anything when the `internal-logs` feature is enabled; compiles
/// to a no-op otherwise so instrumentation overhead disappears in builds that
/// don't want it.
#[macro_export]
macro_rules! otel_info {
    (name: $name:expr $(,)?) => {
        #[cfg(feature = "internal-logs")]
        { tracing::info!(name: $name, target: env!("CARGO_PKG_NAME"), ""); }
        #[cfg(not(feature = "internal-logs"))]
        { let _ = $name; }
    };
    (name: $name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        #[cfg(feature = "internal-logs")]
        { tracing::info!(name: $name, target: env!("CARGO_PKG_NAME"), $($key = $value),+, ""); }
        #[cfg(not(feature = "internal-logs"))]
        { let _ = ($name, $($value),+); }
    };
}

/// Macro for logging warnings from inside the SDK. See [`otel_info`].
#[macro_export]
macro_rules! otel_warn {
    (name: $name:expr $(,)?) => {
        #[cfg(feature = "internal-logs")]
        { tracing::warn!(name: $name, target: env!("CARGO_PKG_NAME"), ""); }
        #[cfg(not(feature = "internal-logs"))]
        { let _ = $name; }
    };
    (name: $name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        #[cfg(feature = "internal-logs")]
        { tracing::warn!(name: $name, target: env!("CARGO_PKG_NAME"), $($key = $value),+, ""); }
        #[cfg(not(feature = "internal-logs"))]
        { let _ = ($name, $($value),+); }
    };
}

/// Macro for logging debug messages from inside the SDK. See [`otel_info`].
#[macro_export]
macro_rules! otel_debug {
    (name: $name:expr $(,)?) => {
        #[cfg(feature = "internal-logs")]
        { tracing::debug!(name: $name, target: env!("CARGO_PKG_NAME"), ""); }
        #[cfg(not(feature = "internal-logs"))]
        { let _ = $name; }
    };
    (name: $name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        #[cfg(feature = "internal-logs")]
        { tracing::debug!(name: $name, target: env!("CARGO_PKG_NAME"), $($key = $value),+, ""); }
        #[cfg(not(feature = "internal-logs"))]
        { let _ = ($name, $($value),+); }
    };
}

/// Macro for logging errors from inside the SDK. See [`otel_info`].
#[macro_export]
macro_rules! otel_error {
    (name: $name:expr $(,)?) => {
        #[cfg(feature = "internal-logs")]
        { tracing::error!(name: $name, target: env!("CARGO_PKG_NAME"), ""); }
        #[cfg(not(feature = "internal-logs"))]
        { let _ = $name; }
    };
    (name: $name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        #[cfg(feature = "internal-logs")]
        { tracing::error!(name: $name, target: env!("CARGO_PKG_NAME"), $($key = $value),+, ""); }
        #[cfg(not(feature = "internal-logs"))]
        { let _ = ($name, $($value),+); }
    };
}
