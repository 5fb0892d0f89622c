//! Errors the pipeline core itself can report, as distinct from errors an
//! exporter implementation reports through [`ExportError`].

use std::time::Duration;
use thiserror::Error;

/// Implemented by exporters so the pipeline can attribute a failure to a
/// concrete exporter without downcasting.
pub trait ExportError: std::error::Error + Send + Sync + 'static {
    /// A short, stable name for the exporter, used in logs and error messages.
    fn exporter_name(&self) -> &'static str;
}

/// An error produced by the batch span processor or metric reader control
/// path, as opposed to an exporter-reported failure.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum OTelSdkError {
    /// An operation was attempted after `shutdown` had already completed.
    #[error("already shut down")]
    AlreadyShutdown,

    /// An export or flush did not complete within its allotted timeout.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// An exporter or internal invariant failed in a way not covered above.
    #[error("{0}")]
    InternalFailure(String),
}

/// A specialized `Result` for operations on the processor/reader control path.
pub type OTelSdkResult = Result<(), OTelSdkError>;
