//! In-memory exporters used by this crate's own test suite, and exported
//! for downstream crates that want the same fixtures.

#[cfg(feature = "trace")]
pub mod trace;

#[cfg(feature = "metrics")]
pub mod metrics;
