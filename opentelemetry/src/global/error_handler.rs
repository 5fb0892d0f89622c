use super::Error;
use once_cell::sync::Lazy;
use std::sync::RwLock;

static GLOBAL_ERROR_HANDLER: Lazy<RwLock<Option<ErrorHandler>>> = Lazy::new(|| RwLock::new(None));

struct ErrorHandler(Box<dyn Fn(&Error) + Send + Sync>);

/// Report an error through the globally configured handler.
///
/// Background-path failures (exporter errors, export timeouts) are swallowed
/// after being reported here; no telemetry-machinery error is allowed to
/// propagate into instrumented application code.
pub fn handle_error<T: Into<Error>>(err: T) {
    let err = err.into();
    match GLOBAL_ERROR_HANDLER.read() {
        Ok(handler) if handler.is_some() => (handler.as_ref().unwrap().0)(&err),
        _ => {
            crate::otel_error!(name: "pipeline_error", error = format!("{err}"));
        }
    }
}

/// Install a custom global error handler, replacing the default which logs
/// via the internal `tracing` target.
pub fn set_error_handler<F>(f: F)
where
    F: Fn(&Error) + Send + Sync + 'static,
{
    if let Ok(mut handler) = GLOBAL_ERROR_HANDLER.write() {
        *handler = Some(ErrorHandler(Box::new(f)));
    }
}
