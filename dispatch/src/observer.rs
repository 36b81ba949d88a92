//! Instrumentation hooks. The dispatcher reports every backend attempt
//! to a set of observers; swapping console logging for a metrics
//! pipeline (or adding both) never touches routing logic.

use std::time::Duration;

use shared::{counter, histogram};

use crate::errors::BackendError;
use crate::metrics_defs;
use crate::types::{Backend, CacheMode};

/// A single backend attempt as seen by the dispatcher.
#[derive(Debug)]
pub struct Attempt<'a> {
    pub operation: &'static str,
    pub backend: Backend,
    pub cache: CacheMode,
    /// Wall time of this attempt alone.
    pub duration: Duration,
    pub error: Option<&'a BackendError>,
}

impl Attempt<'_> {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn outcome(&self) -> &'static str {
        match self.error {
            None => "ok",
            Some(error) => error.kind(),
        }
    }
}

pub trait Observer: Send + Sync {
    fn on_attempt(&self, attempt: &Attempt<'_>);
}

pub struct NullObserver;

impl Observer for NullObserver {
    fn on_attempt(&self, _attempt: &Attempt<'_>) {}
}

/// Logs attempts through the tracing subscriber. Successes are debug
/// noise; failures are warnings with the error attached.
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_attempt(&self, attempt: &Attempt<'_>) {
        match attempt.error {
            None => tracing::debug!(
                operation = attempt.operation,
                backend = %attempt.backend,
                duration_ms = attempt.duration.as_millis() as u64,
                cache = ?attempt.cache,
                "backend attempt succeeded"
            ),
            Some(error) => tracing::warn!(
                operation = attempt.operation,
                backend = %attempt.backend,
                duration_ms = attempt.duration.as_millis() as u64,
                cache = ?attempt.cache,
                error = %error,
                "backend attempt failed"
            ),
        }
    }
}

/// Emits attempt timings and failure counts to the metrics recorder.
pub struct MetricsObserver;

impl Observer for MetricsObserver {
    fn on_attempt(&self, attempt: &Attempt<'_>) {
        histogram!(
            metrics_defs::ATTEMPT_DURATION,
            "operation" => attempt.operation,
            "backend" => attempt.backend.as_str(),
            "outcome" => attempt.outcome()
        )
        .record(attempt.duration.as_secs_f64());

        if let Some(error) = attempt.error {
            counter!(
                metrics_defs::ATTEMPT_FAILURES,
                "operation" => attempt.operation,
                "backend" => attempt.backend.as_str(),
                "kind" => error.kind()
            )
            .increment(1);
        }
    }
}
