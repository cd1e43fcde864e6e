//! Injectable hook observing listener invocations.

use crate::error::ListenerError;
use crate::model::ChangeEvent;
use std::time::Duration;

/// Receives the outcome of every listener invocation.
///
/// Monitoring backends plug in here. Methods run on the dispatcher's worker
/// threads, so implementations should be quick and must not panic.
pub trait DispatchDiagnostics: Send + Sync {
    /// A change event was handed to the dispatcher for `listeners` listeners.
    fn event_dispatched(&self, _event: &ChangeEvent, _listeners: usize) {}

    /// A listener is about to run.
    fn listener_started(&self, _listener: &str, _event: &ChangeEvent) {}

    /// A listener returned successfully.
    fn listener_succeeded(&self, _listener: &str, _elapsed: Duration) {}

    /// A listener failed or panicked.
    fn listener_failed(&self, listener: &str, error: &ListenerError, elapsed: Duration);
}

/// Diagnostics hook that ignores everything.
///
/// Failures are still logged by the dispatcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl DispatchDiagnostics for NoopDiagnostics {
    fn listener_failed(&self, _listener: &str, _error: &ListenerError, _elapsed: Duration) {}
}
