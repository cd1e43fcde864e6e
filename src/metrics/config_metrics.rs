//! Change delivery metrics using OpenTelemetry.

use crate::error::ListenerError;
use crate::model::ChangeEvent;
use crate::notify::DispatchDiagnostics;
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use std::time::Duration;

/// Diagnostics hook recording change delivery as OpenTelemetry metrics.
///
/// Tracks dispatched events and changed keys per namespace, listener
/// invocations and failures per listener, listener latency and the number of
/// listeners each event fanned out to.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_properties::metrics::ConfigMetrics;
/// use hotswap_properties::notify::{ChangeDispatcher, DispatcherConfig};
/// use opentelemetry::global;
/// use std::sync::Arc;
///
/// # fn example() -> hotswap_properties::error::Result<()> {
/// let metrics = ConfigMetrics::new(global::meter("hotswap-properties"));
/// let dispatcher = ChangeDispatcher::new(DispatcherConfig::default())?
///     .with_diagnostics(Arc::new(metrics));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConfigMetrics {
    events: Counter<u64>,
    changes: Counter<u64>,
    invocations: Counter<u64>,
    failures: Counter<u64>,
    listener_duration: Histogram<f64>,
    listeners: Gauge<i64>,
}

impl ConfigMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let events = meter
            .u64_counter("hotswap_properties.events")
            .with_description("Number of change events dispatched")
            .build();

        let changes = meter
            .u64_counter("hotswap_properties.changes")
            .with_description("Number of changed keys across dispatched events")
            .build();

        let invocations = meter
            .u64_counter("hotswap_properties.listener.invocations")
            .with_description("Number of listener invocations started")
            .build();

        let failures = meter
            .u64_counter("hotswap_properties.listener.failures")
            .with_description("Number of listener invocations that failed or panicked")
            .build();

        let listener_duration = meter
            .f64_histogram("hotswap_properties.listener.duration")
            .with_description("Duration of listener invocations in seconds")
            .with_unit("s")
            .build();

        let listeners = meter
            .i64_gauge("hotswap_properties.listeners")
            .with_description("Number of listeners the latest event was dispatched to")
            .build();

        Self {
            events,
            changes,
            invocations,
            failures,
            listener_duration,
            listeners,
        }
    }
}

impl DispatchDiagnostics for ConfigMetrics {
    fn event_dispatched(&self, event: &ChangeEvent, listeners: usize) {
        let attrs = [KeyValue::new("namespace", event.namespace().to_string())];
        self.events.add(1, &attrs);
        self.changes.add(event.len() as u64, &attrs);
        self.listeners.record(listeners as i64, &attrs);
    }

    fn listener_started(&self, listener: &str, _event: &ChangeEvent) {
        self.invocations
            .add(1, &[KeyValue::new("listener", listener.to_string())]);
    }

    fn listener_succeeded(&self, listener: &str, elapsed: Duration) {
        self.listener_duration.record(
            elapsed.as_secs_f64(),
            &[
                KeyValue::new("listener", listener.to_string()),
                KeyValue::new("outcome", "success"),
            ],
        );
    }

    fn listener_failed(&self, listener: &str, error: &ListenerError, elapsed: Duration) {
        let kind = match error {
            ListenerError::Failed(_) => "error",
            ListenerError::Panicked(_) => "panic",
        };
        self.failures.add(
            1,
            &[
                KeyValue::new("listener", listener.to_string()),
                KeyValue::new("kind", kind),
            ],
        );
        self.listener_duration.record(
            elapsed.as_secs_f64(),
            &[
                KeyValue::new("listener", listener.to_string()),
                KeyValue::new("outcome", "failure"),
            ],
        );
    }
}
