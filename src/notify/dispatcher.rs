//! Asynchronous, fault-isolated delivery of change events.

use super::{ConfigChangeListener, DispatchDiagnostics, NoopDiagnostics, SharedListener};
use crate::core::Validate;
use crate::error::{ConfigError, ListenerError, Result, ValidationError};
use crate::model::ChangeEvent;
use parking_lot::Mutex;
use serde::Deserialize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, error};

/// Settings for the worker pool owned by a [`ChangeDispatcher`].
///
/// Deserializable so it can live next to the rest of an application's
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Runtime worker threads. Listener calls run on the blocking pool, so
    /// one is enough for most deployments.
    pub worker_threads: usize,
    /// Upper bound on concurrently running listener calls. Further calls queue.
    pub max_blocking_threads: usize,
    /// Thread name prefix.
    pub thread_name: String,
    /// How long an idle worker is kept around, in milliseconds.
    pub keep_alive_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_threads: 1,
            max_blocking_threads: 64,
            thread_name: "config-listener".to_string(),
            keep_alive_ms: 60_000,
        }
    }
}

impl Validate for DispatcherConfig {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.worker_threads == 0 {
            errors.push(ValidationError::invalid_field(
                "worker_threads",
                "must be greater than 0",
            ));
        }
        if self.max_blocking_threads == 0 {
            errors.push(ValidationError::invalid_field(
                "max_blocking_threads",
                "must be greater than 0",
            ));
        }
        if self.thread_name.is_empty() {
            errors.push(ValidationError::invalid_field(
                "thread_name",
                "must not be empty",
            ));
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

/// Schedules one isolated task per listener for every change event.
///
/// `dispatch` returns as soon as the tasks are queued. Each listener runs on
/// the blocking pool of the dispatcher's runtime, so a slow listener only ties
/// up its own worker. Errors and panics are logged with the listener's name,
/// reported to the [`DispatchDiagnostics`] hook and then dropped.
///
/// The dispatcher either owns a dedicated runtime ([`new`](Self::new)) or
/// borrows an existing one ([`with_handle`](Self::with_handle)). An owned
/// runtime is torn down by [`shutdown`](Self::shutdown), or in the background
/// on drop.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_properties::model::{ChangeEvent, ConfigChange};
/// use hotswap_properties::notify::{
///     ChangeDispatcher, DispatcherConfig, FnListener, SharedListener,
/// };
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # fn example() -> hotswap_properties::error::Result<()> {
/// let dispatcher = ChangeDispatcher::new(DispatcherConfig::default())?;
/// let listener: SharedListener = Arc::new(FnListener::new("print", |event| {
///     println!("{} changed", event.len());
///     Ok(())
/// }));
///
/// let event = ChangeEvent::new("app", vec![ConfigChange::added("app", "k", "v")]).unwrap();
/// dispatcher.dispatch(Arc::new(event), &[listener])?;
///
/// dispatcher.shutdown(Duration::from_secs(1));
/// # Ok(())
/// # }
/// ```
pub struct ChangeDispatcher {
    handle: Handle,
    runtime: Mutex<Option<Runtime>>,
    diagnostics: Arc<dyn DispatchDiagnostics>,
    shut_down: AtomicBool,
}

impl ChangeDispatcher {
    /// Create a dispatcher with its own worker pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the runtime cannot be
    /// started.
    pub fn new(config: DispatcherConfig) -> Result<Self> {
        config.validate()?;

        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .max_blocking_threads(config.max_blocking_threads)
            .thread_name(config.thread_name.clone())
            .thread_keep_alive(Duration::from_millis(config.keep_alive_ms))
            .build()?;

        debug!(
            max_blocking_threads = config.max_blocking_threads,
            thread_name = %config.thread_name,
            "Started change dispatcher runtime"
        );

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Mutex::new(Some(runtime)),
            diagnostics: Arc::new(NoopDiagnostics),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Create a dispatcher that schedules onto an existing runtime.
    ///
    /// The runtime's lifecycle stays with its owner; `shutdown` only stops
    /// this dispatcher from accepting new events.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            runtime: Mutex::new(None),
            diagnostics: Arc::new(NoopDiagnostics),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Report listener outcomes to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DispatchDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Schedule delivery of `event` to every listener in `listeners`.
    ///
    /// Returns the number of scheduled invocations without waiting for any of
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DispatcherShutdown`] after [`shutdown`](Self::shutdown).
    pub fn dispatch(&self, event: Arc<ChangeEvent>, listeners: &[SharedListener]) -> Result<usize> {
        if self.is_shutdown() {
            return Err(ConfigError::DispatcherShutdown);
        }

        self.diagnostics.event_dispatched(&event, listeners.len());
        debug!(
            namespace = event.namespace(),
            changes = event.len(),
            listeners = listeners.len(),
            "Dispatching config change event"
        );

        for listener in listeners {
            let listener = Arc::clone(listener);
            let event = Arc::clone(&event);
            let diagnostics = Arc::clone(&self.diagnostics);
            // Fire and forget; the outcome is reported from inside the task.
            drop(
                self.handle
                    .spawn_blocking(move || invoke_listener(&*listener, &event, &*diagnostics)),
            );
        }

        Ok(listeners.len())
    }

    /// Stop accepting events and tear down the owned worker pool.
    ///
    /// Waits up to `timeout` for running listeners when called from outside
    /// an async context. Inside one, the pool is released in the background
    /// without waiting. Idempotent.
    pub fn shutdown(&self, timeout: Duration) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }

        let Some(runtime) = self.runtime.lock().take() else {
            return;
        };

        if Handle::try_current().is_ok() {
            runtime.shutdown_background();
        } else {
            runtime.shutdown_timeout(timeout);
        }
        debug!("Change dispatcher shut down");
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutdown(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl Drop for ChangeDispatcher {
    fn drop(&mut self) {
        // Dropping a Runtime inside an async context panics.
        if let Some(runtime) = self.runtime.get_mut().take() {
            runtime.shutdown_background();
        }
    }
}

fn invoke_listener(
    listener: &dyn ConfigChangeListener,
    event: &ChangeEvent,
    diagnostics: &dyn DispatchDiagnostics,
) {
    let name = listener.name();
    diagnostics.listener_started(name, event);
    let start = Instant::now();

    let outcome = match catch_unwind(AssertUnwindSafe(|| listener.on_change(event))) {
        Ok(result) => result,
        Err(payload) => Err(ListenerError::Panicked(panic_message(payload.as_ref()))),
    };
    let elapsed = start.elapsed();

    match outcome {
        Ok(()) => {
            debug!(
                listener = name,
                namespace = event.namespace(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Config change listener completed"
            );
            diagnostics.listener_succeeded(name, elapsed);
        }
        Err(err) => {
            error!(
                listener = name,
                namespace = event.namespace(),
                error = %err,
                "Failed to invoke config change listener"
            );
            diagnostics.listener_failed(name, &err, elapsed);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConfigChange;
    use crate::notify::FnListener;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    fn event() -> Arc<ChangeEvent> {
        Arc::new(ChangeEvent::new("app", vec![ConfigChange::added("app", "k", "v")]).unwrap())
    }

    fn wait_until(condition: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not met in time");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[derive(Default)]
    struct RecordingDiagnostics {
        succeeded: AtomicUsize,
        failures: Mutex<Vec<(String, ListenerError)>>,
    }

    impl DispatchDiagnostics for RecordingDiagnostics {
        fn listener_succeeded(&self, _listener: &str, _elapsed: Duration) {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        }

        fn listener_failed(&self, listener: &str, error: &ListenerError, _elapsed: Duration) {
            self.failures
                .lock()
                .push((listener.to_string(), error.clone()));
        }
    }

    #[test]
    fn test_config_defaults_are_valid() {
        assert!(DispatcherConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: DispatcherConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "max_blocking_threads: 8\nthread_name: props-listener\n",
                config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.max_blocking_threads, 8);
        assert_eq!(config.thread_name, "props-listener");
        assert_eq!(config.worker_threads, 1);
        assert_eq!(config.keep_alive_ms, 60_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = DispatcherConfig {
            worker_threads: 0,
            max_blocking_threads: 0,
            ..DispatcherConfig::default()
        };
        assert!(matches!(
            ChangeDispatcher::new(config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_dispatch_invokes_every_listener() {
        let dispatcher = ChangeDispatcher::new(DispatcherConfig::default()).unwrap();
        let (tx, rx) = mpsc::channel();

        let listeners: Vec<SharedListener> = (0..3)
            .map(|i| {
                let tx = tx.clone();
                Arc::new(FnListener::new(format!("l{}", i), move |event: &ChangeEvent| {
                    tx.send((i, event.len())).unwrap();
                    Ok(())
                })) as SharedListener
            })
            .collect();

        assert_eq!(dispatcher.dispatch(event(), &listeners).unwrap(), 3);

        let mut seen: Vec<_> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        seen.sort();
        assert_eq!(seen, vec![(0, 1), (1, 1), (2, 1)]);

        dispatcher.shutdown(Duration::from_secs(1));
    }

    #[test]
    fn test_dispatch_does_not_wait_for_listeners() {
        let dispatcher = ChangeDispatcher::new(DispatcherConfig::default()).unwrap();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let (done_tx, done_rx) = mpsc::channel();

        let slow: SharedListener = Arc::new(FnListener::new("slow", move |_: &ChangeEvent| {
            release_rx.lock().recv().unwrap();
            done_tx.send(()).unwrap();
            Ok(())
        }));

        // Returns while the listener is still blocked.
        dispatcher.dispatch(event(), &[slow]).unwrap();
        assert!(done_rx.try_recv().is_err());

        release_tx.send(()).unwrap();
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        dispatcher.shutdown(Duration::from_secs(1));
    }

    #[test]
    fn test_failures_are_isolated_and_reported() {
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let dispatcher = ChangeDispatcher::new(DispatcherConfig::default())
            .unwrap()
            .with_diagnostics(diagnostics.clone());
        let (tx, rx) = mpsc::channel();

        let failing: SharedListener =
            Arc::new(FnListener::new("failing", |_: &ChangeEvent| Err("boom".into())));
        let panicking: SharedListener = Arc::new(FnListener::new("panicking", |_: &ChangeEvent| {
            panic!("listener exploded")
        }));
        let healthy: SharedListener = Arc::new(FnListener::new("healthy", move |_: &ChangeEvent| {
            tx.send(()).unwrap();
            Ok(())
        }));

        dispatcher
            .dispatch(event(), &[failing, panicking, healthy])
            .unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();

        wait_until(|| {
            diagnostics.failures.lock().len() == 2
                && diagnostics.succeeded.load(Ordering::SeqCst) == 1
        });
        let mut failures = diagnostics.failures.lock().clone();
        failures.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            failures,
            vec![
                ("failing".to_string(), ListenerError::Failed("boom".to_string())),
                (
                    "panicking".to_string(),
                    ListenerError::Panicked("listener exploded".to_string())
                ),
            ]
        );
        assert_eq!(diagnostics.succeeded.load(Ordering::SeqCst), 1);
        dispatcher.shutdown(Duration::from_secs(1));
    }

    #[test]
    fn test_dispatch_after_shutdown_fails() {
        let dispatcher = ChangeDispatcher::new(DispatcherConfig::default()).unwrap();
        dispatcher.shutdown(Duration::from_secs(1));
        dispatcher.shutdown(Duration::from_secs(1));

        assert!(dispatcher.is_shutdown());
        assert!(matches!(
            dispatcher.dispatch(event(), &[]),
            Err(ConfigError::DispatcherShutdown)
        ));
    }

    #[tokio::test]
    async fn test_with_handle_uses_existing_runtime() {
        let dispatcher = ChangeDispatcher::with_handle(Handle::current());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let listener: SharedListener = Arc::new(FnListener::new("async", move |_: &ChangeEvent| {
            tx.send(()).unwrap();
            Ok(())
        }));

        dispatcher.dispatch(event(), &[listener]).unwrap();
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_owned_runtime_can_be_dropped_in_async_context() {
        let dispatcher = ChangeDispatcher::new(DispatcherConfig::default()).unwrap();
        drop(dispatcher);
    }
}
