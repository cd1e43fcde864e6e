//! File watching for automatic property reloads.

use crate::core::NamespaceConfig;
use crate::error::{ConfigError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Watches property files and emits debounced reload signals.
///
/// A burst of file events within the debounce window collapses into a single
/// signal on the returned receiver.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_properties::notify::PropertyFileWatcher;
/// use std::time::Duration;
///
/// # async fn example() -> hotswap_properties::error::Result<()> {
/// let (watcher, mut rx) = PropertyFileWatcher::new(Duration::from_millis(500))?;
/// watcher.watch("config/application.yaml")?;
///
/// while let Some(()) = rx.recv().await {
///     println!("Property file changed, reload triggered!");
/// }
/// # Ok(())
/// # }
/// ```
pub struct PropertyFileWatcher {
    watcher: Mutex<RecommendedWatcher>,
    debounce_duration: Duration,
    watched_paths: Mutex<Vec<PathBuf>>,
}

impl PropertyFileWatcher {
    /// Create a watcher and the receiver its reload signals arrive on.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform file watcher cannot be created.
    pub fn new(debounce_duration: Duration) -> Result<(Self, mpsc::Receiver<()>)> {
        let (signal_tx, signal_rx) = mpsc::channel(1);
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) => {
                let _ = event_tx.send(event);
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "File watcher reported an error"),
        })
        .map_err(|e| ConfigError::WatchError(format!("Failed to create file watcher: {}", e)))?;

        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                debug!(paths = ?event.paths, "Property file event");

                // Let the burst settle, then fold everything queued into one signal.
                tokio::time::sleep(debounce_duration).await;
                while event_rx.try_recv().is_ok() {}

                match signal_tx.try_send(()) {
                    Ok(()) | Err(mpsc::error::TrySendError::Full(())) => {}
                    Err(mpsc::error::TrySendError::Closed(())) => break,
                }
            }
        });

        Ok((
            Self {
                watcher: Mutex::new(watcher),
                debounce_duration,
                watched_paths: Mutex::new(Vec::new()),
            },
            signal_rx,
        ))
    }

    /// Start watching `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or cannot be watched.
    pub fn watch(&self, path: impl AsRef<Path>) -> Result<()> {
        let canonical_path = path
            .as_ref()
            .canonicalize()
            .map_err(|e| ConfigError::WatchError(format!("Failed to resolve path: {}", e)))?;

        self.watcher
            .lock()
            .watch(&canonical_path, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchError(format!("Failed to watch path: {}", e)))?;

        let mut paths = self.watched_paths.lock();
        if !paths.contains(&canonical_path) {
            paths.push(canonical_path);
        }

        Ok(())
    }

    /// Stop watching `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved or was not watched.
    pub fn unwatch(&self, path: impl AsRef<Path>) -> Result<()> {
        let canonical_path = path.as_ref().canonicalize().map_err(|e| {
            ConfigError::WatchError(format!("Failed to resolve path for unwatching: {}", e))
        })?;

        self.watcher
            .lock()
            .unwatch(&canonical_path)
            .map_err(|e| ConfigError::WatchError(format!("Failed to unwatch path: {}", e)))?;

        self.watched_paths.lock().retain(|p| p != &canonical_path);
        Ok(())
    }

    /// The debounce window.
    pub fn debounce_duration(&self) -> Duration {
        self.debounce_duration
    }

    /// Currently watched paths.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.watched_paths.lock().clone()
    }
}

/// Reload `config` every time a signal arrives on `signals`.
///
/// Failed reloads are logged and the previous snapshot stays current. The
/// task ends when the signal channel closes.
pub fn spawn_reloader(config: NamespaceConfig, mut signals: mpsc::Receiver<()>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while signals.recv().await.is_some() {
            match config.reload() {
                Ok(Some(event)) => debug!(
                    namespace = config.namespace(),
                    changes = event.len(),
                    "Reloaded properties after file change"
                ),
                Ok(None) => debug!(
                    namespace = config.namespace(),
                    "File changed but properties are unchanged"
                ),
                Err(e) => warn!(
                    namespace = config.namespace(),
                    error = %e,
                    "Failed to reload properties after file change"
                ),
            }
        }
    })
}
