//! The namespace handle: current snapshot, listeners and change delivery.

use crate::core::{PropertyAccessor, PropertyLoader, SnapshotValidator, calc_property_changes};
use crate::error::{ConfigError, Result};
use crate::model::{ChangeEvent, PropertySnapshot};
use crate::notify::{ChangeDispatcher, ListenerRegistry, SharedListener};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[cfg(feature = "file-watch")]
use crate::notify::PropertyFileWatcher;

/// The properties of one namespace, with change notification.
///
/// Reads are lock-free. Each [`update`](Self::update) or
/// [`reload`](Self::reload) atomically replaces the current snapshot, diffs
/// it against the snapshot it replaced and, if anything changed, hands a
/// [`ChangeEvent`] to the dispatcher for every registered listener. Because
/// the replacement is a single atomic swap, concurrent updates form one
/// chain and every change is reported exactly once.
///
/// Clones share the same snapshot, listeners and dispatcher.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_properties::prelude::*;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<()> {
/// let config = NamespaceConfig::builder("application")
///     .with_file("config/application.yaml")
///     .build()
///     .await?;
///
/// config.add_change_listener(Arc::new(FnListener::new("log", |event| {
///     for change in event.changes() {
///         println!("{}", change);
///     }
///     Ok(())
/// })));
///
/// let timeout = config.get_int_property("http.timeout", 30)?;
/// println!("timeout: {}", timeout);
/// # Ok(())
/// # }
/// ```
pub struct NamespaceConfig {
    namespace: Arc<str>,
    current: Arc<ArcSwap<PropertySnapshot>>,
    listeners: Arc<ListenerRegistry>,
    dispatcher: Arc<ChangeDispatcher>,
    loader: Option<Arc<PropertyLoader>>,
    validator: Option<SnapshotValidator>,
    #[cfg(feature = "file-watch")]
    watcher: Option<Arc<PropertyFileWatcher>>,
}

impl NamespaceConfig {
    /// Create a namespace handle holding `initial`, delivering changes through
    /// `dispatcher`.
    ///
    /// For loading from files or environment variables, prefer
    /// [`NamespaceConfig::builder`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hotswap_properties::prelude::*;
    /// use std::sync::Arc;
    ///
    /// # fn example() -> Result<()> {
    /// let dispatcher = Arc::new(ChangeDispatcher::new(DispatcherConfig::default())?);
    /// let snapshot: PropertySnapshot = [("timeout", "30")].into_iter().collect();
    /// let config = NamespaceConfig::new("application", snapshot, dispatcher);
    ///
    /// assert_eq!(config.get_int_property("timeout", 10)?, 30);
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn new(
        namespace: impl Into<String>,
        initial: PropertySnapshot,
        dispatcher: Arc<ChangeDispatcher>,
    ) -> Self {
        Self {
            namespace: Arc::from(namespace.into()),
            current: Arc::new(ArcSwap::from_pointee(initial)),
            listeners: Arc::new(ListenerRegistry::new()),
            dispatcher,
            loader: None,
            validator: None,
            #[cfg(feature = "file-watch")]
            watcher: None,
        }
    }

    pub(crate) fn with_loader(mut self, loader: PropertyLoader) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub(crate) fn with_validator(mut self, validator: Option<SnapshotValidator>) -> Self {
        self.validator = validator;
        self
    }

    #[cfg(feature = "file-watch")]
    pub(crate) fn with_watcher(mut self, watcher: Arc<PropertyFileWatcher>) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// The namespace name.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The current snapshot.
    ///
    /// Lock-free; the returned snapshot stays valid after later updates.
    pub fn snapshot(&self) -> Arc<PropertySnapshot> {
        self.current.load_full()
    }

    /// Register a listener for this namespace's changes.
    ///
    /// Registering the same instance again has no effect. Returns whether the
    /// listener was added.
    pub fn add_change_listener(&self, listener: SharedListener) -> bool {
        self.listeners.register(listener)
    }

    /// Unregister a listener instance.
    ///
    /// Returns whether it was registered. Events already scheduled for it are
    /// still delivered.
    pub fn remove_change_listener(&self, listener: &SharedListener) -> bool {
        self.listeners.remove(listener)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Replace the current snapshot and notify listeners of the difference.
    ///
    /// Returns the event handed to the listeners, or `None` if nothing
    /// changed. Listeners run asynchronously; this never waits for them.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is rejected by the validator (the old
    /// snapshot stays current), or if the dispatcher has been shut down (the
    /// new snapshot is current but listeners are not notified).
    pub fn update(&self, snapshot: PropertySnapshot) -> Result<Option<Arc<ChangeEvent>>> {
        if let Some(validator) = &self.validator {
            validator(&snapshot).map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }

        let next = Arc::new(snapshot);
        let previous = self.current.swap(Arc::clone(&next));

        let changes = calc_property_changes(&self.namespace, Some(&previous), Some(&next));
        let Some(event) = ChangeEvent::new(self.namespace.as_ref(), changes) else {
            debug!(namespace = %self.namespace, "Snapshot update without changes");
            return Ok(None);
        };

        let event = Arc::new(event);
        let listeners = self.listeners.snapshot();
        self.dispatcher.dispatch(Arc::clone(&event), &listeners)?;
        Ok(Some(event))
    }

    /// Reload from the configured sources and apply the result with
    /// [`update`](Self::update).
    ///
    /// # Errors
    ///
    /// Returns an error if the handle has no sources, a source fails, or the
    /// update fails. On a load failure the current snapshot is kept.
    pub fn reload(&self) -> Result<Option<Arc<ChangeEvent>>> {
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| ConfigError::Other("No loader available for reload".to_string()))?;

        let snapshot = loader.load()?;
        self.update(snapshot)
    }

    /// Whether a file watcher drives reloads of this namespace.
    #[cfg(feature = "file-watch")]
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Shut down the dispatcher. Later updates still swap the snapshot but
    /// fail to notify listeners.
    pub fn shutdown(&self, timeout: Duration) {
        self.dispatcher.shutdown(timeout);
    }
}

impl PropertyAccessor for NamespaceConfig {
    fn property(&self, key: &str) -> Option<String> {
        self.current.load().get(key).map(str::to_string)
    }
}

impl Clone for NamespaceConfig {
    fn clone(&self) -> Self {
        Self {
            namespace: Arc::clone(&self.namespace),
            current: Arc::clone(&self.current),
            listeners: Arc::clone(&self.listeners),
            dispatcher: Arc::clone(&self.dispatcher),
            loader: self.loader.clone(),
            validator: self.validator.clone(),
            #[cfg(feature = "file-watch")]
            watcher: self.watcher.clone(),
        }
    }
}
