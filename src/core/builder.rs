//! Builder for constructing NamespaceConfig instances.

use crate::core::{NamespaceConfig, PropertyLoader, SnapshotValidator};
use crate::error::{ConfigError, Result, ValidationError};
use crate::model::PropertySnapshot;
use crate::notify::{ChangeDispatcher, DispatchDiagnostics, DispatcherConfig};
use crate::sources::{EnvSource, FileSource, MemorySource, PropertySource};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

#[cfg(feature = "file-watch")]
use std::time::Duration;

// Files occupy 100..200, below memory sources (200) and the environment (300).
const FILE_PRIORITY_BASE: i32 = 100;
const MAX_FILES: usize = 100;

/// Builder for constructing a [`NamespaceConfig`].
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_properties::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let config = NamespaceConfig::builder("application")
///     .with_file("config/application.yaml")
///     .with_file("config/production.yaml")
///     .with_env_overrides("APP", "__")
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct NamespaceConfigBuilder {
    namespace: String,
    file_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
    env_separator: Option<String>,
    custom_sources: Vec<Box<dyn PropertySource>>,
    validator: Option<SnapshotValidator>,
    dispatcher: Option<Arc<ChangeDispatcher>>,
    dispatcher_config: DispatcherConfig,
    runtime_handle: Option<Handle>,
    diagnostics: Option<Arc<dyn DispatchDiagnostics>>,
    #[cfg(feature = "file-watch")]
    file_watch: bool,
    #[cfg(feature = "file-watch")]
    debounce: Duration,
}

impl NamespaceConfigBuilder {
    /// Create a new builder for `namespace` with default settings.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            file_paths: Vec::new(),
            env_prefix: None,
            env_separator: None,
            custom_sources: Vec::new(),
            validator: None,
            dispatcher: None,
            dispatcher_config: DispatcherConfig::default(),
            runtime_handle: None,
            diagnostics: None,
            #[cfg(feature = "file-watch")]
            file_watch: false,
            #[cfg(feature = "file-watch")]
            debounce: Duration::from_millis(500),
        }
    }

    /// Add a property file (YAML, TOML or JSON).
    ///
    /// Later files have higher priority and override earlier ones. Up to 100
    /// files are supported; all of them rank below in-memory properties and
    /// environment overrides.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_paths.push(path.into());
        self
    }

    /// Add environment variables with `prefix` as the highest priority source.
    ///
    /// `separator` marks nesting: with prefix `APP` and separator `__`,
    /// `APP_HTTP__TIMEOUT` becomes the property `http.timeout`.
    pub fn with_env_overrides(mut self, prefix: &str, separator: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.env_separator = Some(separator.to_string());
        self
    }

    /// Add a custom property source.
    pub fn with_source<S: PropertySource + 'static>(mut self, source: S) -> Self {
        self.custom_sources.push(Box::new(source));
        self
    }

    /// Add fixed in-memory properties.
    pub fn with_properties<I, K, V>(self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let name = format!("{}-properties", self.namespace);
        self.with_source(MemorySource::new(name, properties))
    }

    /// Reject snapshots that fail `validator`, on build and on every update.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use hotswap_properties::prelude::*;
    ///
    /// # async fn example() -> Result<()> {
    /// let config = NamespaceConfig::builder("application")
    ///     .with_file("config/application.yaml")
    ///     .with_validation(|snapshot: &PropertySnapshot| {
    ///         if !snapshot.contains_key("db.url") {
    ///             return Err(ValidationError::invalid_field("db.url", "is required"));
    ///         }
    ///         Ok(())
    ///     })
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_validation<F>(mut self, validator: F) -> Self
    where
        F: Fn(&PropertySnapshot) -> std::result::Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Deliver changes through a shared dispatcher.
    ///
    /// Takes precedence over the dispatcher settings, runtime handle and
    /// diagnostics configured on this builder.
    pub fn with_dispatcher(mut self, dispatcher: Arc<ChangeDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Settings for the dispatcher's own worker pool.
    pub fn with_dispatcher_config(mut self, config: DispatcherConfig) -> Self {
        self.dispatcher_config = config;
        self
    }

    /// Run listeners on an existing runtime instead of a dedicated pool.
    pub fn with_runtime_handle(mut self, handle: Handle) -> Self {
        self.runtime_handle = Some(handle);
        self
    }

    /// Report listener outcomes to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DispatchDiagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Report listener outcomes as OpenTelemetry metrics.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(self, meter: opentelemetry::metrics::Meter) -> Self {
        self.with_diagnostics(Arc::new(crate::metrics::ConfigMetrics::new(meter)))
    }

    /// Reload automatically when a property file changes.
    #[cfg(feature = "file-watch")]
    pub fn with_file_watch(mut self, enabled: bool) -> Self {
        self.file_watch = enabled;
        self
    }

    /// Debounce window for file watching (default 500ms).
    #[cfg(feature = "file-watch")]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Build the namespace handle.
    ///
    /// Performs the initial load from all sources and validates the result.
    /// With no sources the namespace starts empty and can only change through
    /// [`NamespaceConfig::update`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - More than 100 property files were added
    /// - The initial load fails
    /// - Validation fails
    /// - The dispatcher cannot be created
    /// - File watching is enabled but cannot be set up
    pub async fn build(self) -> Result<NamespaceConfig> {
        if self.file_paths.len() > MAX_FILES {
            return Err(ConfigError::LoadError(format!(
                "At most {} property files are supported, got {}",
                MAX_FILES,
                self.file_paths.len()
            )));
        }

        let mut loader = PropertyLoader::new();

        for (priority, path) in (FILE_PRIORITY_BASE..).zip(&self.file_paths) {
            loader.add_source(Box::new(FileSource::new(path).with_priority(priority)));
        }

        for source in self.custom_sources {
            loader.add_source(source);
        }

        if let (Some(prefix), Some(separator)) = (&self.env_prefix, &self.env_separator) {
            loader.add_source(Box::new(EnvSource::new(prefix, separator)));
        }

        let initial = if loader.is_empty() {
            PropertySnapshot::new()
        } else {
            loader.load()?
        };

        if let Some(validator) = &self.validator {
            validator(&initial).map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }

        let dispatcher = match self.dispatcher {
            Some(dispatcher) => {
                if self.diagnostics.is_some() {
                    warn!(
                        namespace = %self.namespace,
                        "Diagnostics are ignored when a shared dispatcher is supplied"
                    );
                }
                dispatcher
            }
            None => {
                let dispatcher = match self.runtime_handle {
                    Some(handle) => ChangeDispatcher::with_handle(handle),
                    None => ChangeDispatcher::new(self.dispatcher_config)?,
                };
                let dispatcher = match self.diagnostics {
                    Some(diagnostics) => dispatcher.with_diagnostics(diagnostics),
                    None => dispatcher,
                };
                Arc::new(dispatcher)
            }
        };

        debug!(
            namespace = %self.namespace,
            sources = ?loader.source_names(),
            properties = initial.len(),
            "Built namespace config"
        );

        let has_sources = !loader.is_empty();
        let mut config = NamespaceConfig::new(self.namespace, initial, dispatcher)
            .with_validator(self.validator);
        if has_sources {
            config = config.with_loader(loader);
        }

        #[cfg(feature = "file-watch")]
        if self.file_watch {
            config = attach_watcher(config, &self.file_paths, self.debounce)?;
        }

        Ok(config)
    }
}

#[cfg(feature = "file-watch")]
fn attach_watcher(
    config: NamespaceConfig,
    paths: &[PathBuf],
    debounce: Duration,
) -> Result<NamespaceConfig> {
    use crate::notify::{PropertyFileWatcher, spawn_reloader};

    if paths.is_empty() {
        return Err(ConfigError::WatchError(
            "File watching requires at least one property file".to_string(),
        ));
    }

    let (watcher, signals) = PropertyFileWatcher::new(debounce)?;
    for path in paths {
        watcher.watch(path)?;
    }

    // The reloader's handle must not own the watcher, or dropping the last
    // user handle would never stop watching.
    spawn_reloader(config.clone(), signals);
    Ok(config.with_watcher(Arc::new(watcher)))
}

impl NamespaceConfig {
    /// Create a new builder for the namespace `namespace`.
    pub fn builder(namespace: impl Into<String>) -> NamespaceConfigBuilder {
        NamespaceConfigBuilder::new(namespace)
    }
}
