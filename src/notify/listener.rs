//! The callback interface for change listeners.

use crate::error::ListenerError;
use crate::model::ChangeEvent;

/// Observer of namespace changes.
///
/// Each registered listener receives every [`ChangeEvent`] of its namespace on
/// a worker thread. An `Err` (or a panic) is contained by the dispatcher and
/// does not affect other listeners.
///
/// # Examples
///
/// ```rust
/// use hotswap_properties::error::ListenerError;
/// use hotswap_properties::model::ChangeEvent;
/// use hotswap_properties::notify::ConfigChangeListener;
///
/// struct LogChanges;
///
/// impl ConfigChangeListener for LogChanges {
///     fn on_change(&self, event: &ChangeEvent) -> Result<(), ListenerError> {
///         for change in event.changes() {
///             println!("{}", change);
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait ConfigChangeListener: Send + Sync + 'static {
    /// Handle a change event.
    fn on_change(&self, event: &ChangeEvent) -> Result<(), ListenerError>;

    /// Identifying name used in logs and diagnostics.
    ///
    /// Defaults to the implementing type's name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A listener backed by a closure.
///
/// # Examples
///
/// ```rust
/// use hotswap_properties::notify::FnListener;
///
/// let listener = FnListener::new("audit", |event| {
///     println!("{} keys changed", event.len());
///     Ok(())
/// });
/// ```
pub struct FnListener<F> {
    name: String,
    callback: F,
}

impl<F> FnListener<F>
where
    F: Fn(&ChangeEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    /// Wrap `callback` under the given name.
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl<F> ConfigChangeListener for FnListener<F>
where
    F: Fn(&ChangeEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    fn on_change(&self, event: &ChangeEvent) -> Result<(), ListenerError> {
        (self.callback)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
