//! Validation support for settings and snapshots.

use crate::error::ValidationError;
use crate::model::PropertySnapshot;
use std::sync::Arc;

/// Trait for validating settings before they are used.
///
/// # Examples
///
/// ```rust
/// use hotswap_properties::core::Validate;
/// use hotswap_properties::notify::DispatcherConfig;
///
/// let config = DispatcherConfig {
///     max_blocking_threads: 0,
///     ..DispatcherConfig::default()
/// };
/// assert!(config.validate().is_err());
/// ```
pub trait Validate {
    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Should return a `ValidationError` describing what validation failed.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A check a new snapshot must pass before it replaces the current one.
pub type SnapshotValidator =
    Arc<dyn Fn(&PropertySnapshot) -> Result<(), ValidationError> + Send + Sync>;
