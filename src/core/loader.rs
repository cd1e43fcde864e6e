//! Property loader that merges multiple sources.

use crate::error::{ConfigError, Result};
use crate::model::PropertySnapshot;
use crate::sources::PropertySource;
use std::collections::BTreeMap;
use tracing::debug;

/// Loads and merges properties from multiple sources.
///
/// Sources are applied from lowest to highest priority, so a key defined by
/// several sources takes the value of the highest priority one.
pub struct PropertyLoader {
    sources: Vec<Box<dyn PropertySource>>,
}

impl PropertyLoader {
    /// Create a new property loader.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Add a property source.
    pub fn add_source(&mut self, source: Box<dyn PropertySource>) {
        self.sources.push(source);
    }

    /// Whether no source has been added.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Load and merge properties from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no sources or any source fails to load.
    pub fn load(&self) -> Result<PropertySnapshot> {
        if self.sources.is_empty() {
            return Err(ConfigError::LoadError(
                "No property sources specified".to_string(),
            ));
        }

        let mut merged = BTreeMap::new();
        for source in self.sorted_sources() {
            let snapshot = source.load().map_err(|e| {
                ConfigError::LoadError(format!("Failed to load source '{}': {}", source.name(), e))
            })?;
            debug!(source = %source.name(), properties = snapshot.len(), "Loaded property source");
            merged.extend(BTreeMap::from(snapshot));
        }

        Ok(PropertySnapshot::from(merged))
    }

    /// Get the list of source names in priority order.
    pub fn source_names(&self) -> Vec<String> {
        self.sorted_sources().map(|s| s.name()).collect()
    }

    fn sorted_sources(&self) -> impl Iterator<Item = &dyn PropertySource> {
        let mut sorted: Vec<_> = self.sources.iter().map(|s| s.as_ref()).collect();
        sorted.sort_by_key(|s| s.priority());
        sorted.into_iter()
    }
}

impl Default for PropertyLoader {
    fn default() -> Self {
        Self::new()
    }
}
