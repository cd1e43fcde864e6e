//! In-memory property source.

use super::PropertySource;
use crate::error::Result;
use crate::model::PropertySnapshot;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Properties held in memory.
///
/// The contents can be replaced at runtime with [`set`](Self::set), which
/// makes this source handy for programmatic overrides and tests. Clones share
/// the same contents.
///
/// # Examples
///
/// ```rust
/// use hotswap_properties::sources::{MemorySource, PropertySource};
///
/// let source = MemorySource::new("overrides", [("timeout", "30")]);
/// source.set([("timeout", "60")]);
/// assert_eq!(source.load().unwrap().get("timeout"), Some("60"));
/// ```
#[derive(Clone)]
pub struct MemorySource {
    name: String,
    properties: Arc<ArcSwap<PropertySnapshot>>,
    priority: i32,
}

impl MemorySource {
    /// Create a source holding `properties`.
    pub fn new<I, K, V>(name: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            properties: Arc::new(ArcSwap::from_pointee(properties.into_iter().collect())),
            priority: 200,
        }
    }

    /// Set the priority for this source.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Replace all properties.
    pub fn set<I, K, V>(&self, properties: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.properties
            .store(Arc::new(properties.into_iter().collect()));
    }
}

impl PropertySource for MemorySource {
    fn load(&self) -> Result<PropertySnapshot> {
        Ok(self.properties.load().as_ref().clone())
    }

    fn name(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
