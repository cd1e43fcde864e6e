//! Environment variable property source.

use super::PropertySource;
use super::property_source::flatten_values;
use crate::error::{ConfigError, Result};
use crate::model::PropertySnapshot;
use config::Environment;
use std::collections::HashMap;

/// Loads properties from environment variables with a common prefix.
///
/// The prefix is stripped, names are lowercased and `separator` marks
/// nesting, so `APP_SERVER__PORT=8080` with prefix `APP` and separator `__`
/// becomes the property `server.port = "8080"`. Values are kept verbatim.
///
/// # Examples
///
/// ```rust
/// use hotswap_properties::sources::EnvSource;
///
/// let source = EnvSource::new("APP", "__");
/// ```
pub struct EnvSource {
    prefix: String,
    separator: String,
    priority: i32,
}

impl EnvSource {
    /// Create a new environment variable source.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix for environment variables (e.g., "APP")
    /// * `separator` - Separator for nested keys (e.g., "__" for APP_DB__HOST)
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
            priority: 300,
        }
    }

    /// Set the priority for this source.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for EnvSource {
    fn load(&self) -> Result<PropertySnapshot> {
        let env_source = Environment::with_prefix(&self.prefix)
            .prefix_separator("_")
            .separator(&self.separator)
            .try_parsing(false);

        let values = config::Config::builder()
            .add_source(env_source)
            .build()
            .map_err(|e| {
                ConfigError::LoadError(format!("Failed to load environment variables: {}", e))
            })?
            .try_deserialize::<HashMap<String, config::Value>>()
            .map_err(|e| {
                ConfigError::ParseError(format!("Failed to read environment variables: {}", e))
            })?;

        Ok(flatten_values(values))
    }

    fn name(&self) -> String {
        format!("env:{}*", self.prefix)
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
