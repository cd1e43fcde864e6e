//! File-based property source.

use super::PropertySource;
use super::property_source::flatten_values;
use crate::error::{ConfigError, Result};
use crate::model::PropertySnapshot;
use config::File;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Loads properties from a YAML, TOML or JSON file.
///
/// Nested keys are flattened to dotted property names, so
///
/// ```yaml
/// server:
///   port: 8080
/// ```
///
/// becomes the property `server.port = "8080"`.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_properties::sources::FileSource;
///
/// let source = FileSource::new("config/application.yaml");
/// ```
pub struct FileSource {
    path: PathBuf,
    priority: i32,
}

impl FileSource {
    /// Create a new file source with format detection from the extension
    /// (`.yaml`, `.yml`, `.toml`, `.json`).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            priority: 100,
        }
    }

    /// Set the priority for this source.
    ///
    /// Higher priority sources override lower priority ones.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn validate_extension(&self) -> Result<()> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!(
                    "Unable to determine file format for: {}",
                    self.path.display()
                ))
            })?;

        match extension {
            "yaml" | "yml" | "toml" | "json" => Ok(()),
            _ => Err(ConfigError::LoadError(format!(
                "Unsupported file extension: {}. Supported: .yaml, .yml, .toml, .json",
                extension
            ))),
        }
    }
}

impl PropertySource for FileSource {
    fn load(&self) -> Result<PropertySnapshot> {
        self.validate_extension()?;

        if !self.path.exists() {
            return Err(ConfigError::LoadError(format!(
                "Configuration file not found: {}",
                self.path.display()
            )));
        }

        let values = config::Config::builder()
            .add_source(File::from(self.path.clone()).required(true))
            .build()
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", self.path.display(), e)))?
            .try_deserialize::<HashMap<String, config::Value>>()
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", self.path.display(), e)))?;

        Ok(flatten_values(values))
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_extension() {
        for name in ["a.yaml", "a.yml", "a.toml", "a.json"] {
            assert!(FileSource::new(name).validate_extension().is_ok(), "{}", name);
        }
        assert!(FileSource::new("a.properties").validate_extension().is_err());
        assert!(FileSource::new("noext").validate_extension().is_err());
    }

    #[test]
    fn test_load_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("application.yaml");
        fs::write(
            &path,
            r#"
server:
  port: 8080
  hosts:
    - a
    - b
feature: true
"#,
        )
        .unwrap();

        let snapshot = FileSource::new(&path).load().unwrap();
        assert_eq!(snapshot.get("server.port"), Some("8080"));
        assert_eq!(snapshot.get("server.hosts"), Some("a,b"));
        assert_eq!(snapshot.get("feature"), Some("true"));
    }

    #[test]
    fn test_load_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("application.toml");
        fs::write(&path, "timeout = 30\n[db]\nurl = \"postgres://localhost\"\n").unwrap();

        let snapshot = FileSource::new(&path).load().unwrap();
        assert_eq!(snapshot.get("timeout"), Some("30"));
        assert_eq!(snapshot.get("db.url"), Some("postgres://localhost"));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = FileSource::new("/nonexistent/application.yaml").load();
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_load_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("application.json");
        fs::write(&path, "{ not json").unwrap();

        let result = FileSource::new(&path).load();
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_with_priority_and_name() {
        let source = FileSource::new("application.yaml").with_priority(200);
        assert_eq!(source.priority(), 200);
        assert!(source.name().contains("application.yaml"));
    }
}
