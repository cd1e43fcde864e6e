//! Error types for hotswap-properties.

use std::fmt;

/// Result type alias for hotswap-properties operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when working with a namespace configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to load properties from a source.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// File watching is not supported or failed to initialize.
    #[error("File watching error: {0}")]
    WatchError(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse a configuration file.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A stored property value could not be converted to the requested type.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The change dispatcher was shut down and no longer accepts work.
    #[error("Change dispatcher has been shut down")]
    DispatcherShutdown,

    /// Generic error for other cases.
    #[error("Configuration error: {0}")]
    Other(String),
}

/// A present property value that is not a valid textual form of the requested type.
///
/// Typed getters return this instead of falling back to the default: a
/// malformed value is a configuration bug and must surface to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Property '{key}' has value {value:?} which is not a valid {target}: {reason}")]
pub struct FormatError {
    /// The property key that was looked up
    pub key: String,
    /// The raw stored value
    pub value: String,
    /// Name of the requested type
    pub target: &'static str,
    /// The parser's description of the failure
    pub reason: String,
}

impl FormatError {
    /// Create a format error for `key` holding `value`.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        target: &'static str,
        reason: impl fmt::Display,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            target,
            reason: reason.to_string(),
        }
    }
}

/// A fault raised by a change listener while handling an event.
///
/// Listener faults are caught at the dispatch boundary, logged and reported to
/// the diagnostics hook. They never reach the code that produced the event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListenerError {
    /// The listener returned an error.
    #[error("{0}")]
    Failed(String),

    /// The listener panicked.
    #[error("listener panicked: {0}")]
    Panicked(String),
}

impl ListenerError {
    /// Create a failure from any displayable error.
    pub fn failed(err: impl fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}

impl From<String> for ListenerError {
    fn from(msg: String) -> Self {
        Self::Failed(msg)
    }
}

impl From<&str> for ListenerError {
    fn from(msg: &str) -> Self {
        Self::Failed(msg.to_string())
    }
}

/// Validation error for configuration validation.
#[derive(Debug)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific field has an invalid value.
    InvalidField {
        /// The field name/path
        field: String,
        /// The reason why it's invalid
        reason: String,
    },

    /// Multiple validation errors occurred.
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidField { field, reason } => {
                write!(f, "Field '{}' is invalid: {}", field, reason)
            }
            Self::Multiple(errors) => {
                writeln!(f, "Multiple validation errors:")?;
                for (i, err) in errors.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::ValidationError(err.to_string())
    }
}
