//! # hotswap-properties
//!
//! Change detection and fault-isolated change notification for namespaced
//! key-value configuration.
//!
//! ## Overview
//!
//! `hotswap-properties` is the notification core of a dynamic configuration
//! client:
//! - Precise snapshot diffs classifying every key as added, modified or deleted
//! - A copy-on-write listener registry that is safe to grow during delivery
//! - Asynchronous delivery where a failing or panicking listener never affects
//!   the others or the code that produced the update
//! - Typed property getters with defaults that surface malformed values
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hotswap_properties::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> hotswap_properties::error::Result<()> {
//! let config = NamespaceConfig::builder("application")
//!     .with_file("config/application.yaml")
//!     .with_env_overrides("APP", "__")
//!     .build()
//!     .await?;
//!
//! config.add_change_listener(Arc::new(FnListener::new("pool-resizer", |event| {
//!     if let Some(change) = event.change("db.pool.size") {
//!         println!("pool size: {:?} -> {:?}", change.old_value(), change.new_value());
//!     }
//!     Ok(())
//! })));
//!
//! let pool_size = config.get_int_property("db.pool.size", 10)?;
//! println!("Pool size: {}", pool_size);
//!
//! // Push a new snapshot; listeners are notified of what changed.
//! let next: PropertySnapshot = config
//!     .snapshot()
//!     .iter()
//!     .map(|(k, v)| (k.to_string(), v.to_string()))
//!     .chain([("db.pool.size".to_string(), "20".to_string())])
//!     .collect();
//! config.update(next)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Diffing**: [`core::calc_property_changes`] is pure and callable directly
//! - **Fault isolation**: listener errors and panics are logged and reported
//!   to a [`notify::DispatchDiagnostics`] hook, never propagated
//! - **Explicit worker pool**: each [`notify::ChangeDispatcher`] owns (or
//!   borrows) its runtime and has an explicit shutdown
//! - **File watching**: automatic reload on file changes
//! - **Metrics**: OpenTelemetry diagnostics hook
//!
//! ## Feature Flags
//!
//! - `file-watch` (default): reload namespaces when property files change
//! - `metrics`: OpenTelemetry metrics for change delivery

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod model;
pub mod notify;
pub mod sources;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        NamespaceConfig, NamespaceConfigBuilder, PropertyAccessor, Validate,
        calc_property_changes,
    };
    pub use crate::error::{ConfigError, FormatError, ListenerError, Result, ValidationError};
    pub use crate::model::{ChangeEvent, ConfigChange, PropertyChangeType, PropertySnapshot};
    pub use crate::notify::{
        ChangeDispatcher, ConfigChangeListener, DispatcherConfig, FnListener, SharedListener,
    };
}
