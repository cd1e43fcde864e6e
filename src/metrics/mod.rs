//! Built-in metrics for change delivery.
//!
//! Provides an OpenTelemetry-backed [`DispatchDiagnostics`](crate::notify::DispatchDiagnostics)
//! hook tracking:
//! - Dispatched events and changed keys
//! - Listener invocations and failures
//! - Listener duration
//! - Listener fan-out
//!
//! # Examples
//!
//! ```rust,no_run
//! use hotswap_properties::prelude::*;
//! use opentelemetry::global;
//!
//! # async fn example() -> Result<()> {
//! let config = NamespaceConfig::builder("application")
//!     .with_file("config/application.yaml")
//!     .with_metrics(global::meter("my-app"))
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod config_metrics;

pub use config_metrics::ConfigMetrics;
