//! Core configuration management types.

mod builder;
mod config_handle;
mod diff;
mod loader;
mod typed;
mod validation;

pub use builder::NamespaceConfigBuilder;
pub use config_handle::NamespaceConfig;
pub use diff::calc_property_changes;
pub use loader::PropertyLoader;
pub use typed::PropertyAccessor;
pub use validation::{SnapshotValidator, Validate};
