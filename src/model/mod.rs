//! Snapshots, change records and change events.

mod change;
mod snapshot;

pub use change::{ChangeEvent, ConfigChange, PropertyChangeType};
pub use snapshot::PropertySnapshot;
