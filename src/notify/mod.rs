//! Change listeners and their delivery.
//!
//! Listeners register in a [`ListenerRegistry`]; a [`ChangeDispatcher`] fans
//! each [`ChangeEvent`](crate::model::ChangeEvent) out to them on a worker
//! pool. With the `file-watch` feature, a [`PropertyFileWatcher`] can drive
//! reloads from file changes.

mod diagnostics;
mod dispatcher;
mod listener;
mod registry;

#[cfg(feature = "file-watch")]
mod watcher;

pub use diagnostics::{DispatchDiagnostics, NoopDiagnostics};
pub use dispatcher::{ChangeDispatcher, DispatcherConfig};
pub use listener::{ConfigChangeListener, FnListener};
pub use registry::{ListenerRegistry, SharedListener};

#[cfg(feature = "file-watch")]
pub use watcher::{PropertyFileWatcher, spawn_reloader};
