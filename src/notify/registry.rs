//! Registry of change listeners.

use super::ConfigChangeListener;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// A shared, registered listener.
pub type SharedListener = Arc<dyn ConfigChangeListener>;

/// Concurrency-safe, insertion-ordered set of listeners.
///
/// Listeners are compared by identity: registering the same `Arc` twice has
/// no effect. The list is copy-on-write, so a [`snapshot`](Self::snapshot)
/// can be iterated while other threads register or remove listeners. A
/// listener registered after a snapshot was taken is not part of it, but is
/// part of every later one.
///
/// # Examples
///
/// ```rust
/// use hotswap_properties::notify::{FnListener, ListenerRegistry, SharedListener};
/// use std::sync::Arc;
///
/// let registry = ListenerRegistry::new();
/// let listener: SharedListener = Arc::new(FnListener::new("audit", |_| Ok(())));
///
/// assert!(registry.register(Arc::clone(&listener)));
/// assert!(!registry.register(listener));
/// assert_eq!(registry.len(), 1);
/// ```
pub struct ListenerRegistry {
    listeners: ArcSwap<Vec<SharedListener>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            listeners: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Register a listener unless this instance is already present.
    ///
    /// Returns `true` if the listener was added.
    pub fn register(&self, listener: SharedListener) -> bool {
        let mut added = false;
        self.listeners.rcu(|current| {
            if current.iter().any(|l| same_listener(l, &listener)) {
                added = false;
                return Arc::clone(current);
            }
            added = true;
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&listener));
            Arc::new(next)
        });
        added
    }

    /// Remove a previously registered listener instance.
    ///
    /// Returns `true` if it was present. Dispatches that already took a
    /// snapshot may still invoke it once.
    pub fn remove(&self, listener: &SharedListener) -> bool {
        let mut removed = false;
        self.listeners.rcu(|current| {
            removed = current.iter().any(|l| same_listener(l, listener));
            if !removed {
                return Arc::clone(current);
            }
            Arc::new(
                current
                    .iter()
                    .filter(|l| !same_listener(l, listener))
                    .cloned()
                    .collect::<Vec<_>>(),
            )
        });
        removed
    }

    /// The listeners registered right now, in registration order.
    pub fn snapshot(&self) -> Arc<Vec<SharedListener>> {
        self.listeners.load_full()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.load().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.load().is_empty()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity comparison on the data pointer; vtable pointers are not stable.
fn same_listener(a: &SharedListener, b: &SharedListener) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListenerError;
    use crate::model::ChangeEvent;
    use std::thread;

    struct Noop;

    impl ConfigChangeListener for Noop {
        fn on_change(&self, _event: &ChangeEvent) -> Result<(), ListenerError> {
            Ok(())
        }
    }

    fn noop() -> SharedListener {
        Arc::new(Noop)
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = ListenerRegistry::new();
        let listener = noop();

        assert!(registry.register(Arc::clone(&listener)));
        assert!(!registry.register(Arc::clone(&listener)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_instances_are_distinct() {
        let registry = ListenerRegistry::new();
        assert!(registry.register(noop()));
        assert!(registry.register(noop()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let registry = ListenerRegistry::new();
        let first = noop();
        let second = noop();
        registry.register(Arc::clone(&first));
        registry.register(Arc::clone(&second));

        let snapshot = registry.snapshot();
        assert!(same_listener(&snapshot[0], &first));
        assert!(same_listener(&snapshot[1], &second));
    }

    #[test]
    fn test_remove() {
        let registry = ListenerRegistry::new();
        let listener = noop();
        registry.register(Arc::clone(&listener));

        assert!(registry.remove(&listener));
        assert!(!registry.remove(&listener));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_stable_during_registration() {
        let registry = ListenerRegistry::new();
        registry.register(noop());

        let snapshot = registry.snapshot();
        registry.register(noop());

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_concurrent_registration_has_no_duplicates() {
        let registry = Arc::new(ListenerRegistry::new());
        let shared: Vec<SharedListener> = (0..8).map(|_| noop()).collect();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let shared = shared.clone();
                thread::spawn(move || {
                    for listener in shared {
                        registry.register(listener);
                        let _ = registry.snapshot().len();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 8);
    }
}
