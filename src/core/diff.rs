//! Snapshot diffing.

use crate::model::{ConfigChange, PropertySnapshot};

/// Compute the changes that turn `previous` into `current`.
///
/// A missing snapshot is treated as empty. The result holds exactly one record
/// per key whose presence or value changed: added keys first, then deleted
/// keys, then modified keys, each group in natural key order. Values are
/// compared as exact strings.
///
/// # Examples
///
/// ```rust
/// use hotswap_properties::core::calc_property_changes;
/// use hotswap_properties::model::{PropertyChangeType, PropertySnapshot};
///
/// let previous: PropertySnapshot = [("host", "localhost"), ("port", "8080")].into_iter().collect();
/// let current: PropertySnapshot = [("port", "9090"), ("debug", "true")].into_iter().collect();
///
/// let changes = calc_property_changes("application", Some(&previous), Some(&current));
/// let kinds: Vec<_> = changes.iter().map(|c| (c.key(), c.change_type())).collect();
///
/// assert_eq!(
///     kinds,
///     vec![
///         ("debug", PropertyChangeType::Added),
///         ("host", PropertyChangeType::Deleted),
///         ("port", PropertyChangeType::Modified),
///     ]
/// );
/// ```
pub fn calc_property_changes(
    namespace: &str,
    previous: Option<&PropertySnapshot>,
    current: Option<&PropertySnapshot>,
) -> Vec<ConfigChange> {
    let empty = PropertySnapshot::new();
    let previous = previous.unwrap_or(&empty);
    let current = current.unwrap_or(&empty);

    let mut changes = Vec::new();

    for (key, value) in current.iter() {
        if !previous.contains_key(key) {
            changes.push(ConfigChange::added(namespace, key, value));
        }
    }

    for (key, value) in previous.iter() {
        if !current.contains_key(key) {
            changes.push(ConfigChange::deleted(namespace, key, value));
        }
    }

    for (key, old_value) in previous.iter() {
        if let Some(new_value) = current.get(key) {
            changes.extend(ConfigChange::modified(namespace, key, old_value, new_value));
        }
    }

    changes
}
