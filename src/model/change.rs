//! Change records and the events that carry them to listeners.

use std::collections::BTreeMap;
use std::fmt;

/// How a single property changed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyChangeType {
    /// Absent before, present now.
    Added,
    /// Present in both with different values.
    Modified,
    /// Present before, absent now.
    Deleted,
}

impl fmt::Display for PropertyChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Added => "ADDED",
            Self::Modified => "MODIFIED",
            Self::Deleted => "DELETED",
        };
        f.write_str(name)
    }
}

/// One key's transition between two snapshots.
///
/// `old_value` is `None` exactly for additions and `new_value` is `None`
/// exactly for deletions. The constructors are the only way to build a
/// record, so a `ConfigChange` always satisfies this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    namespace: String,
    key: String,
    old_value: Option<String>,
    new_value: Option<String>,
    change_type: PropertyChangeType,
}

impl ConfigChange {
    /// A key that appeared with `new_value`.
    pub fn added(
        namespace: impl Into<String>,
        key: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            old_value: None,
            new_value: Some(new_value.into()),
            change_type: PropertyChangeType::Added,
        }
    }

    /// A key that disappeared, previously holding `old_value`.
    pub fn deleted(
        namespace: impl Into<String>,
        key: impl Into<String>,
        old_value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            old_value: Some(old_value.into()),
            new_value: None,
            change_type: PropertyChangeType::Deleted,
        }
    }

    /// A key whose value changed from `old_value` to `new_value`.
    ///
    /// Returns `None` when the values are equal, since that is not a change.
    pub fn modified(
        namespace: impl Into<String>,
        key: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Option<Self> {
        let old_value = old_value.into();
        let new_value = new_value.into();
        if old_value == new_value {
            return None;
        }
        Some(Self {
            namespace: namespace.into(),
            key: key.into(),
            old_value: Some(old_value),
            new_value: Some(new_value),
            change_type: PropertyChangeType::Modified,
        })
    }

    /// Namespace the key belongs to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The changed key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Value before the change, `None` for additions.
    pub fn old_value(&self) -> Option<&str> {
        self.old_value.as_deref()
    }

    /// Value after the change, `None` for deletions.
    pub fn new_value(&self) -> Option<&str> {
        self.new_value.as_deref()
    }

    /// The kind of change.
    pub fn change_type(&self) -> PropertyChangeType {
        self.change_type
    }
}

impl fmt::Display for ConfigChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{}: {:?} -> {:?}",
            self.change_type, self.namespace, self.key, self.old_value, self.new_value
        )
    }
}

/// All changes produced by one diff of a namespace.
///
/// An event always carries at least one change, holds at most one record per
/// key and only records of its own namespace.
///
/// # Examples
///
/// ```rust
/// use hotswap_properties::model::{ChangeEvent, ConfigChange};
///
/// let event = ChangeEvent::new(
///     "application",
///     vec![ConfigChange::added("application", "timeout", "30")],
/// )
/// .expect("non-empty change list");
///
/// assert!(event.is_changed("timeout"));
/// assert_eq!(event.change("timeout").and_then(|c| c.new_value()), Some("30"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    namespace: String,
    changes: Vec<ConfigChange>,
    index: BTreeMap<String, usize>,
}

impl ChangeEvent {
    /// Wrap a change list into an event.
    ///
    /// Returns `None` when `changes` is empty, repeats a key, or contains a
    /// record of another namespace.
    pub fn new(namespace: impl Into<String>, changes: Vec<ConfigChange>) -> Option<Self> {
        if changes.is_empty() {
            return None;
        }

        let namespace = namespace.into();
        let mut index = BTreeMap::new();
        for (i, change) in changes.iter().enumerate() {
            if change.namespace != namespace || index.insert(change.key.clone(), i).is_some() {
                return None;
            }
        }

        Some(Self {
            namespace,
            changes,
            index,
        })
    }

    /// Namespace the event belongs to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Changes in diff order.
    pub fn changes(&self) -> &[ConfigChange] {
        &self.changes
    }

    /// Changed keys in natural order.
    pub fn changed_keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// The change recorded for `key`, if any.
    pub fn change(&self, key: &str) -> Option<&ConfigChange> {
        self.index.get(key).map(|&i| &self.changes[i])
    }

    /// Whether `key` changed.
    pub fn is_changed(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of changed keys.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
