//! Immutable point-in-time view of a namespace's properties.

use std::collections::{BTreeMap, HashMap};

/// The full key-value contents of one namespace at one point in time.
///
/// Keys iterate in lexicographic order, which keeps diff output deterministic.
/// A snapshot is never mutated after construction; share it with `Arc`.
///
/// # Examples
///
/// ```rust
/// use hotswap_properties::model::PropertySnapshot;
///
/// let snapshot: PropertySnapshot = [("timeout", "30"), ("host", "localhost")]
///     .into_iter()
///     .collect();
///
/// assert_eq!(snapshot.get("timeout"), Some("30"));
/// assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["host", "timeout"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySnapshot {
    properties: BTreeMap<String, String>,
}

impl PropertySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the raw value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Keys in natural order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Key-value pairs in natural key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the snapshot has no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PropertySnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<BTreeMap<String, String>> for PropertySnapshot {
    fn from(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }
}

impl From<HashMap<String, String>> for PropertySnapshot {
    fn from(properties: HashMap<String, String>) -> Self {
        properties.into_iter().collect()
    }
}

impl From<PropertySnapshot> for BTreeMap<String, String> {
    fn from(snapshot: PropertySnapshot) -> Self {
        snapshot.properties
    }
}
