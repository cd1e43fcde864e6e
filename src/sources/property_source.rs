//! Property source trait.

use crate::error::Result;
use crate::model::PropertySnapshot;
use config::{Value, ValueKind};
use std::collections::{BTreeMap, HashMap};

/// A provider of raw string properties for a namespace.
///
/// Implement this trait to feed properties from somewhere other than files,
/// environment variables or memory.
pub trait PropertySource: Send + Sync {
    /// Load the current properties as a flat snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed.
    fn load(&self) -> Result<PropertySnapshot>;

    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String;

    /// Get the priority of this source (higher = takes precedence).
    ///
    /// Default priorities:
    /// - Environment variables: 300
    /// - In-memory properties: 200
    /// - Files: 100, 101, 102, ... in the order they were added (at most 100 files)
    fn priority(&self) -> i32 {
        100
    }
}

/// Flatten a tree of `config` values into dotted string properties.
///
/// Nested tables become `parent.child` keys and nil values are dropped.
/// Arrays of scalars are joined with `,`. An array holding tables or arrays is
/// flattened by position instead, so `servers[0].host` becomes
/// `servers.0.host`.
pub(crate) fn flatten_values(values: HashMap<String, Value>) -> PropertySnapshot {
    let mut properties = BTreeMap::new();
    for (key, value) in values {
        flatten_into(&mut properties, key, value);
    }
    PropertySnapshot::from(properties)
}

fn flatten_into(properties: &mut BTreeMap<String, String>, key: String, value: Value) {
    match value.kind {
        ValueKind::Table(table) => {
            for (child, value) in table {
                flatten_into(properties, format!("{}.{}", key, child), value);
            }
        }
        ValueKind::Array(items) if items.iter().any(is_nested) => {
            for (position, item) in items.into_iter().enumerate() {
                flatten_into(properties, format!("{}.{}", key, position), item);
            }
        }
        ValueKind::Array(items) => {
            let joined = items
                .into_iter()
                .filter_map(|item| scalar_to_string(item.kind))
                .collect::<Vec<_>>()
                .join(",");
            properties.insert(key, joined);
        }
        kind => {
            if let Some(text) = scalar_to_string(kind) {
                properties.insert(key, text);
            }
        }
    }
}

fn is_nested(value: &Value) -> bool {
    matches!(value.kind, ValueKind::Table(_) | ValueKind::Array(_))
}

fn scalar_to_string(kind: ValueKind) -> Option<String> {
    match kind {
        ValueKind::Nil | ValueKind::Table(_) | ValueKind::Array(_) => None,
        ValueKind::Boolean(b) => Some(b.to_string()),
        ValueKind::I64(n) => Some(n.to_string()),
        ValueKind::I128(n) => Some(n.to_string()),
        ValueKind::U64(n) => Some(n.to_string()),
        ValueKind::U128(n) => Some(n.to_string()),
        ValueKind::Float(n) => Some(n.to_string()),
        ValueKind::String(s) => Some(s),
    }
}
