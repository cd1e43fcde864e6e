//! Typed access to raw string properties.

use crate::error::FormatError;
use std::str::FromStr;

/// Typed getters layered on top of a raw string lookup.
///
/// Implementors only provide [`property`](PropertyAccessor::property). Every
/// typed getter returns the caller's default untouched when the key is
/// absent. A present value that does not parse is a [`FormatError`], never a
/// silent fallback to the default.
///
/// # Examples
///
/// ```rust
/// use hotswap_properties::core::PropertyAccessor;
/// use std::collections::HashMap;
///
/// struct Props(HashMap<String, String>);
///
/// impl PropertyAccessor for Props {
///     fn property(&self, key: &str) -> Option<String> {
///         self.0.get(key).cloned()
///     }
/// }
///
/// let props = Props(HashMap::from([
///     ("port".to_string(), "8080".to_string()),
///     ("hosts".to_string(), "a,b,c".to_string()),
/// ]));
///
/// assert_eq!(props.get_int_property("port", 80).unwrap(), 8080);
/// assert_eq!(props.get_int_property("missing", 5).unwrap(), 5);
/// assert_eq!(props.get_array_property("hosts", ",", Vec::new()), vec!["a", "b", "c"]);
/// ```
pub trait PropertyAccessor {
    /// Raw lookup of the value stored for `key`.
    fn property(&self, key: &str) -> Option<String>;

    /// The raw value for `key`, or `default` when absent.
    fn get_property(&self, key: &str, default: &str) -> String {
        self.property(key).unwrap_or_else(|| default.to_string())
    }

    /// The value for `key` as an `i32`.
    fn get_int_property(&self, key: &str, default: i32) -> Result<i32, FormatError> {
        parse_or_default(self.property(key), key, default)
    }

    /// The value for `key` as an `i64`.
    fn get_long_property(&self, key: &str, default: i64) -> Result<i64, FormatError> {
        parse_or_default(self.property(key), key, default)
    }

    /// The value for `key` as an `i16`.
    fn get_short_property(&self, key: &str, default: i16) -> Result<i16, FormatError> {
        parse_or_default(self.property(key), key, default)
    }

    /// The value for `key` as an `f32`.
    fn get_float_property(&self, key: &str, default: f32) -> Result<f32, FormatError> {
        parse_or_default(self.property(key), key, default)
    }

    /// The value for `key` as an `f64`.
    fn get_double_property(&self, key: &str, default: f64) -> Result<f64, FormatError> {
        parse_or_default(self.property(key), key, default)
    }

    /// The value for `key` as a signed byte.
    fn get_byte_property(&self, key: &str, default: i8) -> Result<i8, FormatError> {
        parse_or_default(self.property(key), key, default)
    }

    /// The value for `key` as a boolean.
    ///
    /// Only `"true"` (any case) is true. Every other present value is false,
    /// so this getter cannot fail.
    fn get_boolean_property(&self, key: &str, default: bool) -> bool {
        match self.property(key) {
            Some(value) => value.eq_ignore_ascii_case("true"),
            None => default,
        }
    }

    /// The value for `key` split on `delimiter`.
    ///
    /// The delimiter is a literal string. Segments are not trimmed and empty
    /// segments are kept.
    fn get_array_property(&self, key: &str, delimiter: &str, default: Vec<String>) -> Vec<String> {
        match self.property(key) {
            Some(value) => split_literal(&value, delimiter),
            None => default,
        }
    }
}

fn parse_or_default<T>(raw: Option<String>, key: &str, default: T) -> Result<T, FormatError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse::<T>()
            .map_err(|e| FormatError::new(key, value.as_str(), std::any::type_name::<T>(), e)),
    }
}

fn split_literal(value: &str, delimiter: &str) -> Vec<String> {
    // str::split on an empty pattern yields empty edges around every char
    if delimiter.is_empty() {
        return vec![value.to_string()];
    }
    value.split(delimiter).map(str::to_string).collect()
}
