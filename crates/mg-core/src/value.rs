//! Dynamic property values.
//!
//! [`Value`] is what flows through the property protocol: what callers
//! write, what validators coerce, what defaults produce, and what reads
//! return. Model instances appear as [`Value::Model`] handles, so a value
//! can hold a shared, possibly cyclic, sub-graph.
//!
//! [`Value::Undefined`] is the "no value" sentinel. Reading a property
//! without a default yields it, and writing it deletes the stored value.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::Model;

/// A dynamically typed property value.
///
/// Equality is structural for data and by identity for models: two
/// distinct instances with identical attributes are never equal.
///
/// # Examples
///
/// ```
/// use mg_core::Value;
///
/// assert_eq!(Value::from(3), Value::Int(3));
/// assert_eq!(Value::from("red"), Value::String("red".to_owned()));
/// assert_eq!(Value::from(None::<f64>), Value::Null);
/// assert!(Value::default().is_undefined());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No value. Never stored; writing it deletes the property.
    #[default]
    Undefined,
    /// An explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// An ordered sequence (also used for fixed-arity tuples).
    List(Vec<Value>),
    /// A string-keyed mapping.
    Dict(BTreeMap<String, Value>),
    /// A shared handle to a model instance.
    Model(Model),
}

impl Value {
    /// Builds a [`Value::List`] from anything convertible into values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Value::Dict`] from key/value pairs.
    pub fn dict<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns `true` for the [`Value::Undefined`] sentinel.
    #[inline]
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` for [`Value::Null`].
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries, if this is a dict.
    #[must_use]
    pub const fn as_dict(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the model handle, if this is a model.
    #[must_use]
    pub const fn as_model(&self) -> Option<&Model> {
        match self {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Returns a short name for the variant, used in validation messages.
    #[must_use]
    pub const fn type_label(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Model(_) => "model",
        }
    }

    /// Returns `true` if a model handle appears anywhere inside this value.
    #[must_use]
    pub fn contains_model(&self) -> bool {
        match self {
            Self::Model(_) => true,
            Self::List(items) => items.iter().any(Self::contains_model),
            Self::Dict(entries) => entries.values().any(Self::contains_model),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Renders a compact, JSON-like form. Models print as `Type(id)` and are
    /// never descended into, so cyclic graphs print finitely.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("<Undefined>"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Dict(entries) => {
                f.write_str("{")?;
                for (i, (key, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {item}")?;
                }
                f.write_str("}")
            }
            Self::Model(model) => write!(f, "{}({})", model.type_name(), model.id()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Model> for Value {
    fn from(model: Model) -> Self {
        Self::Model(model)
    }
}

impl From<&Model> for Value {
    fn from(model: &Model) -> Self {
        Self::Model(model.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self::Dict(entries)
    }
}

impl From<serde_json::Value> for Value {
    /// Converts plain JSON data. Integral numbers become [`Value::Int`],
    /// every other number becomes [`Value::Float`].
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::list(items),
            serde_json::Value::Object(entries) => Self::dict(entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_default_is_undefined() {
        assert!(Value::default().is_undefined());
        assert!(!Value::Null.is_undefined());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::Float(2.5).as_i64(), None);
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert!(Value::list([1, 2]).as_list().is_some());
    }

    #[test]
    fn test_value_from_json() {
        let value = Value::from(serde_json::json!({"a": [1, 2.5, "x", null, true]}));
        let expected = Value::dict([(
            "a",
            Value::list([
                Value::Int(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::Null,
                Value::Bool(true),
            ]),
        )]);
        assert_eq!(value, expected);
    }

    #[test]
    fn test_value_display() {
        let value = Value::dict([("k", Value::list([Value::Int(1), Value::from("s")]))]);
        assert_eq!(value.to_string(), r#"{"k": [1, "s"]}"#);
        assert_eq!(Value::Undefined.to_string(), "<Undefined>");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
    }

    #[test]
    fn test_value_contains_model_without_models() {
        assert!(!Value::list([1, 2, 3]).contains_model());
        assert!(!Value::dict([("a", 1)]).contains_model());
    }
}
