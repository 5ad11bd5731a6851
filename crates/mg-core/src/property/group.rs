//! Reusable groups of related properties.
//!
//! A [`PropertyGroup`] bundles properties that always travel together (the
//! color, width, and alpha of a stroke, say). Including a group in a type
//! declaration expands it into independent stored properties named
//! `<prefix>_<group>_<field>`; each can be read, written, and overridden
//! on its own afterwards.

use crate::property::descriptor::PropertyDescriptor;
use crate::property::value_type::ValueType;

/// A named bundle of stored properties.
///
/// # Examples
///
/// ```
/// use mg_core::{PropertyGroup, ValueType};
///
/// let line = PropertyGroup::new("line")
///     .field("color", ValueType::string().with_default("black"))
///     .field("width", ValueType::float().with_default(1.0));
///
/// let names: Vec<_> = line.expand(Some("border")).into_iter().map(|(name, _)| name).collect();
/// assert_eq!(names, ["border_line_color", "border_line_width"]);
/// ```
#[derive(Debug, Clone)]
pub struct PropertyGroup {
    name: String,
    fields: Vec<(String, ValueType)>,
}

impl PropertyGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.fields.push((name.into(), value_type));
        self
    }

    /// Returns the group name (`"line"`, `"fill"`, ...).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the group has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the full property name of `field` under `prefix`.
    #[must_use]
    pub fn property_name(&self, prefix: Option<&str>, field: &str) -> String {
        match prefix {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}_{}_{field}", self.name),
            _ => format!("{}_{field}", self.name),
        }
    }

    /// Expands the group into `(property name, descriptor)` pairs, in field
    /// order.
    #[must_use]
    pub fn expand(&self, prefix: Option<&str>) -> Vec<(String, PropertyDescriptor)> {
        self.fields
            .iter()
            .map(|(field, value_type)| {
                (
                    self.property_name(prefix, field),
                    PropertyDescriptor::Stored(value_type.clone()),
                )
            })
            .collect()
    }
}
