//! Property descriptors and declaration entries.
//!
//! A [`PropertyDescriptor`] is what a model type stores per property name:
//! either a [`ValueType`] (a stored property) or an [`Accessor`] pair of
//! getter/setter functions (a computed property). A descriptor's kind never
//! changes once created.
//!
//! A [`PropertyDecl`] is what a type declaration lists: a descriptor, or a
//! transformer applied to the descriptor inherited under the same name.

use std::fmt;
use std::rc::Rc;

use crate::error::PropertyError;
use crate::model::Model;
use crate::property::value_type::ValueType;
use crate::value::Value;

/// Reads a computed property.
pub type Getter = Rc<dyn Fn(&Model) -> Result<Value, PropertyError>>;

/// Writes a computed property. Responsible for its own validation.
pub type Setter = Rc<dyn Fn(&Model, Value) -> Result<(), PropertyError>>;

/// Rewrites an inherited descriptor during a type declaration.
pub type Transform = Rc<dyn Fn(&PropertyDescriptor) -> Result<PropertyDescriptor, String>>;

/// Getter/setter pair backing a computed property.
///
/// A getter-less accessor is write-only; a setter-less accessor is read-only.
///
/// # Examples
///
/// ```
/// use mg_core::{Accessor, Value};
///
/// let constant = Accessor::read_only(|_model| Ok(Value::from(42)));
/// assert!(constant.is_readable());
/// assert!(!constant.is_writable());
/// ```
#[derive(Clone, Default)]
pub struct Accessor {
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl Accessor {
    /// Creates an accessor with neither getter nor setter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a read-only accessor.
    #[must_use]
    pub fn read_only(getter: impl Fn(&Model) -> Result<Value, PropertyError> + 'static) -> Self {
        Self::new().with_getter(getter)
    }

    /// Creates a write-only accessor.
    #[must_use]
    pub fn write_only(setter: impl Fn(&Model, Value) -> Result<(), PropertyError> + 'static) -> Self {
        Self::new().with_setter(setter)
    }

    /// Sets the getter.
    #[must_use]
    pub fn with_getter(
        mut self,
        getter: impl Fn(&Model) -> Result<Value, PropertyError> + 'static,
    ) -> Self {
        self.getter = Some(Rc::new(getter));
        self
    }

    /// Sets the setter.
    #[must_use]
    pub fn with_setter(
        mut self,
        setter: impl Fn(&Model, Value) -> Result<(), PropertyError> + 'static,
    ) -> Self {
        self.setter = Some(Rc::new(setter));
        self
    }

    /// Returns `true` if the accessor has a getter.
    #[inline]
    #[must_use]
    pub const fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    /// Returns `true` if the accessor has a setter.
    #[inline]
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub(crate) fn get(&self, model: &Model, property: &str) -> Result<Value, PropertyError> {
        let getter = self.getter.as_ref().ok_or_else(|| PropertyError::NotReadable {
            model: model.type_name().to_owned(),
            property: property.to_owned(),
        })?;
        getter(model)
    }

    pub(crate) fn set(&self, model: &Model, property: &str, value: Value) -> Result<(), PropertyError> {
        let setter = self.setter.as_ref().ok_or_else(|| PropertyError::NotWritable {
            model: model.type_name().to_owned(),
            property: property.to_owned(),
        })?;
        setter(model, value)
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// The rule governing one named property of a model type.
#[derive(Debug, Clone)]
pub enum PropertyDescriptor {
    /// Held in the instance's attributes, validated on write.
    Stored(ValueType),
    /// Derived through getter/setter functions, never stored directly.
    Computed(Accessor),
}

impl PropertyDescriptor {
    /// Returns `true` for stored properties.
    #[inline]
    #[must_use]
    pub const fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }

    /// Returns `true` for computed properties.
    #[inline]
    #[must_use]
    pub const fn is_computed(&self) -> bool {
        matches!(self, Self::Computed(_))
    }

    /// Returns the value type of a stored property.
    #[must_use]
    pub const fn value_type(&self) -> Option<&ValueType> {
        match self {
            Self::Stored(value_type) => Some(value_type),
            Self::Computed(_) => None,
        }
    }

    /// Returns `"stored"` or `"computed"`.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Stored(_) => "stored",
            Self::Computed(_) => "computed",
        }
    }
}

impl From<ValueType> for PropertyDescriptor {
    fn from(value_type: ValueType) -> Self {
        Self::Stored(value_type)
    }
}

impl From<Accessor> for PropertyDescriptor {
    fn from(accessor: Accessor) -> Self {
        Self::Computed(accessor)
    }
}

/// One entry in a type declaration.
#[derive(Clone)]
pub enum PropertyDecl {
    /// Declares (or replaces) the property outright.
    Descriptor(PropertyDescriptor),
    /// Rewrites the descriptor already merged under the same name.
    Transform(Transform),
}

impl PropertyDecl {
    /// Wraps a transformer function.
    pub fn transform(
        f: impl Fn(&PropertyDescriptor) -> Result<PropertyDescriptor, String> + 'static,
    ) -> Self {
        Self::Transform(Rc::new(f))
    }
}

impl fmt::Debug for PropertyDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Descriptor(descriptor) => f.debug_tuple("Descriptor").field(descriptor).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

impl From<PropertyDescriptor> for PropertyDecl {
    fn from(descriptor: PropertyDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl From<ValueType> for PropertyDecl {
    fn from(value_type: ValueType) -> Self {
        Self::Descriptor(PropertyDescriptor::Stored(value_type))
    }
}

impl From<Accessor> for PropertyDecl {
    fn from(accessor: Accessor) -> Self {
        Self::Descriptor(PropertyDescriptor::Computed(accessor))
    }
}

/// A transformer replacing the default of an inherited stored property.
///
/// Fails on computed properties, which have no default.
///
/// # Examples
///
/// ```
/// use mg_core::{Registry, TypeDecl, ValueType, Value, override_default};
///
/// let mut registry = Registry::new();
/// registry
///     .declare(TypeDecl::new("Axis").property("ticks", ValueType::int().with_default(5)))
///     .unwrap();
/// registry
///     .declare(TypeDecl::new("DenseAxis").parent("Axis").property("ticks", override_default(10)))
///     .unwrap();
///
/// let axis = registry.new_instance("DenseAxis").unwrap();
/// assert_eq!(axis.get("ticks").unwrap(), Value::Int(10));
/// ```
pub fn override_default(value: impl Into<Value>) -> PropertyDecl {
    let value = value.into();
    PropertyDecl::transform(move |descriptor| match descriptor {
        PropertyDescriptor::Stored(value_type) => Ok(PropertyDescriptor::Stored(
            value_type.clone().with_default(value.clone()),
        )),
        PropertyDescriptor::Computed(_) => {
            Err("computed properties have no default to override".to_owned())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_flags() {
        let accessor = Accessor::new();
        assert!(!accessor.is_readable());
        assert!(!accessor.is_writable());

        let accessor = Accessor::write_only(|_, _| Ok(()));
        assert!(!accessor.is_readable());
        assert!(accessor.is_writable());
    }

    #[test]
    fn test_descriptor_kinds() {
        let stored = PropertyDescriptor::from(ValueType::int());
        assert!(stored.is_stored());
        assert_eq!(stored.kind_label(), "stored");
        assert!(stored.value_type().is_some());

        let computed = PropertyDescriptor::from(Accessor::new());
        assert!(computed.is_computed());
        assert_eq!(computed.kind_label(), "computed");
        assert!(computed.value_type().is_none());
    }

    #[test]
    fn test_override_default_on_stored() {
        let PropertyDecl::Transform(transform) = override_default(3) else {
            unreachable!("override_default always yields a transformer");
        };
        let inherited = PropertyDescriptor::from(ValueType::int().with_default(1));
        let replaced = transform(&inherited).unwrap();
        let default = replaced.value_type().and_then(ValueType::default_value);
        assert!(matches!(
            default,
            Some(crate::property::DefaultValue::Constant(Value::Int(3)))
        ));
    }

    #[test]
    fn test_override_default_on_computed_fails() {
        let PropertyDecl::Transform(transform) = override_default(3) else {
            unreachable!("override_default always yields a transformer");
        };
        let err = transform(&PropertyDescriptor::from(Accessor::new())).unwrap_err();
        assert!(err.contains("computed"));
    }
}
