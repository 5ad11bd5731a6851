//! The model-type registry.
//!
//! Types are declared once, parents first, and are immutable afterwards.
//! Declaration folds every parent's merged descriptor map left to right,
//! then applies the local entries in order, so the last writer always wins.

use std::collections::BTreeMap;
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::error::{Error, RegistryError};
use crate::model::instance::Model;
use crate::model::model_type::{ModelType, TypeDecl, TypeRef};
use crate::property::{PropertyDecl, PropertyDescriptor};
use crate::value::Value;
use crate::{FxHashMap, FxHashSet};

/// A name-keyed collection of declared model types.
///
/// # Examples
///
/// ```
/// use mg_core::{Registry, TypeDecl, ValueType, Value};
///
/// let mut registry = Registry::new();
/// registry.declare(TypeDecl::new("A").property("x", ValueType::int().with_default(1))).unwrap();
/// registry.declare(TypeDecl::new("B").parent("A").property("x", ValueType::int().with_default(2))).unwrap();
/// let c = registry.declare(TypeDecl::new("C").parent("A").parent("B")).unwrap();
///
/// assert_eq!(c.ancestors(), ["A", "B"]);
/// let m = registry.new_instance("C").unwrap();
/// assert_eq!(m.get("x").unwrap(), Value::Int(2));
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    types: FxHashMap<String, TypeRef>,
    config: RegistryConfig,
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            types: FxHashMap::default(),
            config,
        }
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Declares a new model type.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DuplicateType`] if the name is taken
    /// - [`RegistryError::UnknownParent`] if a parent is not declared yet
    /// - [`RegistryError::AbstractConflict`] if the type is abstract, a
    ///   parent is concrete, and the registry is strict
    /// - [`RegistryError::MissingTransformTarget`] if a transformer names a
    ///   property nothing declared before it
    /// - [`RegistryError::InvalidOverride`] if a transformer fails
    /// - [`RegistryError::InvalidDefault`] if a local constant default fails
    ///   its own value type
    pub fn declare(&mut self, decl: TypeDecl) -> Result<TypeRef, RegistryError> {
        let TypeDecl {
            name,
            sub_name,
            doc,
            parents: parent_names,
            is_abstract,
            entries,
        } = decl;

        if self.types.contains_key(&name) {
            return Err(RegistryError::DuplicateType(name));
        }

        let parents = parent_names
            .iter()
            .map(|parent| {
                self.types
                    .get(parent)
                    .map(Rc::clone)
                    .ok_or_else(|| RegistryError::UnknownParent {
                        model: name.clone(),
                        parent: parent.clone(),
                    })
            })
            .collect::<Result<SmallVec<[TypeRef; 4]>, _>>()?;

        if is_abstract {
            if let Some(concrete) = parents.iter().find(|p| !p.is_abstract()) {
                if self.config.strict_abstract {
                    return Err(RegistryError::AbstractConflict {
                        model: name,
                        parent: concrete.name().to_owned(),
                    });
                }
                warn!(
                    model = %name,
                    parent = %concrete.name(),
                    "abstract model type declared below a concrete parent"
                );
            }
        }

        let mut properties: BTreeMap<String, PropertyDescriptor> = BTreeMap::new();
        let mut ancestors = FxHashSet::default();
        for parent in &parents {
            for (key, descriptor) in &parent.properties {
                properties.insert(key.clone(), descriptor.clone());
            }
            ancestors.extend(parent.ancestors.iter().cloned());
            ancestors.insert(parent.name.clone());
        }

        for (property, entry) in entries {
            let descriptor = match entry {
                PropertyDecl::Descriptor(descriptor) => descriptor,
                PropertyDecl::Transform(transform) => {
                    let current = properties.get(&property).ok_or_else(|| {
                        RegistryError::MissingTransformTarget {
                            model: name.clone(),
                            property: property.clone(),
                        }
                    })?;
                    transform(current).map_err(|reason| RegistryError::InvalidOverride {
                        model: name.clone(),
                        property: property.clone(),
                        reason,
                    })?
                }
            };
            if let PropertyDescriptor::Stored(value_type) = &descriptor {
                value_type
                    .check_default()
                    .map_err(|reason| RegistryError::InvalidDefault {
                        model: name.clone(),
                        property: property.clone(),
                        reason,
                    })?;
            }
            properties.insert(property, descriptor);
        }

        debug!(
            model = %name,
            parents = parents.len(),
            properties = properties.len(),
            is_abstract,
            "declared model type"
        );

        let model_type = Rc::new(ModelType {
            name: name.clone(),
            sub_name,
            doc,
            parents,
            is_abstract,
            properties,
            ancestors,
        });
        self.types.insert(name, Rc::clone(&model_type));
        Ok(model_type)
    }

    /// Returns the type registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeRef> {
        self.types.get(name)
    }

    /// Returns the type registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownType`] if no such type exists.
    pub fn lookup(&self, name: &str) -> Result<&TypeRef, RegistryError> {
        self.types
            .get(name)
            .ok_or_else(|| RegistryError::UnknownType(name.to_owned()))
    }

    /// Returns `true` if a type named `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Instantiates `name`, writing each argument through the property
    /// protocol.
    ///
    /// # Errors
    ///
    /// Fails with a lookup error for an unknown type, or with any
    /// [`PropertyError`](crate::PropertyError) raised while constructing.
    pub fn create<I, K, V>(&self, name: &str, args: I) -> Result<Model, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let model_type = self.lookup(name)?;
        Ok(Model::new(model_type, args)?)
    }

    /// Instantiates `name` with every property left at its default.
    ///
    /// # Errors
    ///
    /// See [`Registry::create`].
    pub fn new_instance(&self, name: &str) -> Result<Model, Error> {
        self.create(name, std::iter::empty::<(&str, Value)>())
    }

    /// Returns `true` if the type `a` is `b` or descends from it.
    ///
    /// Unknown names are never subtypes of anything.
    #[must_use]
    pub fn is_subtype(&self, a: &str, b: &str) -> bool {
        self.types.get(a).is_some_and(|t| t.is_subtype_of(b))
    }

    /// Returns the number of declared types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over the declared types, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &TypeRef> {
        let mut types: Vec<&TypeRef> = self.types.values().collect();
        types.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        types.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, PropertyError};
    use crate::property::{Accessor, PropertyGroup, ValueType, override_default};

    fn base() -> Registry {
        let mut registry = Registry::new();
        registry
            .declare(TypeDecl::new("Model").abstract_type())
            .unwrap();
        registry
            .declare(
                TypeDecl::new("Range")
                    .parent("Model")
                    .abstract_type()
                    .property("bounds", ValueType::nullable(ValueType::float()).with_default(Value::Null)),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_declare_and_lookup() {
        let mut registry = base();
        let range1d = registry
            .declare(
                TypeDecl::new("Range1d")
                    .parent("Range")
                    .property("start", ValueType::float().with_default(0.0)),
            )
            .unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("Range1d"));
        assert!(Rc::ptr_eq(registry.lookup("Range1d").unwrap(), &range1d));
        assert!(range1d.has_property("bounds"));
        assert!(range1d.has_property("start"));
        assert_eq!(range1d.ancestors(), ["Model", "Range"]);
        assert!(registry.is_subtype("Range1d", "Model"));
        assert!(!registry.is_subtype("Range", "Range1d"));
        assert!(!registry.is_subtype("Nope", "Model"));
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut registry = base();
        let err = registry.declare(TypeDecl::new("Range")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateType("Range".to_owned()));
        assert_eq!(err.kind(), ErrorKind::RegistryConflict);
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut registry = Registry::new();
        let err = registry.declare(TypeDecl::new("A").parent("B")).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownParent { ref parent, .. } if parent == "B"));
        assert!(!registry.contains("A"));
    }

    #[test]
    fn test_lookup_unknown_type() {
        let err = Registry::new().lookup("Plot").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_abstract_below_concrete() {
        let mut registry = base();
        registry.declare(TypeDecl::new("Range1d").parent("Range")).unwrap();
        let err = registry
            .declare(TypeDecl::new("AbstractRange1d").parent("Range1d").abstract_type())
            .unwrap_err();
        assert!(matches!(err, RegistryError::AbstractConflict { .. }));

        let mut lenient = Registry::with_config(RegistryConfig {
            strict_abstract: false,
        });
        lenient.declare(TypeDecl::new("Concrete")).unwrap();
        let t = lenient
            .declare(TypeDecl::new("Loose").parent("Concrete").abstract_type())
            .unwrap();
        assert!(t.is_abstract());
    }

    #[test]
    fn test_parent_order_decides_collisions() {
        let mut registry = Registry::new();
        registry
            .declare(TypeDecl::new("A").property("x", ValueType::int().with_default(1)))
            .unwrap();
        registry
            .declare(TypeDecl::new("B").property("x", ValueType::string().with_default("b")))
            .unwrap();
        let ab = registry.declare(TypeDecl::new("AB").parent("A").parent("B")).unwrap();
        let ba = registry.declare(TypeDecl::new("BA").parent("B").parent("A")).unwrap();
        assert_eq!(ab.property("x").and_then(|d| d.value_type()).unwrap().to_string(), "String");
        assert_eq!(ba.property("x").and_then(|d| d.value_type()).unwrap().to_string(), "Int");
    }

    #[test]
    fn test_later_local_entries_win() {
        let mut registry = Registry::new();
        let t = registry
            .declare(
                TypeDecl::new("T")
                    .property("x", ValueType::int())
                    .property("x", Accessor::read_only(|_| Ok(Value::Int(7)))),
            )
            .unwrap();
        assert!(t.property("x").unwrap().is_computed());
    }

    #[test]
    fn test_transform_needs_target() {
        let mut registry = Registry::new();
        let err = registry
            .declare(TypeDecl::new("T").property("x", override_default(1)))
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingTransformTarget { ref property, .. } if property == "x"));
    }

    #[test]
    fn test_transform_applies_to_earlier_local_entry() {
        let mut registry = Registry::new();
        registry
            .declare(
                TypeDecl::new("T")
                    .property("x", ValueType::int().with_default(1))
                    .property("x", override_default(2)),
            )
            .unwrap();
        assert_eq!(registry.new_instance("T").unwrap().get("x").unwrap(), Value::Int(2));
    }

    #[test]
    fn test_transform_failure_is_invalid_override() {
        let mut registry = Registry::new();
        registry
            .declare(TypeDecl::new("A").computed("c", Accessor::read_only(|_| Ok(Value::Null))))
            .unwrap();
        let err = registry
            .declare(TypeDecl::new("B").parent("A").property("c", override_default(1)))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidOverride { .. }));
    }

    #[test]
    fn test_invalid_constant_default_rejected() {
        let mut registry = Registry::new();
        let err = registry
            .declare(TypeDecl::new("T").property("x", ValueType::int().with_default("one")))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDefault { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert!(!registry.contains("T"));

        registry
            .declare(TypeDecl::new("A").property("y", ValueType::int().with_default(1)))
            .unwrap();
        let err = registry
            .declare(TypeDecl::new("B").parent("A").property("y", override_default(1.5)))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDefault { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_group_properties_are_independent() {
        let line = PropertyGroup::new("line")
            .field("color", ValueType::string().with_default("black"))
            .field("width", ValueType::float().with_default(1.0));
        let mut registry = Registry::new();
        registry
            .declare(TypeDecl::new("Axis").include(&line, Some("axis")))
            .unwrap();
        registry
            .declare(
                TypeDecl::new("RedAxis")
                    .parent("Axis")
                    .property("axis_line_color", override_default("red")),
            )
            .unwrap();
        let axis = registry.new_instance("RedAxis").unwrap();
        assert_eq!(axis.get("axis_line_color").unwrap(), Value::from("red"));
        assert_eq!(axis.get("axis_line_width").unwrap(), Value::Float(1.0));
    }

    #[test]
    fn test_create_rejects_abstract_and_unknown() {
        let registry = base();
        let err = registry.new_instance("Range").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AbstractInstantiation);
        let err = registry.new_instance("Plot").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_create_validates_arguments() {
        let mut registry = base();
        registry
            .declare(
                TypeDecl::new("Range1d")
                    .parent("Range")
                    .property("start", ValueType::float().with_default(0.0)),
            )
            .unwrap();
        let err = registry
            .create("Range1d", [("start", Value::from("zero"))])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Property(PropertyError::InvalidValue { ref property, .. }) if property == "start"
        ));
        let err = registry.create("Range1d", [("stop", Value::Int(1))]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownProperty);
    }

    #[test]
    fn test_iter_is_sorted() {
        let registry = base();
        let names: Vec<_> = registry.iter().map(|t| t.name().to_owned()).collect();
        assert_eq!(names, ["Model", "Range"]);
    }
}
