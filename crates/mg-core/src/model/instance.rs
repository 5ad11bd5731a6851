//! Model instances and the property protocol.
//!
//! A [`Model`] is a shared handle: cloning it clones the handle, never the
//! instance. Its attribute map is sparse. It holds only values written
//! explicitly and generated defaults already materialized by a read.
//!
//! Reads and writes never hold the attribute borrow across user code
//! (getters, setters, generators, validators), so those may freely read
//! and write the same instance.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use tracing::trace;

use crate::FxHashMap;
use crate::error::PropertyError;
use crate::model::id::ModelId;
use crate::model::model_type::TypeRef;
use crate::property::{DefaultValue, PropertyDescriptor};
use crate::value::Value;

struct ModelData {
    id: ModelId,
    model_type: TypeRef,
    attributes: RefCell<FxHashMap<String, Value>>,
}

impl Drop for ModelData {
    /// Releases the attribute graph with a work-list.
    ///
    /// A model whose last handle is found here has its attributes moved onto
    /// the same list before it is freed, so its own drop has nothing left to
    /// recurse into.
    fn drop(&mut self) {
        let mut pending: Vec<Value> = self.attributes.get_mut().drain().map(|(_, v)| v).collect();
        while let Some(value) = pending.pop() {
            match value {
                Value::Model(Model(data)) => {
                    if let Some(mut data) = Rc::into_inner(data) {
                        pending.extend(data.attributes.get_mut().drain().map(|(_, v)| v));
                    }
                }
                Value::List(items) => pending.extend(items),
                Value::Dict(entries) => pending.extend(entries.into_values()),
                _ => {}
            }
        }
    }
}

/// A typed, identity-bearing instance of a [`ModelType`](crate::ModelType).
///
/// Equality and hashing are by identity: two instances with identical
/// attributes are still different models.
///
/// Instances that reference each other form `Rc` cycles and are only freed
/// once one of the links is removed.
///
/// # Examples
///
/// ```
/// use mg_core::{Registry, TypeDecl, ValueType, Value};
///
/// let mut registry = Registry::new();
/// registry
///     .declare(TypeDecl::new("Title").property("text", ValueType::string().with_default("")))
///     .unwrap();
///
/// let title = registry.new_instance("Title").unwrap();
/// assert!(!title.is_set("text"));
///
/// title.set("text", "Hello").unwrap();
/// assert_eq!(title.get("text").unwrap(), Value::from("Hello"));
///
/// title.unset("text").unwrap();
/// assert_eq!(title.get("text").unwrap(), Value::from(""));
/// ```
#[derive(Clone)]
pub struct Model(Rc<ModelData>);

impl Model {
    /// Instantiates `model_type`, writing each argument through
    /// [`Model::set`] in order.
    ///
    /// # Errors
    ///
    /// [`PropertyError::AbstractInstantiation`] for abstract types, or the
    /// first error raised by an argument write.
    pub fn new<I, K, V>(model_type: &TypeRef, args: I) -> Result<Self, PropertyError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        if model_type.is_abstract() {
            return Err(PropertyError::AbstractInstantiation(
                model_type.name().to_owned(),
            ));
        }
        let model = Self(Rc::new(ModelData {
            id: ModelId::next(),
            model_type: Rc::clone(model_type),
            attributes: RefCell::new(FxHashMap::default()),
        }));
        for (name, value) in args {
            model.set(name.as_ref(), value)?;
        }
        Ok(model)
    }

    /// Returns the instance id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ModelId {
        self.0.id
    }

    /// Returns the instance's model type.
    #[inline]
    #[must_use]
    pub fn model_type(&self) -> &TypeRef {
        &self.0.model_type
    }

    /// Returns the model type name.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.0.model_type.name()
    }

    /// Returns `true` if the instance's type is `type_name` or descends
    /// from it.
    #[must_use]
    pub fn is_instance_of(&self, type_name: &str) -> bool {
        self.0.model_type.is_subtype_of(type_name)
    }

    /// Returns `true` if both handles point at the same instance.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn descriptor(&self, name: &str) -> Result<&PropertyDescriptor, PropertyError> {
        self.0
            .model_type
            .property(name)
            .ok_or_else(|| PropertyError::unknown(self.type_name(), name))
    }

    /// Reads a property.
    ///
    /// Values in the attribute map are returned as stored. Otherwise a
    /// computed property calls its getter, and a stored property resolves
    /// its default: [`Value::Undefined`] when there is none, the constant,
    /// or a freshly generated value that is cached on this instance.
    ///
    /// # Errors
    ///
    /// - [`PropertyError::UnknownProperty`] if `name` is not declared
    /// - [`PropertyError::NotReadable`] for a computed property without getter
    /// - [`PropertyError::InvalidDefault`] if the default fails validation
    /// - whatever the getter returns
    pub fn get(&self, name: &str) -> Result<Value, PropertyError> {
        let cached = self.0.attributes.borrow().get(name).cloned();
        if let Some(value) = cached {
            return Ok(value);
        }
        match self.descriptor(name)? {
            PropertyDescriptor::Computed(accessor) => accessor.get(self, name),
            PropertyDescriptor::Stored(value_type) => match value_type.default_value() {
                None => Ok(Value::Undefined),
                Some(DefaultValue::Constant(value)) => value_type
                    .validate(value)
                    .map_err(|reason| PropertyError::invalid_default(self.type_name(), name, reason)),
                Some(DefaultValue::Generated(generate)) => {
                    let value = value_type.validate(&generate()).map_err(|reason| {
                        PropertyError::invalid_default(self.type_name(), name, reason)
                    })?;
                    trace!(
                        model = %self.type_name(),
                        id = %self.id(),
                        property = name,
                        "materialized generated default"
                    );
                    let mut attributes = self.0.attributes.borrow_mut();
                    // The generator may have written the property itself.
                    let cached = attributes.entry(name.to_owned()).or_insert(value);
                    Ok(cached.clone())
                }
            },
        }
    }

    /// Writes a property and returns `self` for chaining.
    ///
    /// Writing [`Value::Undefined`] deletes the stored value, so the next
    /// read resolves the default again. For a computed property it is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// - [`PropertyError::UnknownProperty`] if `name` is not declared
    /// - [`PropertyError::InvalidValue`] if validation fails; the attribute
    ///   map is left untouched
    /// - [`PropertyError::NotWritable`] for a computed property without setter
    /// - whatever the setter returns
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<&Self, PropertyError> {
        let value = value.into();
        match self.descriptor(name)? {
            PropertyDescriptor::Stored(_) if value.is_undefined() => {
                self.0.attributes.borrow_mut().remove(name);
            }
            PropertyDescriptor::Stored(value_type) => {
                let value = value_type
                    .validate(&value)
                    .map_err(|reason| PropertyError::invalid(self.type_name(), name, reason))?;
                self.0.attributes.borrow_mut().insert(name.to_owned(), value);
            }
            PropertyDescriptor::Computed(_) if value.is_undefined() => {}
            PropertyDescriptor::Computed(accessor) => accessor.set(self, name, value)?,
        }
        Ok(self)
    }

    /// Deletes a stored value, reverting the property to its default.
    ///
    /// # Errors
    ///
    /// [`PropertyError::UnknownProperty`] if `name` is not declared.
    pub fn unset(&self, name: &str) -> Result<&Self, PropertyError> {
        self.set(name, Value::Undefined)
    }

    /// Writes several properties in order, stopping at the first failure.
    ///
    /// Writes before the failing one stay applied.
    ///
    /// # Errors
    ///
    /// The first error raised by [`Model::set`].
    pub fn update<I, K, V>(&self, values: I) -> Result<&Self, PropertyError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (name, value) in values {
            self.set(name.as_ref(), value)?;
        }
        Ok(self)
    }

    /// Returns `true` if the attribute map holds a value for `name`.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.0.attributes.borrow().contains_key(name)
    }

    /// Returns a sorted snapshot of the attribute map.
    #[must_use]
    pub fn attributes(&self) -> BTreeMap<String, Value> {
        self.0
            .attributes
            .borrow()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Returns the models held directly in the attribute map, in property
    /// name order, each once.
    #[must_use]
    pub fn references(&self) -> Vec<Self> {
        let mut found: Vec<Self> = Vec::new();
        for value in self.attributes().values() {
            collect_models(value, &mut found);
        }
        found
    }
}

fn collect_models(value: &Value, found: &mut Vec<Model>) {
    match value {
        Value::Model(model) => {
            if !found.iter().any(|m| m.ptr_eq(model)) {
                found.push(model.clone());
            }
        }
        Value::List(items) => items.iter().for_each(|item| collect_models(item, found)),
        Value::Dict(entries) => entries.values().for_each(|item| collect_models(item, found)),
        _ => {}
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Model {}

impl Hash for Model {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attributes = self.0.attributes.try_borrow().map_or(0, |a| a.len());
        f.debug_struct("Model")
            .field("type", &self.type_name())
            .field("id", &self.id())
            .field("attributes", &attributes)
            .finish()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{Registry, TypeDecl};
    use crate::property::{Accessor, ValueType};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .declare(
                TypeDecl::new("Range1d")
                    .property("start", ValueType::float().with_default(0.0))
                    .property("end", ValueType::float().with_default(1.0))
                    .property("name", ValueType::nullable(ValueType::string())),
            )
            .unwrap();
        registry
            .declare(
                TypeDecl::new("Plot")
                    .property(
                        "x_range",
                        ValueType::instance("Range1d").with_generator(|| Value::Null),
                    )
                    .property("width", ValueType::int().with_default(600))
                    .property("height", ValueType::int().with_default(400))
                    .computed(
                        "area",
                        Accessor::read_only(|m| {
                            let w = m.get("width")?.as_i64().unwrap_or_default();
                            let h = m.get("height")?.as_i64().unwrap_or_default();
                            Ok(Value::Int(w * h))
                        })
                        .with_setter(|m, v| {
                            m.set("width", v.clone())?;
                            m.set("height", v)?;
                            Ok(())
                        }),
                    )
                    .computed("secret", Accessor::write_only(|_, _| Ok(()))),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_constant_default_not_materialized() {
        let range = registry().new_instance("Range1d").unwrap();
        assert_eq!(range.get("end").unwrap(), Value::Float(1.0));
        assert!(!range.is_set("end"));
        assert_eq!(range.get("name").unwrap(), Value::Undefined);
    }

    #[test]
    fn test_set_coerces_and_stores() {
        let range = registry().new_instance("Range1d").unwrap();
        range.set("end", 10).unwrap().set("start", -1).unwrap();
        assert_eq!(range.get("end").unwrap(), Value::Float(10.0));
        assert_eq!(range.attributes().len(), 2);
    }

    #[test]
    fn test_failed_set_leaves_map_unchanged() {
        let range = registry().new_instance("Range1d").unwrap();
        range.set("end", 5.0).unwrap();
        let err = range.set("end", "five").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(range.get("end").unwrap(), Value::Float(5.0));
    }

    #[test]
    fn test_unknown_property() {
        let range = registry().new_instance("Range1d").unwrap();
        assert_eq!(range.get("stop").unwrap_err().kind(), ErrorKind::UnknownProperty);
        assert_eq!(range.set("stop", 1).unwrap_err().kind(), ErrorKind::UnknownProperty);
    }

    #[test]
    fn test_invalid_generated_default_surfaces() {
        let plot = registry().new_instance("Plot").unwrap();
        let err = plot.get("x_range").unwrap_err();
        assert!(matches!(err, PropertyError::InvalidDefault { .. }));
        assert!(err.is_configuration_defect());
        assert!(!plot.is_set("x_range"));
    }

    #[test]
    fn test_generated_default_is_cached() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut registry = registry();
        let range_type = Rc::clone(registry.lookup("Range1d").unwrap());
        registry
            .declare(TypeDecl::new("Holder").property(
                "range",
                ValueType::instance("Range1d").with_generator(move || {
                    counter.set(counter.get() + 1);
                    Value::from(Model::new(&range_type, [("end", 2)]).unwrap())
                }),
            ))
            .unwrap();
        let holder = registry.new_instance("Holder").unwrap();
        let first = holder.get("range").unwrap();
        let second = holder.get("range").unwrap();
        assert_eq!(calls.get(), 1);
        assert!(first.as_model().unwrap().ptr_eq(second.as_model().unwrap()));
        assert!(holder.is_set("range"));
    }

    #[test]
    fn test_computed_getter_and_setter() {
        let plot = registry().new_instance("Plot").unwrap();
        assert_eq!(plot.get("area").unwrap(), Value::Int(240_000));
        plot.set("area", 10).unwrap();
        assert_eq!(plot.get("area").unwrap(), Value::Int(100));
        assert!(!plot.is_set("area"));
    }

    #[test]
    fn test_computed_access_modes() {
        let plot = registry().new_instance("Plot").unwrap();
        assert_eq!(plot.get("secret").unwrap_err().kind(), ErrorKind::NotReadable);
        plot.set("secret", 1).unwrap();

        let mut registry = registry();
        registry
            .declare(TypeDecl::new("Fixed").computed("c", Accessor::read_only(|_| Ok(Value::Int(1)))))
            .unwrap();
        let fixed = registry.new_instance("Fixed").unwrap();
        assert_eq!(fixed.set("c", 2).unwrap_err().kind(), ErrorKind::NotWritable);
        fixed.unset("c").unwrap();
    }

    #[test]
    fn test_unset_reverts_to_default() {
        let range = registry().new_instance("Range1d").unwrap();
        range.set("start", 3).unwrap();
        range.unset("start").unwrap();
        assert!(!range.is_set("start"));
        assert_eq!(range.get("start").unwrap(), Value::Float(0.0));
    }

    #[test]
    fn test_update_stops_at_first_failure() {
        let range = registry().new_instance("Range1d").unwrap();
        let err = range
            .update([("start", Value::Int(1)), ("end", Value::from("x")), ("name", Value::from("r"))])
            .unwrap_err();
        assert!(matches!(err, PropertyError::InvalidValue { ref property, .. } if property == "end"));
        assert!(range.is_set("start"));
        assert!(!range.is_set("name"));
    }

    #[test]
    fn test_identity_semantics() {
        let registry = registry();
        let a = registry.create("Range1d", [("end", 2)]).unwrap();
        let b = registry.create("Range1d", [("end", 2)]).unwrap();
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
        let a2 = a.clone();
        assert_eq!(a, a2);
        a2.set("start", 1).unwrap();
        assert!(a.is_set("start"));
        assert_eq!(a.to_string(), format!("Range1d({})", a.id()));
    }

    #[test]
    fn test_references_are_direct_and_unique() {
        let mut registry = registry();
        registry
            .declare(TypeDecl::new("Pair").property("items", ValueType::list(ValueType::instance("Range1d"))))
            .unwrap();
        let r = registry.new_instance("Range1d").unwrap();
        let pair = registry.create("Pair", [("items", Value::list([&r, &r]))]).unwrap();
        assert_eq!(pair.references(), vec![r]);
    }

    #[test]
    fn test_drop_releases_nested_containers_iteratively() {
        let mut registry = Registry::new();
        registry
            .declare(
                TypeDecl::new("Group")
                    .property("members", ValueType::list(ValueType::instance("Group")))
                    .property("by_name", ValueType::dict(ValueType::string(), ValueType::any())),
            )
            .unwrap();
        let leaf = registry.new_instance("Group").unwrap();
        let mut head = leaf.clone();
        for i in 0..100_000 {
            head = if i % 2 == 0 {
                registry
                    .create("Group", [("members", Value::list([&head]))])
                    .unwrap()
            } else {
                registry
                    .create("Group", [("by_name", Value::dict([("next", &head)]))])
                    .unwrap()
            };
        }
        drop(head);
        assert_eq!(Rc::strong_count(&leaf.0), 1);
    }
}
