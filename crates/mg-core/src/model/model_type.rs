//! Model types and their declarations.
//!
//! A [`TypeDecl`] is the static description a catalogue hands to the
//! [`Registry`](crate::Registry): a name, ordered parents, and ordered
//! property entries. Declaring it produces an immutable [`ModelType`]
//! holding the merged descriptor map and the transitive ancestor set.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::FxHashSet;
use crate::property::{
    Accessor, PropertyDecl, PropertyDescriptor, PropertyGroup, ValueType,
};

/// Shared handle to a declared model type.
pub type TypeRef = Rc<ModelType>;

/// A declared model type.
///
/// Immutable once declared. Property lookups go through a name-keyed map
/// built by the registry's merge.
pub struct ModelType {
    pub(crate) name: String,
    pub(crate) sub_name: Option<String>,
    pub(crate) doc: Option<String>,
    pub(crate) parents: SmallVec<[TypeRef; 4]>,
    pub(crate) is_abstract: bool,
    pub(crate) properties: BTreeMap<String, PropertyDescriptor>,
    pub(crate) ancestors: FxHashSet<String>,
}

impl ModelType {
    /// Returns the type name, which is also its tag on the wire.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the presentation alias, if one was declared.
    #[must_use]
    pub fn sub_name(&self) -> Option<&str> {
        self.sub_name.as_deref()
    }

    /// Returns the documentation string, if any.
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Returns the direct parents, in declaration order.
    pub fn parents(&self) -> impl Iterator<Item = &TypeRef> {
        self.parents.iter()
    }

    /// Returns `true` if the type cannot be instantiated.
    #[inline]
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Looks up the merged descriptor for `name`.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    /// Returns `true` if `name` is a declared or inherited property.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Iterates over all merged descriptors, sorted by name.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyDescriptor)> {
        self.properties.iter().map(|(name, d)| (name.as_str(), d))
    }

    /// Returns the names of the stored properties, sorted.
    #[must_use]
    pub fn stored_property_names(&self) -> Vec<&str> {
        self.properties()
            .filter(|(_, d)| d.is_stored())
            .map(|(name, _)| name)
            .collect()
    }

    /// Returns the transitive ancestors, sorted by name.
    #[must_use]
    pub fn ancestors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.ancestors.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns `true` if this type is `name` or descends from it.
    #[must_use]
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.name == name || self.ancestors.contains(name)
    }
}

/// Returns `true` if `a` is `b` or `b` is among `a`'s ancestors.
///
/// # Examples
///
/// ```
/// use mg_core::{Registry, TypeDecl, is_subtype};
///
/// let mut registry = Registry::new();
/// let range = registry.declare(TypeDecl::new("Range").abstract_type()).unwrap();
/// let range1d = registry.declare(TypeDecl::new("Range1d").parent("Range")).unwrap();
///
/// assert!(is_subtype(&range1d, &range));
/// assert!(is_subtype(&range, &range));
/// assert!(!is_subtype(&range, &range1d));
/// ```
#[must_use]
pub fn is_subtype(a: &ModelType, b: &ModelType) -> bool {
    a.is_subtype_of(&b.name)
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.name)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("abstract", &self.is_abstract)
            .field("properties", &self.properties.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The static declaration of a model type.
///
/// Entries are applied in the order they are added, after every parent's
/// merged descriptors; later entries win.
///
/// # Examples
///
/// ```
/// use mg_core::{TypeDecl, ValueType, Accessor, Value};
///
/// let decl = TypeDecl::new("Title")
///     .parent("Annotation")
///     .doc("A plot title.")
///     .property("text", ValueType::string().with_default(""))
///     .computed("shouting", Accessor::read_only(|m| {
///         Ok(Value::from(m.get("text")?.as_str().unwrap_or_default().to_uppercase()))
///     }));
///
/// assert_eq!(decl.name(), "Title");
/// assert_eq!(decl.entry_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub(crate) name: String,
    pub(crate) sub_name: Option<String>,
    pub(crate) doc: Option<String>,
    pub(crate) parents: SmallVec<[String; 4]>,
    pub(crate) is_abstract: bool,
    pub(crate) entries: Vec<(String, PropertyDecl)>,
}

impl TypeDecl {
    /// Starts a declaration with no parents and no properties.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_name: None,
            doc: None,
            parents: SmallVec::new(),
            is_abstract: false,
            entries: Vec::new(),
        }
    }

    /// Returns the declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of property entries (groups count once per field).
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Sets a presentation alias distinct from the wire tag.
    #[must_use]
    pub fn sub_name(mut self, sub_name: impl Into<String>) -> Self {
        self.sub_name = Some(sub_name.into());
        self
    }

    /// Sets the documentation string.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Appends a parent. Later parents win name collisions.
    #[must_use]
    pub fn parent(mut self, name: impl Into<String>) -> Self {
        self.parents.push(name.into());
        self
    }

    /// Marks the type as non-instantiable.
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Adds a property entry: a value type, a descriptor, or a transformer.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, entry: impl Into<PropertyDecl>) -> Self {
        self.entries.push((name.into(), entry.into()));
        self
    }

    /// Adds a computed property.
    #[must_use]
    pub fn computed(self, name: impl Into<String>, accessor: Accessor) -> Self {
        self.property(name, accessor)
    }

    /// Adds a stored property.
    #[must_use]
    pub fn stored(self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.property(name, value_type)
    }

    /// Expands a property group under an optional prefix.
    #[must_use]
    pub fn include(mut self, group: &PropertyGroup, prefix: Option<&str>) -> Self {
        self.entries.extend(
            group
                .expand(prefix)
                .into_iter()
                .map(|(name, descriptor)| (name, PropertyDecl::Descriptor(descriptor))),
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::override_default;

    #[test]
    fn test_type_decl_builder() {
        let decl = TypeDecl::new("LinearAxis")
            .sub_name("Linear")
            .parent("ContinuousAxis")
            .doc("An axis with linear ticks.")
            .stored("ticks", ValueType::int().with_default(5))
            .property("axis_label", override_default("x"));
        assert_eq!(decl.name(), "LinearAxis");
        assert_eq!(decl.sub_name.as_deref(), Some("Linear"));
        assert_eq!(decl.parents.as_slice(), ["ContinuousAxis".to_owned()]);
        assert!(!decl.is_abstract);
        assert_eq!(decl.entry_count(), 2);
        assert!(matches!(decl.entries[1].1, PropertyDecl::Transform(_)));
    }

    #[test]
    fn test_type_decl_include_expands_in_place() {
        let line = PropertyGroup::new("line")
            .field("color", ValueType::string())
            .field("width", ValueType::float());
        let decl = TypeDecl::new("Axis")
            .stored("a", ValueType::int())
            .include(&line, Some("axis"))
            .stored("z", ValueType::int());
        let names: Vec<_> = decl.entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["a", "axis_line_color", "axis_line_width", "z"]);
    }
}
