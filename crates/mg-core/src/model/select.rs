//! Filtered lookups over model-valued properties.
//!
//! A [`Selector`] gathers candidates from one or more source properties,
//! keeps those of a target type that satisfy an optional predicate, and
//! exposes the result as a pair of computed properties: a plural accessor
//! returning every match, and a singular accessor that returns the only
//! match, [`Value::Undefined`] when nothing matches, or fails with
//! [`PropertyError::AmbiguousSelection`] naming the plural accessor.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::error::PropertyError;
use crate::model::instance::Model;
use crate::property::Accessor;
use crate::value::Value;

/// Candidate filter. May read the candidate's properties.
pub type Predicate = Rc<dyn Fn(&Model) -> Result<bool, PropertyError>>;

/// A parameterized filtered lookup.
///
/// # Examples
///
/// ```
/// use mg_core::{Registry, Selector, TypeDecl, ValueType, Value};
///
/// let xaxis = Selector::new("xaxes").of_type("Axis").from_property("below");
///
/// let mut registry = Registry::new();
/// registry.declare(TypeDecl::new("Axis")).unwrap();
/// registry
///     .declare(
///         TypeDecl::new("Plot")
///             .property("below", ValueType::list(ValueType::any()).with_default(Value::List(Vec::new())))
///             .computed("xaxis", xaxis.singular())
///             .computed("xaxes", xaxis.plural()),
///     )
///     .unwrap();
///
/// let plot = registry.new_instance("Plot").unwrap();
/// assert_eq!(plot.get("xaxis").unwrap(), Value::Undefined);
///
/// let axis = registry.new_instance("Axis").unwrap();
/// plot.set("below", Value::list([&axis])).unwrap();
/// assert_eq!(plot.get("xaxis").unwrap(), Value::from(&axis));
/// ```
#[derive(Clone)]
pub struct Selector {
    plural: String,
    target: Option<String>,
    sources: SmallVec<[String; 4]>,
    predicate: Option<Predicate>,
}

impl Selector {
    /// Creates a selector whose plural accessor is named `plural`.
    #[must_use]
    pub fn new(plural: impl Into<String>) -> Self {
        Self {
            plural: plural.into(),
            target: None,
            sources: SmallVec::new(),
            predicate: None,
        }
    }

    /// Restricts candidates to instances of `type_name` or its descendants.
    #[must_use]
    pub fn of_type(mut self, type_name: impl Into<String>) -> Self {
        self.target = Some(type_name.into());
        self
    }

    /// Adds a source property. Sources are read in the order added.
    #[must_use]
    pub fn from_property(mut self, name: impl Into<String>) -> Self {
        self.sources.push(name.into());
        self
    }

    /// Keeps only candidates for which `predicate` returns `true`.
    #[must_use]
    pub fn matching(
        mut self,
        predicate: impl Fn(&Model) -> Result<bool, PropertyError> + 'static,
    ) -> Self {
        self.predicate = Some(Rc::new(predicate));
        self
    }

    /// Returns the name of the plural accessor.
    #[must_use]
    pub fn plural_name(&self) -> &str {
        &self.plural
    }

    /// Returns every matching model reachable from the source properties of
    /// `model`, each once, in source order.
    ///
    /// # Errors
    ///
    /// Any error raised reading a source property or evaluating the
    /// predicate.
    pub fn select_all(&self, model: &Model) -> Result<Vec<Model>, PropertyError> {
        let mut candidates: Vec<Model> = Vec::new();
        for source in &self.sources {
            match model.get(source)? {
                Value::Model(candidate) => push_unique(&mut candidates, candidate),
                Value::List(items) => {
                    for item in items {
                        if let Value::Model(candidate) = item {
                            push_unique(&mut candidates, candidate);
                        }
                    }
                }
                _ => {}
            }
        }

        let mut matches = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if let Some(target) = &self.target {
                if !candidate.is_instance_of(target) {
                    continue;
                }
            }
            if let Some(predicate) = &self.predicate {
                if !predicate(&candidate)? {
                    continue;
                }
            }
            matches.push(candidate);
        }
        Ok(matches)
    }

    /// Returns the single match.
    ///
    /// # Errors
    ///
    /// [`PropertyError::AmbiguousSelection`] if more than one candidate
    /// matches, or any error from [`Selector::select_all`].
    pub fn select_one(&self, model: &Model) -> Result<Value, PropertyError> {
        let mut matches = self.select_all(model)?;
        match matches.len() {
            0 => Ok(Value::Undefined),
            1 => Ok(matches.pop().map_or(Value::Undefined, Value::Model)),
            n => Err(PropertyError::AmbiguousSelection {
                model: model.type_name().to_owned(),
                matches: n,
                plural: self.plural.clone(),
            }),
        }
    }

    /// A read-only accessor backed by [`Selector::select_one`].
    #[must_use]
    pub fn singular(&self) -> Accessor {
        let selector = self.clone();
        Accessor::read_only(move |model| selector.select_one(model))
    }

    /// A read-only accessor returning every match as a list.
    #[must_use]
    pub fn plural(&self) -> Accessor {
        let selector = self.clone();
        Accessor::read_only(move |model| {
            let matches = selector.select_all(model)?;
            Ok(Value::List(matches.into_iter().map(Value::Model).collect()))
        })
    }
}

fn push_unique(candidates: &mut Vec<Model>, candidate: Model) {
    if !candidates.iter().any(|m| m.ptr_eq(&candidate)) {
        candidates.push(candidate);
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("plural", &self.plural)
            .field("target", &self.target)
            .field("sources", &self.sources)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}
