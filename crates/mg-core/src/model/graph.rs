//! Queries over an instance graph.
//!
//! Traversal uses an explicit work-list keyed by [`ModelId`], so arbitrarily
//! deep or cyclic graphs terminate without growing the call stack. Only
//! values already in the attribute maps are followed; defaults are never
//! materialized by a query.

use std::collections::VecDeque;

use crate::FxHashSet;
use crate::error::PropertyError;
use crate::model::id::ModelId;
use crate::model::instance::Model;

/// Returns every model reachable from `root`, root included, each once, in
/// breadth-first order.
///
/// # Examples
///
/// ```
/// use mg_core::{Registry, TypeDecl, ValueType, graph};
///
/// let mut registry = Registry::new();
/// registry
///     .declare(TypeDecl::new("Node").property("next", ValueType::nullable(ValueType::instance("Node"))))
///     .unwrap();
///
/// let a = registry.new_instance("Node").unwrap();
/// let b = registry.create("Node", [("next", &a)]).unwrap();
/// a.set("next", &b).unwrap();
///
/// let found = graph::references(&a);
/// assert_eq!(found, vec![a.clone(), b.clone()]);
/// # a.unset("next").unwrap();
/// ```
#[must_use]
pub fn references(root: &Model) -> Vec<Model> {
    let mut seen: FxHashSet<ModelId> = FxHashSet::default();
    let mut queue: VecDeque<Model> = VecDeque::new();
    let mut found = Vec::new();

    seen.insert(root.id());
    queue.push_back(root.clone());
    while let Some(model) = queue.pop_front() {
        for child in model.references() {
            if seen.insert(child.id()) {
                queue.push_back(child);
            }
        }
        found.push(model);
    }
    found
}

/// Returns the models reachable from `root` for which `predicate` holds.
///
/// # Errors
///
/// The first error returned by `predicate`.
pub fn select<F>(root: &Model, mut predicate: F) -> Result<Vec<Model>, PropertyError>
where
    F: FnMut(&Model) -> Result<bool, PropertyError>,
{
    let mut matches = Vec::new();
    for model in references(root) {
        if predicate(&model)? {
            matches.push(model);
        }
    }
    Ok(matches)
}

/// Returns the first reachable model of type `type_name` (or a descendant).
#[must_use]
pub fn find_instance(root: &Model, type_name: &str) -> Option<Model> {
    references(root)
        .into_iter()
        .find(|model| model.is_instance_of(type_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Registry, TypeDecl};
    use crate::property::ValueType;
    use crate::value::Value;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .declare(
                TypeDecl::new("Node")
                    .property("label", ValueType::string().with_default(""))
                    .property("children", ValueType::list(ValueType::instance("Node")))
                    .property(
                        "lazy",
                        ValueType::nullable(ValueType::instance("Node")).with_generator(|| Value::Null),
                    ),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_diamond_visits_each_once() {
        let registry = registry();
        let leaf = registry.new_instance("Node").unwrap();
        let left = registry.create("Node", [("children", Value::list([&leaf]))]).unwrap();
        let right = registry.create("Node", [("children", Value::list([&leaf]))]).unwrap();
        let root = registry
            .create("Node", [("children", Value::list([&left, &right]))])
            .unwrap();
        assert_eq!(references(&root), vec![root.clone(), left, right, leaf]);
    }

    #[test]
    fn test_self_reference() {
        let registry = registry();
        let node = registry.new_instance("Node").unwrap();
        node.set("children", Value::list([&node])).unwrap();
        assert_eq!(references(&node).len(), 1);
        node.unset("children").unwrap();
    }

    #[test]
    fn test_queries_do_not_materialize_defaults() {
        let registry = registry();
        let node = registry.new_instance("Node").unwrap();
        assert_eq!(references(&node).len(), 1);
        assert!(!node.is_set("lazy"));
    }

    #[test]
    fn test_select_and_find() {
        let registry = registry();
        let a = registry.create("Node", [("label", "a")]).unwrap();
        let b = registry.create("Node", [("label", "b")]).unwrap();
        let root = registry
            .create("Node", [("children", Value::list([&a, &b]))])
            .unwrap();
        let labelled = select(&root, |m| Ok(m.get("label")?.as_str() == Some("b"))).unwrap();
        assert_eq!(labelled, vec![b]);
        assert_eq!(find_instance(&root, "Node"), Some(root.clone()));
        assert!(find_instance(&root, "Plot").is_none());
    }
}
