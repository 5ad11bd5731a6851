//! The reference-deduplicated wire serializer.
//!
//! Every model reachable from the root is rendered exactly once into a flat
//! table of [`RenderedObject`]s; everywhere else it appears as an
//! `{"id": "..."}` token. Nested models are only queued while a model is
//! rendered, so cyclic and deep graphs terminate without recursion across
//! models.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json, json};
use tracing::debug;

use crate::config::WireConfig;
use crate::error::PropertyError;
use crate::model::{Model, ModelId};
use crate::property::ValueType;
use crate::value::Value;
use crate::{FxHashMap, FxHashSet};

/// One model instance in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedObject {
    /// The model type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// The instance id as a decimal string.
    pub id: String,
    /// Every non-Undefined attribute, in wire form.
    pub attributes: Map<String, Json>,
}

/// A serialized value plus the table of every model it reaches.
///
/// # Examples
///
/// ```
/// use mg_core::{Registry, TypeDecl, ValueType, Value, serialize};
///
/// let mut registry = Registry::new();
/// registry
///     .declare(TypeDecl::new("Node").property("next", ValueType::nullable(ValueType::instance("Node"))))
///     .unwrap();
/// let tail = registry.new_instance("Node").unwrap();
/// let head = registry.create("Node", [("next", &tail)]).unwrap();
///
/// let graph = serialize(&head).unwrap();
/// assert_eq!(graph.len(), 2);
/// assert_eq!(graph.value["id"], head.id().to_string());
/// assert!(graph.dangling_references().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireGraph {
    /// The serialized root value.
    pub value: Json,
    /// Every reachable model, in discovery order.
    pub refs: Vec<RenderedObject>,
}

impl WireGraph {
    /// Returns the rendered object for `id`.
    #[must_use]
    pub fn get(&self, id: ModelId) -> Option<&RenderedObject> {
        let id = id.to_string();
        self.refs.iter().find(|object| object.id == id)
    }

    /// Returns `true` if the table holds `id`.
    #[must_use]
    pub fn contains(&self, id: ModelId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the number of rendered objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Returns `true` if nothing was rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Returns the ids of `{"id": ...}` tokens with no entry in the table.
    ///
    /// Any single-key object whose key is `"id"` counts as a token.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<String> {
        let known: FxHashSet<&str> = self.refs.iter().map(|o| o.id.as_str()).collect();
        let mut dangling = Vec::new();
        let mut stack: Vec<&Json> = vec![&self.value];
        stack.extend(self.refs.iter().flat_map(|o| o.attributes.values()));
        while let Some(json) = stack.pop() {
            match json {
                Json::Object(map) => {
                    if let (1, Some(Json::String(id))) = (map.len(), map.get("id")) {
                        if !known.contains(id.as_str()) {
                            dangling.push(id.clone());
                        }
                    } else {
                        stack.extend(map.values());
                    }
                }
                Json::Array(items) => stack.extend(items),
                _ => {}
            }
        }
        dangling.sort_unstable();
        dangling.dedup();
        dangling
    }

    /// Renders the graph as a JSON document.
    pub fn to_json_string(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Incremental serializer with its own reference table.
///
/// A table is local to one serializer; concurrent or independent
/// serializations use independent serializers.
#[derive(Debug, Default)]
pub struct Serializer {
    config: WireConfig,
    refs: Vec<RenderedObject>,
    index: FxHashMap<ModelId, usize>,
    seen: FxHashSet<ModelId>,
    pending: VecDeque<Model>,
}

impl Serializer {
    /// Creates a serializer with an empty table.
    #[must_use]
    pub fn new(config: WireConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns an `{"id": ...}` token for `model`, queueing it for full
    /// rendering if it has not been seen yet.
    pub fn serialize_reference(&mut self, model: &Model) -> Json {
        if self.seen.insert(model.id()) {
            self.pending.push_back(model.clone());
        }
        json!({ "id": model.id().to_string() })
    }

    /// Renders `model` into the table, or returns its existing entry.
    ///
    /// Models it references are queued, not rendered; [`Serializer::finish`]
    /// drains the queue.
    ///
    /// # Errors
    ///
    /// With `include_defaults`, any error raised resolving a default.
    pub fn serialize_full(&mut self, model: &Model) -> Result<&RenderedObject, PropertyError> {
        if let Some(&slot) = self.index.get(&model.id()) {
            return Ok(&self.refs[slot]);
        }
        self.seen.insert(model.id());
        let slot = self.refs.len();
        self.index.insert(model.id(), slot);
        self.refs.push(RenderedObject {
            type_name: model.type_name().to_owned(),
            id: model.id().to_string(),
            attributes: Map::new(),
        });

        match self.render_attributes(model) {
            Ok(attributes) => {
                let rendered = &mut self.refs[slot];
                rendered.attributes = attributes;
                Ok(&*rendered)
            }
            Err(err) => {
                // Encoding only queues references, so the placeholder is last.
                self.refs.truncate(slot);
                self.index.remove(&model.id());
                self.seen.remove(&model.id());
                Err(err)
            }
        }
    }

    fn render_attributes(&mut self, model: &Model) -> Result<Map<String, Json>, PropertyError> {
        let model_type = model.model_type();
        let mut attributes = Map::new();
        for (name, value) in model.attributes() {
            if value.is_undefined() {
                continue;
            }
            let rule = model_type.property(&name).and_then(|d| d.value_type());
            let encoded = self.encode(&value, rule);
            attributes.insert(name, encoded);
        }
        if self.config.include_defaults {
            let unset: Vec<String> = model_type
                .stored_property_names()
                .into_iter()
                .filter(|name| !attributes.contains_key(*name))
                .map(str::to_owned)
                .collect();
            for name in unset {
                let value = model.get(&name)?;
                if value.is_undefined() {
                    continue;
                }
                let rule = model_type.property(&name).and_then(|d| d.value_type());
                let encoded = self.encode(&value, rule);
                attributes.insert(name, encoded);
            }
        }
        Ok(attributes)
    }

    /// Serializes a value with generic rules.
    pub fn serialize_value(&mut self, value: &Value) -> Json {
        self.encode(value, None)
    }

    /// Serializes a value governed by `rule`, applying its custom wire
    /// transform if there is one.
    pub fn serialize_typed(&mut self, value: &Value, rule: &ValueType) -> Json {
        self.encode(value, Some(rule))
    }

    fn encode(&mut self, value: &Value, rule: Option<&ValueType>) -> Json {
        if value.is_null() || value.is_undefined() {
            return Json::Null;
        }
        let rule = rule.map(|rule| rule.wire_rule(value));
        if let Some(to_wire) = rule.and_then(ValueType::wire_fn) {
            return to_wire(value);
        }
        match value {
            Value::Undefined | Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(x) => serde_json::Number::from_f64(*x).map_or(Json::Null, Json::Number),
            Value::String(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.encode(item, rule.and_then(|r| r.item_rule(i))))
                    .collect(),
            ),
            Value::Dict(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(key, item)| {
                        let rule = rule.and_then(|r| r.entry_rule(key));
                        (key.clone(), self.encode(item, rule))
                    })
                    .collect(),
            ),
            Value::Model(model) => self.serialize_reference(model),
        }
    }

    /// Returns the number of models rendered so far.
    #[must_use]
    pub fn rendered(&self) -> usize {
        self.refs.len()
    }

    /// Renders every queued model and returns the graph.
    ///
    /// # Errors
    ///
    /// The first error raised by [`Serializer::serialize_full`].
    pub fn finish(mut self, value: Json) -> Result<WireGraph, PropertyError> {
        while let Some(model) = self.pending.pop_front() {
            self.serialize_full(&model)?;
        }
        Ok(WireGraph {
            value,
            refs: self.refs,
        })
    }
}

/// Serializes `root` with the default configuration.
///
/// The graph's value is the root's `{"id": ...}` token, and the root is the
/// first entry of the table.
///
/// # Errors
///
/// Only with `include_defaults`; see [`serialize_with`].
pub fn serialize(root: &Model) -> Result<WireGraph, PropertyError> {
    serialize_with(root, &WireConfig::default())
}

/// Serializes `root` with the given configuration.
///
/// # Errors
///
/// With `include_defaults`, the first error raised resolving a default.
pub fn serialize_with(root: &Model, config: &WireConfig) -> Result<WireGraph, PropertyError> {
    let mut serializer = Serializer::new(*config);
    let value = serializer.serialize_reference(root);
    let graph = serializer.finish(value)?;
    debug!(root = %root.id(), objects = graph.len(), "serialized model graph");
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Registry, TypeDecl};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .declare(
                TypeDecl::new("Node")
                    .property("label", ValueType::string().with_default("node"))
                    .property("weight", ValueType::float())
                    .property("peer", ValueType::nullable(ValueType::instance("Node")))
                    .property("children", ValueType::list(ValueType::instance("Node")))
                    .property(
                        "tags",
                        ValueType::dict(
                            ValueType::string(),
                            ValueType::string().with_wire(|v| {
                                Json::String(v.as_str().unwrap_or_default().to_uppercase())
                            }),
                        ),
                    ),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_only_set_attributes_are_emitted() {
        let node = registry().create("Node", [("weight", 2)]).unwrap();
        let graph = serialize(&node).unwrap();
        let rendered = graph.get(node.id()).unwrap();
        assert_eq!(rendered.type_name, "Node");
        assert_eq!(Json::Object(rendered.attributes.clone()), json!({ "weight": 2.0 }));
    }

    #[test]
    fn test_include_defaults() {
        let node = registry().new_instance("Node").unwrap();
        let config = WireConfig {
            include_defaults: true,
            ..WireConfig::default()
        };
        let graph = serialize_with(&node, &config).unwrap();
        let rendered = graph.get(node.id()).unwrap();
        assert_eq!(Json::Object(rendered.attributes.clone()), json!({ "label": "node" }));
    }

    #[test]
    fn test_custom_wire_transform_in_container() {
        let node = registry()
            .create("Node", [("tags", Value::dict([("kind", "leaf")]))])
            .unwrap();
        let graph = serialize(&node).unwrap();
        assert_eq!(graph.refs[0].attributes["tags"], json!({ "kind": "LEAF" }));
    }

    #[test]
    fn test_custom_wire_transform_through_either_and_spec() {
        let tagged = || {
            ValueType::string()
                .with_wire(|v| Json::String(format!("<{}>", v.as_str().unwrap_or_default())))
        };
        let mut registry = Registry::new();
        registry
            .declare(
                TypeDecl::new("Mark")
                    .property("either", ValueType::either([ValueType::float(), tagged()]))
                    .property("spec", ValueType::spec(tagged()))
                    .property("field", ValueType::spec(tagged()))
                    .property("nullable", ValueType::nullable(tagged())),
            )
            .unwrap();
        let mark = registry
            .create(
                "Mark",
                [
                    ("either", Value::from("a")),
                    ("spec", Value::from("b")),
                    ("field", Value::dict([("field", "col")])),
                    ("nullable", Value::from("c")),
                ],
            )
            .unwrap();
        let graph = serialize(&mark).unwrap();
        assert_eq!(
            Json::Object(graph.refs[0].attributes.clone()),
            json!({
                "either": "<a>",
                "spec": { "value": "<b>" },
                "field": { "field": "col" },
                "nullable": "<c>",
            })
        );

        mark.set("either", 2).unwrap();
        let graph = serialize(&mark).unwrap();
        assert_eq!(graph.refs[0].attributes["either"], json!(2.0));
    }

    #[test]
    fn test_failed_render_leaves_no_placeholder() {
        let mut registry = Registry::new();
        registry
            .declare(
                TypeDecl::new("Broken")
                    .property("count", ValueType::int().with_generator(|| Value::from("many"))),
            )
            .unwrap();
        let broken = registry.new_instance("Broken").unwrap();
        let config = WireConfig {
            include_defaults: true,
            ..WireConfig::default()
        };

        let mut serializer = Serializer::new(config);
        assert!(serializer.serialize_full(&broken).is_err());
        assert_eq!(serializer.rendered(), 0);
        assert!(serializer.serialize_full(&broken).is_err());
        assert_eq!(serializer.rendered(), 0);
        assert!(serialize_with(&broken, &config).is_err());
    }

    #[test]
    fn test_nan_becomes_null() {
        let mut serializer = Serializer::new(WireConfig::default());
        assert_eq!(serializer.serialize_value(&Value::Float(f64::NAN)), Json::Null);
        assert_eq!(serializer.serialize_value(&Value::list([1, 2])), json!([1, 2]));
    }

    #[test]
    fn test_serialize_full_is_idempotent() {
        let registry = registry();
        let child = registry.new_instance("Node").unwrap();
        let node = registry
            .create("Node", [("children", Value::list([&child]))])
            .unwrap();
        let mut serializer = Serializer::new(WireConfig::default());
        serializer.serialize_full(&node).unwrap();
        serializer.serialize_full(&node).unwrap();
        assert_eq!(serializer.rendered(), 1);
        let graph = serializer.finish(Json::Null).unwrap();
        assert_eq!(graph.len(), 2);
        assert!(graph.contains(child.id()));
    }

    #[test]
    fn test_dangling_references() {
        let graph = WireGraph {
            value: json!({ "id": "1" }),
            refs: vec![RenderedObject {
                type_name: "Node".to_owned(),
                id: "1".to_owned(),
                attributes: json!({ "peer": { "id": "2" } })
                    .as_object()
                    .cloned()
                    .unwrap(),
            }],
        };
        assert_eq!(graph.dangling_references(), ["2"]);
    }

    #[test]
    fn test_json_document_shape() {
        let node = registry().new_instance("Node").unwrap();
        let text = serialize(&node).unwrap().to_json_string(false).unwrap();
        let id = node.id();
        assert_eq!(
            text,
            format!(r#"{{"value":{{"id":"{id}"}},"refs":[{{"type":"Node","id":"{id}","attributes":{{}}}}]}}"#)
        );
    }
}
