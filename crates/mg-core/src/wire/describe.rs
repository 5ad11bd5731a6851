//! Machine-readable descriptions of declared model types.
//!
//! Every property is listed with its kind, its rendered value type, and
//! its default in wire form. A generated default is produced once on a
//! scratch basis; models it creates are rendered in full next to the
//! `{"id": ...}` token that refers to them.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::config::WireConfig;
use crate::error::PropertyError;
use crate::model::{ModelType, Registry};
use crate::property::{DefaultValue, PropertyDescriptor, ValueType};
use crate::wire::serializer::{RenderedObject, Serializer};

/// Rendered in place of a default when a property has none.
pub const UNDEFINED: &str = "<Undefined>";

/// The description of one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    /// Property name.
    pub name: String,
    /// `"stored"` or `"computed"`.
    pub kind: String,
    /// Rendered value type; absent for computed properties.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Default in wire form, or `"<Undefined>"`.
    pub default: Json,
    /// Models created by a generated default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_refs: Vec<RenderedObject>,
}

/// The description of one model type.
///
/// # Examples
///
/// ```
/// use mg_core::{Registry, TypeDecl, ValueType, describe};
///
/// let mut registry = Registry::new();
/// let t = registry
///     .declare(TypeDecl::new("Span").doc("A span.").property("width", ValueType::float().with_default(1)))
///     .unwrap();
///
/// let spec = describe(&t).unwrap();
/// assert_eq!(spec.name, "Span");
/// assert_eq!(spec.properties[0].type_name.as_deref(), Some("Float"));
/// assert_eq!(spec.properties[0].default, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    /// Type name.
    pub name: String,
    /// Presentation alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_name: Option<String>,
    /// Direct parents, in declaration order.
    pub bases: Vec<String>,
    /// Whether the type is abstract.
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    /// Documentation string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Every merged property, sorted by name.
    pub properties: Vec<PropertySpec>,
}

/// Describes one model type.
///
/// # Errors
///
/// [`PropertyError::InvalidDefault`] if a generated default fails
/// validation, or any error raised while rendering the models it creates.
pub fn describe(model_type: &ModelType) -> Result<TypeSpec, PropertyError> {
    let properties = model_type
        .properties()
        .map(|(name, descriptor)| describe_property(model_type, name, descriptor))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TypeSpec {
        name: model_type.name().to_owned(),
        sub_name: model_type.sub_name().map(str::to_owned),
        bases: model_type.parents().map(|p| p.name().to_owned()).collect(),
        is_abstract: model_type.is_abstract(),
        doc: model_type.doc().map(str::to_owned),
        properties,
    })
}

/// Describes every type in `registry`, sorted by name.
///
/// # Errors
///
/// The first error raised by [`describe`].
pub fn describe_all(registry: &Registry) -> Result<Vec<TypeSpec>, PropertyError> {
    registry.iter().map(|t| describe(t)).collect()
}

fn describe_property(
    model_type: &ModelType,
    name: &str,
    descriptor: &PropertyDescriptor,
) -> Result<PropertySpec, PropertyError> {
    let (type_name, default, default_refs) = match descriptor {
        PropertyDescriptor::Computed(_) => (None, Json::from(UNDEFINED), Vec::new()),
        PropertyDescriptor::Stored(value_type) => {
            let (default, refs) = render_default(model_type, name, value_type)?;
            (Some(value_type.to_string()), default, refs)
        }
    };
    Ok(PropertySpec {
        name: name.to_owned(),
        kind: descriptor.kind_label().to_owned(),
        type_name,
        default,
        default_refs,
    })
}

fn render_default(
    model_type: &ModelType,
    name: &str,
    value_type: &ValueType,
) -> Result<(Json, Vec<RenderedObject>), PropertyError> {
    let value = match value_type.default_value() {
        None => return Ok((Json::from(UNDEFINED), Vec::new())),
        Some(DefaultValue::Constant(value)) => value_type.validate(value),
        Some(DefaultValue::Generated(generate)) => value_type.validate(&generate()),
    }
    .map_err(|reason| PropertyError::invalid_default(model_type.name(), name, reason))?;

    let mut scratch = Serializer::new(WireConfig::default());
    let json = scratch.serialize_typed(&value, value_type);
    let graph = scratch.finish(json)?;
    Ok((graph.value, graph.refs))
}
