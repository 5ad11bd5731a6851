//! Root types every catalogue model descends from.

use mg_core::{Registry, RegistryError, TypeDecl, Value, ValueType};

/// Layout sizing modes.
pub const SIZING_MODES: [&str; 7] = [
    "fixed",
    "stretch_width",
    "stretch_height",
    "stretch_both",
    "scale_width",
    "scale_height",
    "scale_both",
];

pub(crate) fn declare(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.declare(
        TypeDecl::new("Model")
            .abstract_type()
            .doc("Base type of every model in the catalogue.")
            .property("name", ValueType::nullable(ValueType::string()))
            .property(
                "tags",
                ValueType::list(ValueType::any()).with_default(Value::List(Vec::new())),
            ),
    )?;

    registry.declare(
        TypeDecl::new("LayoutDOM")
            .parent("Model")
            .abstract_type()
            .doc("A model that occupies space in a page layout.")
            .property("visible", ValueType::bool().with_default(true))
            .property("width", ValueType::nullable(ValueType::int()).with_default(600))
            .property("height", ValueType::nullable(ValueType::int()).with_default(600))
            .property(
                "sizing_mode",
                ValueType::nullable(ValueType::enumeration(SIZING_MODES)),
            ),
    )?;
    Ok(())
}
