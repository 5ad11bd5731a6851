//! Glyphs: the visual marks drawn for each data point.

use mg_core::{Registry, RegistryError, TypeDecl, ValueType};

use crate::groups;

fn number_spec() -> ValueType {
    ValueType::spec(ValueType::float())
}

pub(crate) fn declare(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.declare(
        TypeDecl::new("Glyph")
            .parent("Model")
            .abstract_type()
            .doc("Base type of all glyphs."),
    )?;
    registry.declare(
        TypeDecl::new("XYGlyph")
            .parent("Glyph")
            .abstract_type()
            .property("x", number_spec().with_default("x"))
            .property("y", number_spec().with_default("y")),
    )?;

    registry.declare(
        TypeDecl::new("Circle")
            .parent("XYGlyph")
            .doc("Circle markers centred on (x, y).")
            .property("size", number_spec().with_default(4))
            .property("radius", ValueType::nullable(number_spec()))
            .property("angle", number_spec().with_default(0.0))
            .include(&groups::line(), None)
            .include(&groups::fill(), None),
    )?;

    registry.declare(
        TypeDecl::new("Line")
            .parent("XYGlyph")
            .doc("A polyline through every (x, y) point.")
            .include(&groups::line(), None),
    )?;
    Ok(())
}
