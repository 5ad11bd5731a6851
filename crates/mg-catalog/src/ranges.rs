//! Data ranges.

use mg_core::{Registry, RegistryError, TypeDecl, Value, ValueType};

fn bounds() -> ValueType {
    ValueType::nullable(ValueType::auto(ValueType::tuple([
        ValueType::nullable(ValueType::float()),
        ValueType::nullable(ValueType::float()),
    ])))
}

pub(crate) fn declare(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.declare(
        TypeDecl::new("Range")
            .parent("Model")
            .abstract_type()
            .doc("A one-dimensional interval of data space."),
    )?;

    registry.declare(
        TypeDecl::new("Range1d")
            .parent("Range")
            .doc("A range with fixed start and end.")
            .property("start", ValueType::float().with_default(0.0))
            .property("end", ValueType::float().with_default(1.0))
            .property("reset_start", ValueType::nullable(ValueType::float()))
            .property("reset_end", ValueType::nullable(ValueType::float()))
            .property("bounds", bounds()),
    )?;

    registry.declare(
        TypeDecl::new("DataRange1d")
            .parent("Range")
            .doc("A range computed from the extent of the data of its renderers.")
            .property("start", ValueType::nullable(ValueType::float()))
            .property("end", ValueType::nullable(ValueType::float()))
            .property("range_padding", ValueType::float().with_default(0.1))
            .property(
                "range_padding_units",
                ValueType::enumeration(["percent", "absolute"]).with_default("percent"),
            )
            .property(
                "renderers",
                ValueType::auto(ValueType::list(ValueType::instance("Renderer")))
                    .with_default(Value::List(Vec::new())),
            )
            .property("flipped", ValueType::bool().with_default(false))
            .property(
                "follow",
                ValueType::nullable(ValueType::enumeration(["start", "end"])),
            )
            .property("bounds", bounds()),
    )?;
    Ok(())
}
