//! Renderers: guides (axes, grids) and glyph renderers.

use mg_core::{Registry, RegistryError, TypeDecl, ValueType, override_default};

use crate::{groups, instantiate};

/// Render levels, from back to front.
pub const RENDER_LEVELS: [&str; 6] = ["image", "underlay", "glyph", "guide", "annotation", "overlay"];

pub(crate) fn declare(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.declare(
        TypeDecl::new("Renderer")
            .parent("Model")
            .abstract_type()
            .doc("Anything drawn onto a plot canvas.")
            .property("level", ValueType::enumeration(RENDER_LEVELS).with_default("glyph"))
            .property("visible", ValueType::bool().with_default(true))
            .property("x_range_name", ValueType::string().with_default("default"))
            .property("y_range_name", ValueType::string().with_default("default")),
    )?;

    declare_guides(registry)?;

    registry.declare(
        TypeDecl::new("DataRenderer")
            .parent("Renderer")
            .abstract_type(),
    )?;

    let column_data_source = std::rc::Rc::clone(registry.lookup("ColumnDataSource")?);
    let optional_glyph = ValueType::nullable(ValueType::auto(ValueType::instance("Glyph")));
    registry.declare(
        TypeDecl::new("GlyphRenderer")
            .parent("DataRenderer")
            .doc("Draws one glyph for every row of a data source.")
            .property(
                "data_source",
                ValueType::instance("DataSource").with_generator(instantiate(&column_data_source)),
            )
            .property("glyph", ValueType::instance("Glyph"))
            .property("selection_glyph", optional_glyph.clone().with_default("auto"))
            .property("nonselection_glyph", optional_glyph.with_default("auto"))
            .property("muted", ValueType::bool().with_default(false)),
    )?;
    Ok(())
}

fn declare_guides(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.declare(
        TypeDecl::new("GuideRenderer")
            .parent("Renderer")
            .abstract_type()
            .property("level", override_default("guide")),
    )?;

    registry.declare(
        TypeDecl::new("Axis")
            .parent("GuideRenderer")
            .abstract_type()
            .doc("Base type of all axes.")
            .property("axis_label", ValueType::nullable(ValueType::string()))
            .property(
                "bounds",
                ValueType::auto(ValueType::tuple([ValueType::float(), ValueType::float()]))
                    .with_default("auto"),
            )
            .property(
                "major_label_orientation",
                ValueType::either([
                    ValueType::enumeration(["horizontal", "vertical"]),
                    ValueType::float(),
                ])
                .with_default("horizontal"),
            )
            .include(&groups::line(), Some("axis"))
            .include(&groups::text(), Some("axis_label"))
            .property("axis_label_text_font_style", override_default("italic")),
    )?;
    registry.declare(
        TypeDecl::new("ContinuousAxis")
            .parent("Axis")
            .abstract_type(),
    )?;
    registry.declare(
        TypeDecl::new("LinearAxis")
            .parent("ContinuousAxis")
            .doc("An axis with linearly spaced ticks."),
    )?;
    registry.declare(
        TypeDecl::new("LogAxis")
            .parent("ContinuousAxis")
            .doc("An axis with logarithmically spaced ticks."),
    )?;
    registry.declare(
        TypeDecl::new("CategoricalAxis")
            .parent("Axis")
            .doc("An axis labelled with factors."),
    )?;

    registry.declare(
        TypeDecl::new("Grid")
            .parent("GuideRenderer")
            .doc("Grid lines at the ticks of an axis.")
            .property(
                "dimension",
                ValueType::interval(ValueType::int(), 0.0, 1.0).with_default(0),
            )
            .property("axis", ValueType::nullable(ValueType::instance("Axis")))
            .include(&groups::line(), Some("grid"))
            .property("grid_line_color", override_default("#e5e5e5")),
    )?;
    Ok(())
}
