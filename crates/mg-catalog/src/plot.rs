//! The plot container.
//!
//! Besides its stored properties, a plot exposes filtered views over the
//! renderers it holds: `xaxis`/`yaxis` look for axes in the side panels,
//! `xgrid`/`ygrid` for grids of the matching dimension among the
//! renderers. Each singular view has a plural twin that returns every match.

use std::rc::Rc;

use mg_core::{
    Accessor, Model, PropertyError, Registry, RegistryError, Selector, TypeDecl, Value, ValueType,
    override_default,
};

use crate::{groups, instantiate};

/// Toolbar and panel locations.
pub const LOCATIONS: [&str; 4] = ["above", "below", "left", "right"];

fn grid_selector(plural: &str, dimension: i64) -> Selector {
    Selector::new(plural)
        .of_type("Grid")
        .from_property("renderers")
        .matching(move |grid| Ok(grid.get("dimension")?.as_i64() == Some(dimension)))
}

fn get_dimensions(plot: &Model) -> Result<Value, PropertyError> {
    Ok(Value::list([plot.get("width")?, plot.get("height")?]))
}

fn set_dimensions(plot: &Model, value: Value) -> Result<(), PropertyError> {
    match value.as_list() {
        Some([width, height]) => {
            plot.set("width", width.clone())?.set("height", height.clone())?;
            Ok(())
        }
        _ => Err(PropertyError::invalid(
            plot.type_name(),
            "dimensions",
            format!("expected [width, height], got {value}"),
        )),
    }
}

pub(crate) fn declare(registry: &mut Registry) -> Result<(), RegistryError> {
    let data_range = Rc::clone(registry.lookup("DataRange1d")?);
    let range = || ValueType::instance("Range").with_generator(instantiate(&data_range));
    let panel = || {
        ValueType::list(ValueType::instance("Renderer")).with_default(Value::List(Vec::new()))
    };

    let xaxis = Selector::new("xaxes")
        .of_type("Axis")
        .from_property("below")
        .from_property("above");
    let yaxis = Selector::new("yaxes")
        .of_type("Axis")
        .from_property("left")
        .from_property("right");
    let xgrid = grid_selector("xgrids", 0);
    let ygrid = grid_selector("ygrids", 1);

    registry.declare(
        TypeDecl::new("Plot")
            .parent("LayoutDOM")
            .doc("A canvas with ranges, guides, and renderers.")
            .property("title", ValueType::nullable(ValueType::string()))
            .property("x_range", range())
            .property("y_range", range())
            .property("renderers", panel())
            .property("above", panel())
            .property("below", panel())
            .property("left", panel())
            .property("right", panel())
            .property(
                "toolbar_location",
                ValueType::nullable(ValueType::enumeration(LOCATIONS)).with_default("right"),
            )
            .property("min_border", ValueType::nullable(ValueType::int()).with_default(5))
            .include(&groups::line(), Some("outline"))
            .property("outline_line_color", override_default("#e5e5e5"))
            .include(&groups::fill(), Some("background"))
            .property("background_fill_color", override_default("white"))
            .include(&groups::fill(), Some("border"))
            .property("border_fill_color", override_default("white"))
            .computed("xaxis", xaxis.singular())
            .computed("xaxes", xaxis.plural())
            .computed("yaxis", yaxis.singular())
            .computed("yaxes", yaxis.plural())
            .computed("xgrid", xgrid.singular())
            .computed("xgrids", xgrid.plural())
            .computed("ygrid", ygrid.singular())
            .computed("ygrids", ygrid.plural())
            .computed(
                "dimensions",
                Accessor::new()
                    .with_getter(get_dimensions)
                    .with_setter(set_dimensions),
            ),
    )?;
    Ok(())
}
