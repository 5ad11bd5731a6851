//! A small sample graph built from the catalogue.

use mg_core::{Error, Model, Registry, Value};

/// Builds a scatter plot of three points with linear axes and grids.
///
/// The plot's data range is told about the glyph renderer, so the graph
/// shares instances between several referrers.
///
/// # Errors
///
/// Fails if the registry lacks a catalogue type or rejects a value.
///
/// # Examples
///
/// ```
/// let registry = mg_catalog::registry().unwrap();
/// let plot = mg_catalog::demo::scatter_plot(&registry).unwrap();
///
/// let graph = mg_core::serialize(&plot).unwrap();
/// assert!(graph.dangling_references().is_empty());
/// ```
pub fn scatter_plot(registry: &Registry) -> Result<Model, Error> {
    let source = registry.create(
        "ColumnDataSource",
        [(
            "data",
            Value::dict([("x", Value::list([1, 2, 3])), ("y", Value::list([4, 6, 5]))]),
        )],
    )?;
    let circle = registry.create(
        "Circle",
        [
            ("size", Value::from(12)),
            ("fill_color", Value::from("firebrick")),
            ("fill_alpha", Value::from(0.6)),
            ("line_color", Value::list([0, 0, 0])),
        ],
    )?;
    let renderer = registry.create(
        "GlyphRenderer",
        [("data_source", &source), ("glyph", &circle)],
    )?;

    let xaxis = registry.create("LinearAxis", [("axis_label", "x")])?;
    let yaxis = registry.create("LinearAxis", [("axis_label", "y")])?;
    let xgrid = registry.create(
        "Grid",
        [("dimension", Value::from(0)), ("axis", Value::from(&xaxis))],
    )?;
    let ygrid = registry.create(
        "Grid",
        [("dimension", Value::from(1)), ("axis", Value::from(&yaxis))],
    )?;

    let plot = registry.create(
        "Plot",
        [
            ("title", Value::from("Sample scatter")),
            ("below", Value::list([&xaxis])),
            ("left", Value::list([&yaxis])),
            ("renderers", Value::list([&renderer, &xgrid, &ygrid])),
        ],
    )?;

    for range in ["x_range", "y_range"] {
        if let Value::Model(data_range) = plot.get(range)? {
            data_range.set("renderers", Value::list([&renderer]))?;
        }
    }
    Ok(plot)
}
