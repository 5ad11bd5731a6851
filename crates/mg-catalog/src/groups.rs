//! Appearance property groups shared by glyphs, guides, and plots.

use mg_core::{PropertyGroup, ValueType};

use crate::color::color;

/// Dash patterns accepted by `line_dash`.
pub const DASH_PATTERNS: [&str; 5] = ["solid", "dashed", "dotted", "dotdash", "dashdot"];

fn alpha() -> ValueType {
    ValueType::interval(ValueType::float(), 0.0, 1.0).with_default(1.0)
}

/// Stroke properties: `line_color`, `line_alpha`, `line_width`, `line_dash`.
#[must_use]
pub fn line() -> PropertyGroup {
    PropertyGroup::new("line")
        .field("color", ValueType::nullable(color()).with_default("black"))
        .field("alpha", alpha())
        .field("width", ValueType::float().with_default(1.0))
        .field("dash", ValueType::enumeration(DASH_PATTERNS).with_default("solid"))
}

/// Fill properties: `fill_color`, `fill_alpha`.
#[must_use]
pub fn fill() -> PropertyGroup {
    PropertyGroup::new("fill")
        .field("color", ValueType::nullable(color()).with_default("gray"))
        .field("alpha", alpha())
}

/// Text properties: `text_color`, `text_alpha`, `text_font_size`,
/// `text_font_style`.
#[must_use]
pub fn text() -> PropertyGroup {
    PropertyGroup::new("text")
        .field("color", ValueType::nullable(color()).with_default("#444444"))
        .field("alpha", alpha())
        .field("font_size", ValueType::string().with_default("13px"))
        .field(
            "font_style",
            ValueType::enumeration(["normal", "italic", "bold", "bold italic"]).with_default("normal"),
        )
}
