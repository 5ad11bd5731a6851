//! The `Color` leaf value type.
//!
//! Accepts CSS named colors, `#rgb`/`#rrggbb` (optionally with alpha) hex
//! strings, and `[r, g, b]` or `[r, g, b, a]` lists. Strings are
//! normalized to lowercase. On the wire, lists become `rgb(...)` or
//! `rgba(...)` strings.

use mg_core::{Value, ValueType};
use serde_json::Value as Json;

/// Named colors accepted by [`color`]. Sorted for binary search.
pub const NAMED_COLORS: &[&str] = &[
    "aqua",
    "black",
    "blue",
    "brown",
    "coral",
    "crimson",
    "cyan",
    "firebrick",
    "gold",
    "gray",
    "green",
    "grey",
    "indigo",
    "lightgray",
    "lime",
    "magenta",
    "maroon",
    "navy",
    "olive",
    "orange",
    "pink",
    "purple",
    "red",
    "silver",
    "steelblue",
    "teal",
    "tomato",
    "white",
    "whitesmoke",
    "yellow",
];

/// The `Color` value type.
///
/// # Examples
///
/// ```
/// use mg_catalog::color::color;
/// use mg_core::Value;
///
/// let c = color();
/// assert_eq!(c.validate(&Value::from("Red")).unwrap(), Value::from("red"));
/// assert!(c.validate(&Value::from("#12ab")).is_ok());
/// assert!(c.validate(&Value::list([255, 0, 0, 2])).is_err());
/// ```
#[must_use]
pub fn color() -> ValueType {
    ValueType::custom("Color", validate_color).with_wire(color_to_wire)
}

fn validate_color(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(s) => {
            let lower = s.to_ascii_lowercase();
            if NAMED_COLORS.binary_search(&lower.as_str()).is_ok() || is_hex_color(&lower) {
                Ok(Value::String(lower))
            } else {
                Err(format!("{s:?} is neither a named color nor a hex color"))
            }
        }
        Value::List(items) if items.len() == 3 || items.len() == 4 => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if i < 3 {
                    item.as_i64()
                        .filter(|c| (0..=255).contains(c))
                        .map(Value::Int)
                        .ok_or_else(|| format!("channel {i} must be an integer in [0, 255], got {item}"))
                } else {
                    item.as_f64()
                        .filter(|a| (0.0..=1.0).contains(a))
                        .map(Value::Float)
                        .ok_or_else(|| format!("alpha must be a number in [0, 1], got {item}"))
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => Err(format!("expected a color, got {} {other}", other.type_label())),
    }
}

fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#').is_some_and(|digits| {
        matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
    })
}

fn color_to_wire(value: &Value) -> Json {
    match value.as_list() {
        Some([r, g, b]) => Json::String(format!("rgb({r}, {g}, {b})")),
        Some([r, g, b, a]) => Json::String(format!("rgba({r}, {g}, {b}, {a})")),
        _ => value.as_str().map_or(Json::Null, |s| Json::String(s.to_owned())),
    }
}
