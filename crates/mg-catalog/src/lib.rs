//! A plotting model catalogue declared on top of `mg-core`.
//!
//! Every type here is plain data handed to [`Registry::declare`]: property
//! descriptors, a few computed views, and the [`color`](color::color) leaf
//! type with its own validator and wire transform.
//!
//! # Module Organization
//!
//! - [`color`] - The `Color` value type
//! - [`groups`] - Line, fill, and text property groups
//! - [`demo`] - A sample plot graph
//!
//! # Example
//!
//! ```
//! use mg_core::Value;
//!
//! let registry = mg_catalog::registry().unwrap();
//! let plot = registry.new_instance("Plot").unwrap();
//!
//! assert_eq!(plot.get("outline_line_color").unwrap(), Value::from("#e5e5e5"));
//! assert_eq!(plot.get("xaxis").unwrap(), Value::Undefined);
//! assert!(plot.get("x_range").unwrap().as_model().unwrap().is_instance_of("Range"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::rc::Rc;

use mg_core::{Model, Registry, RegistryConfig, RegistryError, TypeRef, Value};
use tracing::debug;

mod base;
pub mod color;
pub mod demo;
mod glyphs;
pub mod groups;
mod plot;
mod ranges;
mod renderers;
mod sources;

pub use base::SIZING_MODES;
pub use plot::LOCATIONS;
pub use renderers::RENDER_LEVELS;

/// Builds a registry holding the whole catalogue.
///
/// # Errors
///
/// Only if a declaration is inconsistent, which is a defect in this crate.
pub fn registry() -> Result<Registry, RegistryError> {
    registry_with(RegistryConfig::default())
}

/// Builds a registry holding the whole catalogue, with `config`.
///
/// # Errors
///
/// See [`registry`].
pub fn registry_with(config: RegistryConfig) -> Result<Registry, RegistryError> {
    let mut registry = Registry::with_config(config);
    declare_all(&mut registry)?;
    debug!(types = registry.len(), "declared model catalogue");
    Ok(registry)
}

/// Declares the catalogue into an existing registry.
///
/// # Errors
///
/// [`RegistryError::DuplicateType`] if a catalogue name is already taken.
pub fn declare_all(registry: &mut Registry) -> Result<(), RegistryError> {
    base::declare(registry)?;
    ranges::declare(registry)?;
    sources::declare(registry)?;
    glyphs::declare(registry)?;
    renderers::declare(registry)?;
    plot::declare(registry)?;
    Ok(())
}

/// A default generator producing a fresh instance of `model_type`.
///
/// Yields [`Value::Undefined`] if instantiation fails, which the property's
/// validation then reports as an invalid default.
pub(crate) fn instantiate(model_type: &TypeRef) -> impl Fn() -> Value + 'static {
    let model_type = Rc::clone(model_type);
    move || {
        Model::new(&model_type, std::iter::empty::<(&str, Value)>())
            .map_or(Value::Undefined, Value::Model)
    }
}
