//! Value-type and property descriptors.
//!
//! # Module Organization
//!
//! - [`value_type`] - Validation, coercion, defaults, and wire transforms
//! - [`descriptor`] - Stored/computed descriptors and declaration entries
//! - [`group`] - Prefixed groups of related properties

pub mod descriptor;
pub mod group;
pub mod value_type;

pub use descriptor::{
    Accessor, Getter, PropertyDecl, PropertyDescriptor, Setter, Transform, override_default,
};
pub use group::PropertyGroup;
pub use value_type::{AUTO, DefaultValue, Generator, Validator, ValueType, WireFn};
