//! Wire representations.
//!
//! # Module Organization
//!
//! - [`serializer`] - Instance graphs to reference-deduplicated JSON
//! - [`describe`] - Model types to machine-readable descriptions

pub mod describe;
pub mod serializer;

pub use describe::{PropertySpec, TypeSpec, UNDEFINED, describe, describe_all};
pub use serializer::{RenderedObject, Serializer, WireGraph, serialize, serialize_with};
