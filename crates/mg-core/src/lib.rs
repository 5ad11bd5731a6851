//! Declarative property models with a reference-deduplicated wire format.
//!
//! This crate provides the machinery the rest of the workspace builds on:
//!
//! - [`ValueType`] descriptors that validate, coerce, and default values
//! - [`PropertyDescriptor`]s that are either stored or computed
//! - A [`Registry`] of [`ModelType`]s related by multiple inheritance
//! - [`Model`] instances with sparse attribute storage and stable identity
//! - A [`Serializer`] that flattens an instance graph into a [`WireGraph`]
//!
//! # Example
//!
//! ```
//! use mg_core::{Registry, TypeDecl, ValueType, Value};
//!
//! let mut registry = Registry::new();
//! registry
//!     .declare(
//!         TypeDecl::new("Range1d")
//!             .property("start", ValueType::float().with_default(0.0))
//!             .property("end", ValueType::float().with_default(1.0)),
//!     )
//!     .unwrap();
//!
//! let range = registry.create("Range1d", [("end", Value::from(10))]).unwrap();
//! assert_eq!(range.get("start").unwrap(), Value::Float(0.0));
//! assert_eq!(range.get("end").unwrap(), Value::Float(10.0));
//!
//! let graph = mg_core::serialize(&range).unwrap();
//! assert_eq!(graph.len(), 1);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod model;
pub mod property;
pub mod value;
pub mod wire;

pub use config::{Config, RegistryConfig, WireConfig};
pub use error::{ConfigError, Error, ErrorKind, PropertyError, RegistryError, Result};
pub use hash::{FxBuildHasher, FxHashMap, FxHashSet};
pub use model::{
    Model, ModelId, ModelType, Registry, Selector, TypeDecl, TypeRef, graph, is_subtype,
};
pub use property::{
    Accessor, DefaultValue, PropertyDecl, PropertyDescriptor, PropertyGroup, ValueType,
    override_default,
};
pub use value::Value;
pub use wire::{
    PropertySpec, RenderedObject, Serializer, TypeSpec, WireGraph, describe, describe_all,
    serialize, serialize_with,
};
