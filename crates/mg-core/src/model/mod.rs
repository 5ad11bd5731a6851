//! Model types, the registry, and model instances.
//!
//! # Module Organization
//!
//! - [`model_type`] - Declared types and the declaration builder
//! - [`registry`] - Declaration, merge, and instantiation
//! - [`instance`] - Instances and the property protocol
//! - [`select`] - Singular/plural filtered accessors
//! - [`graph`] - Reachability queries over instance graphs
//! - [`id`] - Instance identifiers

pub mod graph;
pub mod id;
pub mod instance;
pub mod model_type;
pub mod registry;
pub mod select;

pub use id::ModelId;
pub use instance::Model;
pub use model_type::{ModelType, TypeDecl, TypeRef, is_subtype};
pub use registry::Registry;
pub use select::{Predicate, Selector};
