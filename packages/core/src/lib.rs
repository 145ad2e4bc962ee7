//! DocModel Core Schema and Validation Layer
//!
//! This crate describes documents declaratively and prepares value-records
//! for persistence: inferring value types, filling defaults, running
//! transforms, validating fields, and answering relation lookups for the
//! delete path.
//!
//! # Architecture
//!
//! - **Explicit schema tree**: every node is a primitive tag, a field
//!   descriptor, or a nested sub-schema, decided once at construction
//! - **Hooks by name**: schemas reference suppliers, transforms and
//!   predicates by name; a registry binds them, so schemas stay plain data
//! - **Errors as data**: validation returns a field-keyed message map, so a
//!   batch reports every bad record instead of stopping at the first
//! - **No storage of its own**: documents go to a caller-supplied executor
//!
//! # Modules
//!
//! - [`models`] - Data structures (DataType, SchemaTree, RelationDescriptor, etc.)
//! - [`behaviors`] - Hook traits and the hook registry
//! - [`services`] - Inference, resolution, validation, relation index, Model
//! - [`db`] - Relation definitions repository
//! - [`utils`] - String format predicates

pub mod behaviors;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use behaviors::{HookError, HookRegistry};
pub use db::{register_relations, RelationLookupError, RelationRepository};
pub use models::*;
pub use services::{
    infer_type, resolve_defaults, validate_record, DocumentExecutor, Model, ModelError,
    ResolutionError, SaveError,
};
