//! Business Services
//!
//! This module contains the engines that prepare and check documents:
//!
//! - `type_inference` - classifies raw values into `DataType` tags
//! - `resolver` - default values and `setValue` transforms
//! - `validator` - field rules plus task-scoped validators
//! - `relation_index` - parent/child lookups over relation descriptors
//! - `Model` - binds a model definition to its hooks and orchestrates
//!   save/delete against a caller-supplied `DocumentExecutor`
//!
//! Engines are plain (async) functions over their inputs and hold no shared
//! state.

pub mod error;
mod model;
mod relation_index;
mod resolver;
pub mod type_inference;
mod validator;

pub use error::{
    ExecutorError, ModelError, RecordFailure, RecordFailureReason, ResolutionError, SaveError,
};
pub use model::{DeletePlan, DeleteRequest, DocumentExecutor, Model, SaveRequest};
pub use relation_index::{CollectionRelations, RelationIndex};
pub use resolver::resolve_defaults;
pub use type_inference::{infer_type, type_matches};
pub use validator::{validate_record, Validator};
