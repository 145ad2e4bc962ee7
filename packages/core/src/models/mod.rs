//! Data Models
//!
//! Plain data structures describing documents and their schemas:
//!
//! - `DataType` - semantic type tags
//! - `SchemaTree` / `SchemaNode` / `FieldDescriptor` - the recursive schema
//! - `Record` - untyped value-records and their flattening
//! - `RelationDescriptor` - directed collection relations
//! - `ModelDefinition` / `ModelOptions` - declarative model
//! - `ValidateResponse` - field-keyed validation outcome

mod data_type;
mod model;
pub mod record;
mod relation;
mod schema;
mod validation;

pub use data_type::DataType;
pub use model::{ModelDefinition, ModelOptions};
pub use record::{flatten_record, is_missing, FlatRecord, Record};
pub use relation::{RelationAction, RelationDescriptor, RelationKind};
pub use schema::{
    DefaultValue, FieldDescriptor, FieldRule, FlatSchema, SchemaError, SchemaNode, SchemaTree,
    DEFAULT_MAX_SCHEMA_DEPTH,
};
pub use validation::{FieldErrors, FieldViolation, ValidateResponse, ViolationKind};
