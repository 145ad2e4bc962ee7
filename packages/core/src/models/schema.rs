//! Schema Descriptor Tree
//!
//! A model's document description is a tree of named nodes. Every node is
//! decided once, when the schema is built or deserialized, to be one of:
//!
//! - `Primitive` - a bare type tag, checked for type only
//! - `Field` - a type tag plus constraints and named hooks
//! - `Nested` - an embedded sub-schema
//!
//! ## Declarative Format
//!
//! ```json
//! {
//!   "email": "email",
//!   "username": { "fieldType": "string", "minValue": 6, "unique": true },
//!   "password": { "fieldType": "string", "setValue": "hashPassword" },
//!   "profile": {
//!     "firstName": { "fieldType": "string", "fieldLength": 255 },
//!     "language": { "fieldType": "string", "defaultValue": { "static": "en-US" } }
//!   }
//! }
//! ```
//!
//! Hooks are referenced by name and bound at model construction through a
//! [`HookRegistry`](crate::behaviors::HookRegistry), so a schema stays plain
//! data that can be serialized and inspected.
//!
//! ## Flattening
//!
//! [`SchemaTree::flatten`] lifts the leaves of nested sub-schemas into one
//! name → rule map so validation treats every leaf the same way regardless of
//! depth. Nested field names are kept as declared (no path prefixes). When two
//! levels declare the same name, the definition processed later wins: a tree's
//! entries are visited in name order and a nested sub-schema is descended into
//! at its own position.

use crate::models::DataType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Default nesting limit for schema trees
pub const DEFAULT_MAX_SCHEMA_DEPTH: usize = 16;

/// Schema construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Schema nesting exceeds the maximum depth of {limit} at '{field}'")]
    TooDeep { field: String, limit: usize },

    #[error("Invalid pattern for field '{field}': {message}")]
    InvalidPattern { field: String, message: String },
}

/// Default value for an absent field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefaultValue {
    /// Used as-is
    Static(serde_json::Value),

    /// Name of a registered default supplier hook
    Supplier(String),
}

/// Field descriptor: a schema leaf with type, constraints and hooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldDescriptor {
    pub field_type: DataType,

    /// Maximum character length for string values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_length: Option<usize>,

    /// Regex string values must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_pattern: Option<String>,

    #[serde(default = "default_allow_null")]
    pub allow_null: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub indexable: bool,

    #[serde(default)]
    pub primary_key: bool,

    /// Lower bound: numeric value for numbers, character count for strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,

    /// Upper bound: numeric value for numbers, character count for strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,

    /// Name of the transform hook applied to non-null values before save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,

    /// Name of the per-field predicate hook
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<String>,

    /// Replaces every generated message for this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_message: Option<String>,
}

fn default_allow_null() -> bool {
    true
}

impl FieldDescriptor {
    pub fn new(field_type: DataType) -> Self {
        Self {
            field_type,
            field_length: None,
            field_pattern: None,
            allow_null: true,
            unique: false,
            indexable: false,
            primary_key: false,
            min_value: None,
            max_value: None,
            set_value: None,
            default_value: None,
            validate: None,
            validate_message: None,
        }
    }

    pub fn field_length(mut self, length: usize) -> Self {
        self.field_length = Some(length);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.field_pattern = Some(pattern.into());
        self
    }

    /// Mark the field as required (`allowNull: false`)
    pub fn required(mut self) -> Self {
        self.allow_null = false;
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn indexable(mut self, indexable: bool) -> Self {
        self.indexable = indexable;
        self
    }

    pub fn primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    pub fn min_value(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn max_value(mut self, max: f64) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn set_value(mut self, hook: impl Into<String>) -> Self {
        self.set_value = Some(hook.into());
        self
    }

    pub fn default_static(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(DefaultValue::Static(value));
        self
    }

    pub fn default_supplier(mut self, hook: impl Into<String>) -> Self {
        self.default_value = Some(DefaultValue::Supplier(hook.into()));
        self
    }

    pub fn validate(mut self, hook: impl Into<String>) -> Self {
        self.validate = Some(hook.into());
        self
    }

    pub fn validate_message(mut self, message: impl Into<String>) -> Self {
        self.validate_message = Some(message.into());
        self
    }
}

/// A node of the schema tree
///
/// Deserialization tries the variants in order: a bare string is a
/// primitive, an object carrying `fieldType` is a field descriptor, any other
/// object is a nested sub-schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaNode {
    Primitive(DataType),
    Field(FieldDescriptor),
    Nested(SchemaTree),
}

/// Field name → schema node, immutable once a model is built
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaTree {
    fields: BTreeMap<String, SchemaNode>,
}

/// A flattened leaf rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule<'a> {
    Primitive(DataType),
    Field(&'a FieldDescriptor),
}

impl FieldRule<'_> {
    pub fn field_type(&self) -> DataType {
        match self {
            Self::Primitive(data_type) => *data_type,
            Self::Field(desc) => desc.field_type,
        }
    }
}

/// Result of [`SchemaTree::flatten`]
#[derive(Debug, Clone, Default)]
pub struct FlatSchema<'a> {
    leaves: BTreeMap<String, FieldRule<'a>>,
    nested: BTreeSet<String>,
}

impl<'a> FlatSchema<'a> {
    pub fn get(&self, name: &str) -> Option<&FieldRule<'a>> {
        self.leaves.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.leaves.contains_key(name)
    }

    /// Whether `name` declares a nested sub-schema at some level
    pub fn is_nested(&self, name: &str) -> bool {
        self.nested.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldRule<'a>)> {
        self.leaves.iter()
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

impl SchemaTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitive(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.fields.insert(name.into(), SchemaNode::Primitive(data_type));
        self
    }

    pub fn field(mut self, name: impl Into<String>, desc: FieldDescriptor) -> Self {
        self.fields.insert(name.into(), SchemaNode::Field(desc));
        self
    }

    pub fn nested(mut self, name: impl Into<String>, tree: SchemaTree) -> Self {
        self.fields.insert(name.into(), SchemaNode::Nested(tree));
        self
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Flatten with the default depth limit
    pub fn flatten(&self) -> Result<FlatSchema<'_>, SchemaError> {
        self.flatten_with_limit(DEFAULT_MAX_SCHEMA_DEPTH)
    }

    /// Flatten nested sub-schemas into a single leaf map
    ///
    /// `limit` bounds the number of nested levels below the root.
    pub fn flatten_with_limit(&self, limit: usize) -> Result<FlatSchema<'_>, SchemaError> {
        let mut flat = FlatSchema::default();
        self.flatten_into(&mut flat, 0, limit)?;
        Ok(flat)
    }

    fn flatten_into<'a>(
        &'a self,
        flat: &mut FlatSchema<'a>,
        depth: usize,
        limit: usize,
    ) -> Result<(), SchemaError> {
        for (name, node) in &self.fields {
            let rule = match node {
                SchemaNode::Primitive(data_type) => FieldRule::Primitive(*data_type),
                SchemaNode::Field(desc) => FieldRule::Field(desc),
                SchemaNode::Nested(tree) => {
                    if depth >= limit {
                        return Err(SchemaError::TooDeep {
                            field: name.clone(),
                            limit,
                        });
                    }
                    flat.nested.insert(name.clone());
                    tree.flatten_into(flat, depth + 1, limit)?;
                    continue;
                }
            };
            if flat.leaves.insert(name.clone(), rule).is_some() {
                tracing::debug!("Schema field '{}' redefined at depth {}, later definition wins", name, depth);
            }
        }
        Ok(())
    }

    /// Every field descriptor in the tree, with its declared name
    pub fn descriptors(&self) -> Vec<(&str, &FieldDescriptor)> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            for (name, node) in &tree.fields {
                match node {
                    SchemaNode::Field(desc) => out.push((name.as_str(), desc)),
                    SchemaNode::Nested(sub) => stack.push(sub),
                    SchemaNode::Primitive(_) => {}
                }
            }
        }
        out
    }

    /// Check that every `fieldPattern` in the tree compiles
    pub fn check_patterns(&self) -> Result<(), SchemaError> {
        for (name, desc) in self.descriptors() {
            if let Some(pattern) = &desc.field_pattern {
                regex::Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
                    field: name.to_string(),
                    message: e.to_string(),
                })?;
            }
        }
        Ok(())
    }
}
