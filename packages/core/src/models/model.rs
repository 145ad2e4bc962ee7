//! Model Definitions
//!
//! The declarative part of a model: collection name, document schema,
//! relation descriptors and model-level options. A `ModelDefinition` is plain
//! data and can be loaded from JSON; it becomes a runnable
//! [`Model`](crate::services::Model) once bound to a hook registry.
//!
//! ```json
//! {
//!   "collName": "users",
//!   "docDesc": { "email": "email", "username": { "fieldType": "string" } },
//!   "timeStamp": true,
//!   "relations": []
//! }
//! ```

use crate::models::{RelationDescriptor, SchemaTree, DEFAULT_MAX_SCHEMA_DEPTH};
use serde::{Deserialize, Serialize};

/// Model-level options, handed to the executor along with save requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOptions {
    /// Auto-add `createdAt` / `updatedAt`
    #[serde(default = "default_true")]
    pub time_stamp: bool,

    /// Auto-add `createdBy` / `updatedBy`
    #[serde(default = "default_true")]
    pub actor_stamp: bool,

    /// Auto-add `isActive` when not set
    #[serde(default = "default_true")]
    pub active_stamp: bool,

    /// Create/alter the collection and sync existing data on structure change
    #[serde(default)]
    pub alter_sync_coll: bool,

    /// Maximum nesting of sub-schemas below the root
    #[serde(default = "default_max_schema_depth")]
    pub max_schema_depth: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_schema_depth() -> usize {
    DEFAULT_MAX_SCHEMA_DEPTH
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            time_stamp: true,
            actor_stamp: true,
            active_stamp: true,
            alter_sync_coll: false,
            max_schema_depth: DEFAULT_MAX_SCHEMA_DEPTH,
        }
    }
}

/// Declarative model: what a collection's documents look like
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefinition {
    pub coll_name: String,

    pub doc_desc: SchemaTree,

    #[serde(flatten)]
    pub options: ModelOptions,

    #[serde(default)]
    pub relations: Vec<RelationDescriptor>,
}

impl ModelDefinition {
    pub fn new(coll_name: impl Into<String>, doc_desc: SchemaTree) -> Self {
        Self {
            coll_name: coll_name.into(),
            doc_desc,
            options: ModelOptions::default(),
            relations: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_relation(mut self, relation: RelationDescriptor) -> Self {
        self.relations.push(relation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataType, SchemaNode};
    use serde_json::json;

    #[test]
    fn test_options_defaults_when_omitted() {
        let def: ModelDefinition = serde_json::from_value(json!({
            "collName": "users",
            "docDesc": { "email": "email" }
        }))
        .unwrap();

        assert_eq!(def.options, ModelOptions::default());
        assert!(def.relations.is_empty());
        assert_eq!(def.doc_desc.get("email"), Some(&SchemaNode::Primitive(DataType::Email)));
    }

    #[test]
    fn test_options_override() {
        let def: ModelDefinition = serde_json::from_value(json!({
            "collName": "locations",
            "docDesc": {},
            "actorStamp": false,
            "alterSyncColl": true,
            "maxSchemaDepth": 4
        }))
        .unwrap();

        assert!(def.options.time_stamp);
        assert!(!def.options.actor_stamp);
        assert!(def.options.alter_sync_coll);
        assert_eq!(def.options.max_schema_depth, 4);
    }
}
