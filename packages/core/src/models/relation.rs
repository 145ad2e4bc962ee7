//! Relation Descriptors
//!
//! A relation declares a directed reference from a source (parent)
//! collection to a target (child) collection. Collections are referenced by
//! name only. Self-relations (source == target) are legal and describe
//! hierarchies inside one collection.

use serde::{Deserialize, Serialize};

/// Relation cardinality, from the source's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToMany,
    ManyToOne,
}

/// Referential action applied to target records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationAction {
    /// Target records must be removed before the source record
    #[default]
    Restrict,
    /// Update or delete the foreign-key value/record
    Cascade,
    /// Leave the foreign-key value as-is
    NoAction,
    /// Set the foreign key to its default value
    SetDefault,
    /// Set the foreign key to null
    SetNull,
}

fn default_on_update() -> RelationAction {
    RelationAction::Cascade
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDescriptor {
    pub source_coll: String,
    pub target_coll: String,
    pub source_field: String,
    pub target_field: String,
    #[serde(rename = "relationType")]
    pub cardinality: RelationKind,

    /// Source-to-target field map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_field: Option<String>,

    /// Relation-side target field, many-to-many only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_field: Option<String>,

    /// Join collection, many-to-many only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_coll: Option<String>,

    #[serde(default)]
    pub on_delete: RelationAction,

    #[serde(default = "default_on_update")]
    pub on_update: RelationAction,
}

impl RelationDescriptor {
    /// Create a relation with `RESTRICT` on delete and `CASCADE` on update
    pub fn new(
        source_coll: impl Into<String>,
        source_field: impl Into<String>,
        target_coll: impl Into<String>,
        target_field: impl Into<String>,
        cardinality: RelationKind,
    ) -> Self {
        Self {
            source_coll: source_coll.into(),
            target_coll: target_coll.into(),
            source_field: source_field.into(),
            target_field: target_field.into(),
            cardinality,
            foreign_field: None,
            relation_field: None,
            relation_coll: None,
            on_delete: RelationAction::Restrict,
            on_update: RelationAction::Cascade,
        }
    }

    pub fn on_delete(mut self, action: RelationAction) -> Self {
        self.on_delete = action;
        self
    }

    pub fn on_update(mut self, action: RelationAction) -> Self {
        self.on_update = action;
        self
    }

    pub fn via(mut self, relation_coll: impl Into<String>, relation_field: impl Into<String>) -> Self {
        self.relation_coll = Some(relation_coll.into());
        self.relation_field = Some(relation_field.into());
        self
    }

    pub fn is_self_relation(&self) -> bool {
        self.source_coll == self.target_coll
    }
}
