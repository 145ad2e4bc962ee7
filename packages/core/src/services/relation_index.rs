//! Relation Index
//!
//! Answers "who points at this collection" and "what does this collection
//! point at" over a list of relation descriptors.
//!
//! A relation is directed from its source collection (the parent) to its
//! target collection (the child, whose documents hold the reference):
//!
//! - `parents_of(coll)` - relations whose `targetColl` is `coll`
//! - `children_of(coll)` - relations whose `sourceColl` is `coll`
//!
//! The delete path uses the children to refuse deleting records that still
//! have dependents under `RESTRICT`. Other `onDelete` actions are hints for
//! the executor and are not enforced here.

use crate::models::{RelationAction, RelationDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Parent and child relations of one collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionRelations {
    pub parents: Vec<RelationDescriptor>,
    pub children: Vec<RelationDescriptor>,
}

/// Read-only index over a model's relations
#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    relations: Vec<RelationDescriptor>,
}

impl RelationIndex {
    pub fn new(relations: Vec<RelationDescriptor>) -> Self {
        Self { relations }
    }

    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }

    pub fn parents_of(&self, coll_name: &str) -> Vec<RelationDescriptor> {
        self.filtered(|relation| relation.target_coll == coll_name)
    }

    pub fn children_of(&self, coll_name: &str) -> Vec<RelationDescriptor> {
        self.filtered(|relation| relation.source_coll == coll_name)
    }

    /// Distinct source collections of the parent relations, sorted
    pub fn parent_collection_names(&self, coll_name: &str) -> Vec<String> {
        distinct(self.parents_of(coll_name).into_iter().map(|r| r.source_coll))
    }

    /// Distinct target collections of the child relations, sorted
    pub fn child_collection_names(&self, coll_name: &str) -> Vec<String> {
        distinct(self.children_of(coll_name).into_iter().map(|r| r.target_coll))
    }

    pub fn relations_for(&self, coll_name: &str) -> CollectionRelations {
        CollectionRelations {
            parents: self.parents_of(coll_name),
            children: self.children_of(coll_name),
        }
    }

    /// Relations that block deleting a record of `coll_name` while dependents exist
    pub fn restricting(&self, coll_name: &str) -> Vec<RelationDescriptor> {
        self.filtered(|relation| {
            relation.source_coll == coll_name && relation.on_delete == RelationAction::Restrict
        })
    }

    fn filtered(&self, keep: impl Fn(&RelationDescriptor) -> bool) -> Vec<RelationDescriptor> {
        self.relations.iter().filter(|r| keep(*r)).cloned().collect()
    }
}

fn distinct(names: impl Iterator<Item = String>) -> Vec<String> {
    names.collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RelationKind;

    fn relations() -> Vec<RelationDescriptor> {
        vec![
            RelationDescriptor::new("countries", "id", "locations", "countryId", RelationKind::OneToMany),
            RelationDescriptor::new("countries", "id", "users", "countryId", RelationKind::OneToMany)
                .on_delete(RelationAction::SetNull),
            RelationDescriptor::new("continents", "id", "countries", "continentId", RelationKind::OneToMany)
                .on_delete(RelationAction::Cascade),
            RelationDescriptor::new("users", "id", "users", "managerId", RelationKind::OneToMany),
        ]
    }

    #[test]
    fn test_parents_and_children() {
        let index = RelationIndex::new(relations());

        let parents = index.parents_of("countries");
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].source_coll, "continents");

        let children = index.children_of("countries");
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|r| r.source_coll == "countries"));

        assert!(index.parents_of("unknown").is_empty());
    }

    #[test]
    fn test_collection_name_projections() {
        let index = RelationIndex::new(relations());

        assert_eq!(index.parent_collection_names("users"), vec!["countries", "users"]);
        assert_eq!(index.child_collection_names("countries"), vec!["locations", "users"]);
    }

    #[test]
    fn test_relations_for_self_relation() {
        let index = RelationIndex::new(relations());
        let users = index.relations_for("users");

        assert_eq!(users.parents.len(), 2);
        assert_eq!(users.children.len(), 1);
        assert!(users.children[0].is_self_relation());
    }

    #[test]
    fn test_restricting_relations() {
        let index = RelationIndex::new(relations());

        let restricting = index.restricting("countries");
        assert_eq!(restricting.len(), 1);
        assert_eq!(restricting[0].target_coll, "locations");
        assert!(index.restricting("continents").is_empty());
    }
}
