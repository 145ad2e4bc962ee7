//! Storage Layer
//!
//! The only persisted artifact next to the engines is the relation
//! definitions repository, read when models load and written when new
//! relations are registered. Document persistence belongs to the caller's
//! [`DocumentExecutor`](crate::services::DocumentExecutor).

mod error;
mod relation_repository;

pub use error::RelationLookupError;
pub use relation_repository::{
    register_relations, InMemoryRelationRepository, JsonFileRelationRepository, RelationRepository,
    RelationSet,
};
