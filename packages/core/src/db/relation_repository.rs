//! Relation Definitions Repository
//!
//! Stores the set of relation descriptors known across models. The
//! repository is a capability injected by the caller:
//!
//! - [`InMemoryRelationRepository`] - process-local, for tests and embedding
//! - [`JsonFileRelationRepository`] - a JSON array on disk
//!
//! [`register_relations`] merges a model's relations into whatever is stored.

use crate::db::RelationLookupError;
use crate::models::RelationDescriptor;
use async_trait::async_trait;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

pub type RelationSet = HashSet<RelationDescriptor>;

#[async_trait]
pub trait RelationRepository: Send + Sync {
    async fn load(&self) -> Result<RelationSet, RelationLookupError>;

    async fn save(&self, relations: &RelationSet) -> Result<(), RelationLookupError>;
}

/// Load the stored set, add `relations`, store and return the union
pub async fn register_relations(
    repository: &dyn RelationRepository,
    relations: &[RelationDescriptor],
) -> Result<RelationSet, RelationLookupError> {
    let mut stored = repository.load().await?;
    let before = stored.len();
    stored.extend(relations.iter().cloned());

    repository.save(&stored).await?;
    tracing::info!(
        "Registered {} new relation(s), {} stored",
        stored.len() - before,
        stored.len()
    );
    Ok(stored)
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRelationRepository {
    relations: Arc<RwLock<RelationSet>>,
}

impl InMemoryRelationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RelationRepository for InMemoryRelationRepository {
    async fn load(&self) -> Result<RelationSet, RelationLookupError> {
        Ok(self.relations.read().await.clone())
    }

    async fn save(&self, relations: &RelationSet) -> Result<(), RelationLookupError> {
        *self.relations.write().await = relations.clone();
        Ok(())
    }
}

/// Relations stored as a JSON array
///
/// A missing file reads as an empty set. Entries are written in a stable
/// order so the file diffs cleanly.
#[derive(Debug, Clone)]
pub struct JsonFileRelationRepository {
    path: PathBuf,
}

impl JsonFileRelationRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RelationRepository for JsonFileRelationRepository {
    async fn load(&self) -> Result<RelationSet, RelationLookupError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No relation repository at {}, starting empty", self.path.display());
                return Ok(RelationSet::new());
            }
            Err(e) => return Err(RelationLookupError::io(&self.path, e)),
        };

        if contents.trim().is_empty() {
            return Ok(RelationSet::new());
        }

        let relations: Vec<RelationDescriptor> = serde_json::from_str(&contents).map_err(|e| {
            tracing::warn!("Relation repository at {} is corrupt: {}", self.path.display(), e);
            RelationLookupError::corrupt(&self.path, e.to_string())
        })?;
        Ok(relations.into_iter().collect())
    }

    async fn save(&self, relations: &RelationSet) -> Result<(), RelationLookupError> {
        let mut entries: Vec<&RelationDescriptor> = relations.iter().collect();
        entries.sort_by_cached_key(|relation| serde_json::to_string(relation).unwrap_or_default());
        let json = serde_json::to_string_pretty(&entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RelationLookupError::io(parent, e))?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| RelationLookupError::io(&self.path, e))
    }
}
