//! Model Service
//!
//! A [`Model`] binds a [`ModelDefinition`] to the hooks its schema references
//! and is the entry point used by CRUD orchestration:
//!
//! - `resolve_defaults` / `validate` for single records
//! - `relations_for` and the parent/child projections
//! - `prepare_save` / `save` for batches of records
//! - `delete_plan` / `delete`
//!
//! Persistence itself is delegated to a [`DocumentExecutor`].
//!
//! # Examples
//!
//! ```no_run
//! # use docmodel_core::services::Model;
//! # use docmodel_core::behaviors::HookRegistry;
//! # use docmodel_core::models::{DataType, FieldDescriptor, Record, SchemaTree};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = SchemaTree::new()
//!     .field("username", FieldDescriptor::new(DataType::String).min_value(6.0).required())
//!     .primitive("email", DataType::Email);
//! let model = Model::new("users", schema, HookRegistry::new())?;
//!
//! let mut record = Record::new();
//! record.insert("username".into(), "abbeyma".into());
//! let prepared = model.prepare_save("create-user", vec![record]).await?;
//! assert_eq!(prepared.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::behaviors::HookRegistry;
use crate::models::{
    ModelDefinition, ModelOptions, Record, RelationDescriptor, SchemaTree, ValidateResponse,
};
use crate::services::error::{RecordFailure, RecordFailureReason};
use crate::services::{
    resolve_defaults, CollectionRelations, ExecutorError, ModelError, RelationIndex,
    ResolutionError, SaveError, Validator,
};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Save request handed to the executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub coll_name: String,
    pub task_name: String,
    /// Resolved and validated records
    pub action_params: Vec<Record>,
    pub options: ModelOptions,
}

/// Collections and relations the delete path has to respect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePlan {
    pub parent_colls: Vec<String>,
    pub child_colls: Vec<String>,
    /// Child relations with `onDelete: RESTRICT`
    pub restricting: Vec<RelationDescriptor>,
}

/// Delete request handed to the executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub coll_name: String,
    /// Caller query parameters, passed through untouched
    pub query_params: Value,
    pub plan: DeletePlan,
}

/// Persistence capability supplied by the caller
#[async_trait]
pub trait DocumentExecutor: Send + Sync {
    async fn save(&self, request: SaveRequest) -> Result<Value, ExecutorError>;

    async fn delete(&self, request: DeleteRequest) -> Result<Value, ExecutorError>;
}

/// A model definition bound to its hooks
#[derive(Debug, Clone)]
pub struct Model {
    definition: ModelDefinition,
    hooks: HookRegistry,
    relations: RelationIndex,
}

impl Model {
    /// Build a model with default options and no relations
    pub fn new(
        coll_name: impl Into<String>,
        doc_desc: SchemaTree,
        hooks: HookRegistry,
    ) -> Result<Self, ModelError> {
        Self::from_definition(ModelDefinition::new(coll_name, doc_desc), hooks)
    }

    /// Check the definition and bind it to `hooks`
    ///
    /// Fails on an empty collection name, a schema deeper than
    /// `maxSchemaDepth`, a `fieldPattern` that does not compile, or a hook
    /// name the registry does not know.
    pub fn from_definition(definition: ModelDefinition, hooks: HookRegistry) -> Result<Self, ModelError> {
        if definition.coll_name.trim().is_empty() {
            return Err(ModelError::MissingCollectionName);
        }
        definition
            .doc_desc
            .flatten_with_limit(definition.options.max_schema_depth)?;
        definition.doc_desc.check_patterns()?;

        let missing = hooks.missing_hooks(&definition.doc_desc);
        if !missing.is_empty() {
            return Err(ModelError::UnregisteredHooks(missing));
        }

        tracing::debug!(
            "Built model '{}' with {} top-level field(s) and {} relation(s)",
            definition.coll_name,
            definition.doc_desc.len(),
            definition.relations.len()
        );

        let relations = RelationIndex::new(definition.relations.clone());
        Ok(Self {
            definition,
            hooks,
            relations,
        })
    }

    pub fn coll_name(&self) -> &str {
        &self.definition.coll_name
    }

    pub fn doc_desc(&self) -> &SchemaTree {
        &self.definition.doc_desc
    }

    pub fn options(&self) -> &ModelOptions {
        &self.definition.options
    }

    pub fn relations(&self) -> &[RelationDescriptor] {
        self.relations.relations()
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn definition(&self) -> &ModelDefinition {
        &self.definition
    }

    pub async fn resolve_defaults(&self, record: Record) -> Result<Record, ResolutionError> {
        resolve_defaults(record, self.doc_desc(), &self.hooks).await
    }

    pub async fn validate(&self, record: &Record, task_name: &str) -> ValidateResponse {
        Validator::new(self.doc_desc(), &self.hooks)
            .with_max_depth(self.definition.options.max_schema_depth)
            .validate(record, task_name)
            .await
    }

    pub fn parent_relations(&self) -> Vec<RelationDescriptor> {
        self.relations.parents_of(self.coll_name())
    }

    pub fn child_relations(&self) -> Vec<RelationDescriptor> {
        self.relations.children_of(self.coll_name())
    }

    pub fn parent_colls(&self) -> Vec<String> {
        self.relations.parent_collection_names(self.coll_name())
    }

    pub fn child_colls(&self) -> Vec<String> {
        self.relations.child_collection_names(self.coll_name())
    }

    /// Relations of any collection known to this model
    pub fn relations_for(&self, coll_name: &str) -> CollectionRelations {
        self.relations.relations_for(coll_name)
    }

    /// Resolve and validate every record of a save batch
    ///
    /// Records are prepared concurrently and independently; one bad record
    /// does not stop the others. On failure every rejected record is
    /// reported with its index in `records`.
    pub async fn prepare_save(&self, task_name: &str, records: Vec<Record>) -> Result<Vec<Record>, SaveError> {
        if task_name.trim().is_empty() {
            return Err(SaveError::MissingTaskName);
        }
        if records.is_empty() {
            return Err(SaveError::MissingRecords);
        }

        let outcomes = join_all(
            records
                .into_iter()
                .map(|record| self.prepare_record(task_name, record)),
        )
        .await;

        let mut prepared = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(record) => prepared.push(record),
                Err(reason) => failures.push(RecordFailure { index, reason }),
            }
        }

        if failures.is_empty() {
            Ok(prepared)
        } else {
            tracing::debug!(
                "{} of {} record(s) rejected for '{}' task '{}'",
                failures.len(),
                failures.len() + prepared.len(),
                self.coll_name(),
                task_name
            );
            Err(SaveError::InvalidRecords(failures))
        }
    }

    async fn prepare_record(&self, task_name: &str, record: Record) -> Result<Record, RecordFailureReason> {
        let resolved = self
            .resolve_defaults(record)
            .await
            .map_err(RecordFailureReason::Resolution)?;

        let response = self.validate(&resolved, task_name).await;
        if response.is_valid() {
            Ok(resolved)
        } else {
            Err(RecordFailureReason::Validation(response.errors))
        }
    }

    /// Prepare a batch and hand it to the executor with the model options
    pub async fn save(
        &self,
        executor: &dyn DocumentExecutor,
        task_name: &str,
        records: Vec<Record>,
    ) -> Result<Value, SaveError> {
        let action_params = self.prepare_save(task_name, records).await?;
        let request = SaveRequest {
            coll_name: self.coll_name().to_string(),
            task_name: task_name.to_string(),
            action_params,
            options: self.definition.options.clone(),
        };

        tracing::info!(
            "Saving {} record(s) to '{}' for task '{}'",
            request.action_params.len(),
            request.coll_name,
            task_name
        );
        executor.save(request).await.map_err(|e| {
            tracing::warn!("Save to '{}' failed: {}", self.coll_name(), e);
            SaveError::from(e)
        })
    }

    pub fn delete_plan(&self) -> DeletePlan {
        DeletePlan {
            parent_colls: self.parent_colls(),
            child_colls: self.child_colls(),
            restricting: self.relations.restricting(self.coll_name()),
        }
    }

    /// Hand a delete request with this model's delete plan to the executor
    pub async fn delete(&self, executor: &dyn DocumentExecutor, query_params: Value) -> Result<Value, SaveError> {
        let request = DeleteRequest {
            coll_name: self.coll_name().to_string(),
            query_params,
            plan: self.delete_plan(),
        };

        tracing::info!(
            "Deleting from '{}' with {} restricting relation(s)",
            request.coll_name,
            request.plan.restricting.len()
        );
        executor.delete(request).await.map_err(|e| {
            tracing::warn!("Delete from '{}' failed: {}", self.coll_name(), e);
            SaveError::from(e)
        })
    }
}
