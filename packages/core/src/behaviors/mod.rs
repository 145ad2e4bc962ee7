//! Hook Behaviors
//!
//! Caller-supplied callables that customize how records are prepared and
//! validated:
//!
//! - [`DefaultSupplier`] - computes a value for an absent field
//! - [`ValueTransform`] - rewrites a non-null field value before save
//! - [`FieldPredicate`] - accepts or rejects a field value
//! - [`TaskValidator`] - model-level validation for a named task
//!
//! Every hook receives the whole value-record and may suspend (I/O, hashing,
//! lookups). Schemas reference hooks by name; a [`HookRegistry`] binds those
//! names to implementations when the model is built.
//!
//! Any `Fn(Record) -> impl Future` closure with the matching output type
//! implements the corresponding trait:
//!
//! ```
//! use docmodel_core::behaviors::{HookError, HookRegistry};
//! use docmodel_core::models::Record;
//! use serde_json::{json, Value};
//!
//! let hooks = HookRegistry::new()
//!     .with_supplier("now", |_record: Record| async move {
//!         Ok::<Value, HookError>(json!(chrono::Utc::now().to_rfc3339()))
//!     });
//! assert!(hooks.supplier("now").is_some());
//! ```

use crate::models::{Record, SchemaTree, ValidateResponse};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Failure raised by a hook; the message is reported verbatim
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

#[async_trait]
pub trait DefaultSupplier: Send + Sync {
    async fn supply(&self, record: &Record) -> Result<Value, HookError>;
}

#[async_trait]
pub trait ValueTransform: Send + Sync {
    async fn transform(&self, record: &Record) -> Result<Value, HookError>;
}

#[async_trait]
pub trait FieldPredicate: Send + Sync {
    async fn check(&self, record: &Record) -> bool;
}

#[async_trait]
pub trait TaskValidator: Send + Sync {
    async fn validate(&self, record: &Record) -> ValidateResponse;
}

#[async_trait]
impl<F, Fut> DefaultSupplier for F
where
    F: Fn(Record) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HookError>> + Send + 'static,
{
    async fn supply(&self, record: &Record) -> Result<Value, HookError> {
        (self)(record.clone()).await
    }
}

#[async_trait]
impl<F, Fut> ValueTransform for F
where
    F: Fn(Record) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HookError>> + Send + 'static,
{
    async fn transform(&self, record: &Record) -> Result<Value, HookError> {
        (self)(record.clone()).await
    }
}

#[async_trait]
impl<F, Fut> FieldPredicate for F
where
    F: Fn(Record) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    async fn check(&self, record: &Record) -> bool {
        (self)(record.clone()).await
    }
}

#[async_trait]
impl<F, Fut> TaskValidator for F
where
    F: Fn(Record) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ValidateResponse> + Send + 'static,
{
    async fn validate(&self, record: &Record) -> ValidateResponse {
        (self)(record.clone()).await
    }
}

/// Hook name → implementation, plus task name → task validator
#[derive(Clone, Default)]
pub struct HookRegistry {
    suppliers: HashMap<String, Arc<dyn DefaultSupplier>>,
    transforms: HashMap<String, Arc<dyn ValueTransform>>,
    predicates: HashMap<String, Arc<dyn FieldPredicate>>,
    task_validators: HashMap<String, Arc<dyn TaskValidator>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_supplier(mut self, name: impl Into<String>, hook: impl DefaultSupplier + 'static) -> Self {
        self.suppliers.insert(name.into(), Arc::new(hook));
        self
    }

    pub fn with_transform(mut self, name: impl Into<String>, hook: impl ValueTransform + 'static) -> Self {
        self.transforms.insert(name.into(), Arc::new(hook));
        self
    }

    pub fn with_predicate(mut self, name: impl Into<String>, hook: impl FieldPredicate + 'static) -> Self {
        self.predicates.insert(name.into(), Arc::new(hook));
        self
    }

    pub fn with_task_validator(
        mut self,
        task_name: impl Into<String>,
        hook: impl TaskValidator + 'static,
    ) -> Self {
        self.task_validators.insert(task_name.into(), Arc::new(hook));
        self
    }

    pub fn supplier(&self, name: &str) -> Option<Arc<dyn DefaultSupplier>> {
        self.suppliers.get(name).cloned()
    }

    pub fn transform(&self, name: &str) -> Option<Arc<dyn ValueTransform>> {
        self.transforms.get(name).cloned()
    }

    pub fn predicate(&self, name: &str) -> Option<Arc<dyn FieldPredicate>> {
        self.predicates.get(name).cloned()
    }

    pub fn task_validator(&self, task_name: &str) -> Option<Arc<dyn TaskValidator>> {
        self.task_validators.get(task_name).cloned()
    }

    /// Hook names referenced by `schema` that have no registered implementation
    ///
    /// Entries are `"<field>.<hook>"` pairs, sorted.
    pub fn missing_hooks(&self, schema: &SchemaTree) -> Vec<String> {
        use crate::models::DefaultValue;

        let mut missing = Vec::new();
        for (field, desc) in schema.descriptors() {
            if let Some(DefaultValue::Supplier(name)) = &desc.default_value {
                if !self.suppliers.contains_key(name) {
                    missing.push(format!("{}.{}", field, name));
                }
            }
            if let Some(name) = &desc.set_value {
                if !self.transforms.contains_key(name) {
                    missing.push(format!("{}.{}", field, name));
                }
            }
            if let Some(name) = &desc.validate {
                if !self.predicates.contains_key(name) {
                    missing.push(format!("{}.{}", field, name));
                }
            }
        }
        missing.sort();
        missing
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("suppliers", &sorted_keys(&self.suppliers))
            .field("transforms", &sorted_keys(&self.transforms))
            .field("predicates", &sorted_keys(&self.predicates))
            .field("task_validators", &sorted_keys(&self.task_validators))
            .finish()
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&String> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataType, FieldDescriptor};
    use serde_json::json;

    #[tokio::test]
    async fn test_closure_hooks() {
        let hooks = HookRegistry::new()
            .with_supplier("zero", |_record: Record| async move { Ok::<Value, HookError>(json!(0)) })
            .with_transform("upper", |record: Record| async move {
                let name = record.get("name").and_then(Value::as_str).unwrap_or_default();
                Ok::<Value, HookError>(json!(name.to_uppercase()))
            })
            .with_predicate("hasName", |record: Record| async move { record.contains_key("name") });

        let mut record = Record::new();
        record.insert("name".to_string(), json!("abi"));

        let supplier = hooks.supplier("zero").unwrap();
        assert_eq!(supplier.supply(&record).await.unwrap(), json!(0));

        let transform = hooks.transform("upper").unwrap();
        assert_eq!(transform.transform(&record).await.unwrap(), json!("ABI"));

        let predicate = hooks.predicate("hasName").unwrap();
        assert!(predicate.check(&record).await);
        assert!(hooks.task_validator("user").is_none());
    }

    #[test]
    fn test_hook_error_message_is_verbatim() {
        let err = HookError::new("hash service unavailable");
        assert_eq!(err.to_string(), "hash service unavailable");
    }

    #[test]
    fn test_missing_hooks() {
        let schema = SchemaTree::new()
            .field("password", FieldDescriptor::new(DataType::String).set_value("hashPassword"))
            .nested(
                "profile",
                SchemaTree::new().field(
                    "createdAt",
                    FieldDescriptor::new(DataType::DateTime).default_supplier("now"),
                ),
            );

        let hooks = HookRegistry::new()
            .with_supplier("now", |_record: Record| async move { Ok::<Value, HookError>(json!("2024-01-01")) });

        assert_eq!(hooks.missing_hooks(&schema), vec!["password.hashPassword".to_string()]);
    }
}
