//! Default & Transform Resolver
//!
//! Fills absent fields from their declared defaults and runs `setValue`
//! transforms, producing the record that is handed to validation.
//!
//! Every hook of one call sees the same snapshot: the input record as it was
//! before resolution started (a transform additionally sees its own field's
//! freshly applied default). Fields are therefore independent and are
//! resolved concurrently; the results are written back only once every field
//! has finished. The first failing hook fails the whole call and the other
//! results are discarded.
//!
//! Nested fields are resolved only inside sub-records that are present as
//! objects. An absent or null sub-record is first created empty when its
//! sub-schema (at any depth) holds a required field with a default, so the
//! default can satisfy the requirement. Sub-records without such a field stay
//! absent.
//!
//! Defaults are not type-checked here. A supplier may return any shape and
//! the validator accepts or rejects it later.

use crate::behaviors::HookRegistry;
use crate::models::record::{get_path, set_path};
use crate::models::{is_missing, DefaultValue, FieldDescriptor, Record, SchemaNode, SchemaTree};
use crate::services::ResolutionError;
use futures::future::try_join_all;
use serde_json::Value;

/// A field descriptor together with its key path in the record
struct PendingField<'a> {
    path: Vec<String>,
    desc: &'a FieldDescriptor,
}

/// Resolve defaults and transforms for one record
pub async fn resolve_defaults(
    record: Record,
    schema: &SchemaTree,
    hooks: &HookRegistry,
) -> Result<Record, ResolutionError> {
    let mut record = record;
    create_sub_records(schema, &mut record);

    let mut pending = Vec::new();
    collect_fields(schema, &record, &mut Vec::new(), &mut pending);

    let updates = try_join_all(
        pending
            .iter()
            .map(|field| resolve_field(field, &record, hooks)),
    )
    .await?;

    for (field, update) in pending.iter().zip(updates) {
        if let Some(value) = update {
            set_path(&mut record, &field.path, value);
        }
    }
    Ok(record)
}

/// Insert empty objects for missing sub-records that own a required default
fn create_sub_records(tree: &SchemaTree, record: &mut Record) {
    for (name, node) in tree.iter() {
        let SchemaNode::Nested(sub) = node else {
            continue;
        };
        if is_missing(record.get(name)) && has_required_default(sub) {
            tracing::debug!("Created sub-record '{}' for its required defaults", name);
            record.insert(name.clone(), Value::Object(Record::new()));
        }
        if let Some(Value::Object(inner)) = record.get_mut(name) {
            create_sub_records(sub, inner);
        }
    }
}

fn has_required_default(tree: &SchemaTree) -> bool {
    tree.iter().any(|(_, node)| match node {
        SchemaNode::Field(desc) => !desc.allow_null && desc.default_value.is_some(),
        SchemaNode::Nested(sub) => has_required_default(sub),
        SchemaNode::Primitive(_) => false,
    })
}

/// Gather field descriptors, descending into nested sub-schemas only where
/// the record holds an object
fn collect_fields<'a>(
    tree: &'a SchemaTree,
    record: &Record,
    prefix: &mut Vec<String>,
    out: &mut Vec<PendingField<'a>>,
) {
    for (name, node) in tree.iter() {
        match node {
            SchemaNode::Field(desc) if desc.default_value.is_some() || desc.set_value.is_some() => {
                let mut path = prefix.clone();
                path.push(name.clone());
                out.push(PendingField { path, desc });
            }
            SchemaNode::Nested(sub) => {
                if let Some(Value::Object(inner)) = record.get(name) {
                    prefix.push(name.clone());
                    collect_fields(sub, inner, prefix, out);
                    prefix.pop();
                }
            }
            _ => {}
        }
    }
}

/// New value for one field, or `None` when it stays untouched
async fn resolve_field(
    field: &PendingField<'_>,
    snapshot: &Record,
    hooks: &HookRegistry,
) -> Result<Option<Value>, ResolutionError> {
    let name = field.path.join(".");
    let current = get_path(snapshot, &field.path);

    let mut resolved = None;
    if is_missing(current) {
        resolved = match &field.desc.default_value {
            Some(DefaultValue::Static(value)) => Some(value.clone()),
            Some(DefaultValue::Supplier(hook)) => {
                let supplier = hooks
                    .supplier(hook)
                    .ok_or_else(|| ResolutionError::unregistered_hook(&name, hook))?;
                let value = supplier.supply(snapshot).await.map_err(|e| {
                    tracing::warn!("Default supplier '{}' failed for field '{}': {}", hook, name, e);
                    ResolutionError::hook_failed(&name, e)
                })?;
                Some(value)
            }
            None => None,
        };
        if resolved.is_some() {
            tracing::debug!("Applied default for field '{}'", name);
        }
    }

    let Some(hook) = &field.desc.set_value else {
        return Ok(resolved);
    };
    let has_value = resolved.as_ref().or(current).is_some_and(|v| !v.is_null());
    if !has_value {
        return Ok(resolved);
    }

    let transform = hooks
        .transform(hook)
        .ok_or_else(|| ResolutionError::unregistered_hook(&name, hook))?;
    let transformed = match &resolved {
        Some(value) => {
            let mut input = snapshot.clone();
            set_path(&mut input, &field.path, value.clone());
            transform.transform(&input).await
        }
        None => transform.transform(snapshot).await,
    }
    .map_err(|e| {
        tracing::warn!("Transform '{}' failed for field '{}': {}", hook, name, e);
        ResolutionError::hook_failed(&name, e)
    })?;

    tracing::debug!("Transformed field '{}' with '{}'", name, hook);
    Ok(Some(transformed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::HookError;
    use crate::models::DataType;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn user_schema() -> SchemaTree {
        SchemaTree::new()
            .primitive("email", DataType::Email)
            .field(
                "fullName",
                FieldDescriptor::new(DataType::String).default_supplier("fullName"),
            )
            .field(
                "isAdmin",
                FieldDescriptor::new(DataType::Boolean).default_static(json!(false)),
            )
            .field(
                "password",
                FieldDescriptor::new(DataType::String).set_value("hashPassword"),
            )
            .nested(
                "profile",
                SchemaTree::new().field(
                    "language",
                    FieldDescriptor::new(DataType::String).default_static(json!("en-US")),
                ),
            )
    }

    fn user_hooks() -> HookRegistry {
        HookRegistry::new()
            .with_supplier("fullName", |record: Record| async move {
                let first = record.get("firstName").and_then(Value::as_str).unwrap_or("Guest");
                Ok::<Value, HookError>(json!(format!("{} User", first)))
            })
            .with_transform("hashPassword", |record: Record| async move {
                let password = record.get("password").and_then(Value::as_str).unwrap_or_default();
                Ok::<Value, HookError>(json!(format!("hashed:{}", password)))
            })
    }

    #[tokio::test]
    async fn test_static_and_supplied_defaults() {
        let input = record(json!({ "email": "abbeya1@yahoo.com", "isAdmin": null }));
        let resolved = resolve_defaults(input, &user_schema(), &user_hooks()).await.unwrap();

        assert_eq!(resolved["isAdmin"], json!(false));
        assert_eq!(resolved["fullName"], json!("Guest User"));
        assert!(!resolved.contains_key("password"));
        assert!(!resolved.contains_key("profile"));
    }

    #[tokio::test]
    async fn test_present_values_are_kept() {
        let input = record(json!({ "isAdmin": true, "fullName": "Abi M" }));
        let resolved = resolve_defaults(input, &user_schema(), &user_hooks()).await.unwrap();

        assert_eq!(resolved["isAdmin"], json!(true));
        assert_eq!(resolved["fullName"], json!("Abi M"));
    }

    #[tokio::test]
    async fn test_transform_rewrites_non_null_value() {
        let input = record(json!({ "password": "secret", "isAdmin": true, "fullName": "x" }));
        let resolved = resolve_defaults(input, &user_schema(), &user_hooks()).await.unwrap();
        assert_eq!(resolved["password"], json!("hashed:secret"));

        let input = record(json!({ "password": null, "isAdmin": true, "fullName": "x" }));
        let resolved = resolve_defaults(input, &user_schema(), &user_hooks()).await.unwrap();
        assert_eq!(resolved["password"], Value::Null);
    }

    #[tokio::test]
    async fn test_transform_sees_applied_default() {
        let schema = SchemaTree::new().field(
            "code",
            FieldDescriptor::new(DataType::String)
                .default_static(json!("abc"))
                .set_value("upper"),
        );
        let hooks = HookRegistry::new().with_transform("upper", |record: Record| async move {
            let code = record.get("code").and_then(Value::as_str).unwrap_or_default();
            Ok::<Value, HookError>(json!(code.to_uppercase()))
        });

        let resolved = resolve_defaults(Record::new(), &schema, &hooks).await.unwrap();
        assert_eq!(resolved["code"], json!("ABC"));
    }

    #[tokio::test]
    async fn test_cross_field_supplier_reads_whole_record() {
        let input = record(json!({ "firstName": "Abi" }));
        let schema = user_schema().primitive("firstName", DataType::String);
        let resolved = resolve_defaults(input, &schema, &user_hooks()).await.unwrap();

        assert_eq!(resolved["fullName"], json!("Abi User"));
    }

    #[tokio::test]
    async fn test_nested_defaults_only_for_present_sub_records() {
        let input = record(json!({ "profile": {} }));
        let resolved = resolve_defaults(input, &user_schema(), &user_hooks()).await.unwrap();
        assert_eq!(resolved["profile"], json!({ "language": "en-US" }));

        let input = record(json!({ "profile": "n/a" }));
        let resolved = resolve_defaults(input, &user_schema(), &user_hooks()).await.unwrap();
        assert_eq!(resolved["profile"], json!("n/a"));
    }

    #[tokio::test]
    async fn test_required_nested_default_creates_sub_record() {
        let schema = SchemaTree::new().nested(
            "profile",
            SchemaTree::new()
                .primitive("nickname", DataType::String)
                .nested(
                    "settings",
                    SchemaTree::new().field(
                        "language",
                        FieldDescriptor::new(DataType::String)
                            .required()
                            .default_static(json!("en-US")),
                    ),
                ),
        );
        let hooks = HookRegistry::new();

        for input in [json!({}), json!({ "profile": null })] {
            let resolved = resolve_defaults(record(input), &schema, &hooks).await.unwrap();
            assert_eq!(
                Value::Object(resolved.clone()),
                json!({ "profile": { "settings": { "language": "en-US" } } })
            );

            let response = crate::services::validate_record(&resolved, &schema, &hooks, "t").await;
            assert!(response.is_valid(), "{:?}", response.errors);
        }

        // present values and non-object sub-records are left alone
        let input = record(json!({ "profile": { "settings": { "language": "fr-FR" } } }));
        let resolved = resolve_defaults(input.clone(), &schema, &hooks).await.unwrap();
        assert_eq!(resolved, input);

        let input = record(json!({ "profile": "n/a" }));
        let resolved = resolve_defaults(input, &schema, &hooks).await.unwrap();
        assert_eq!(resolved["profile"], json!("n/a"));
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent_without_transforms() {
        let schema = SchemaTree::new()
            .field("isAdmin", FieldDescriptor::new(DataType::Boolean).default_static(json!(false)))
            .field("fullName", FieldDescriptor::new(DataType::String).default_supplier("fullName"));
        let input = record(json!({ "isAdmin": true, "fullName": "Abi M", "extra": [1, 2] }));

        let once = resolve_defaults(input.clone(), &schema, &user_hooks()).await.unwrap();
        let twice = resolve_defaults(once.clone(), &schema, &user_hooks()).await.unwrap();

        assert_eq!(once, input);
        assert_eq!(
            serde_json::to_string(&twice).unwrap(),
            serde_json::to_string(&input).unwrap()
        );
    }

    #[tokio::test]
    async fn test_hook_failure_message_passes_through() {
        let hooks = user_hooks().with_transform("hashPassword", |_record: Record| async move {
            Err::<Value, HookError>(HookError::new("bcrypt unavailable"))
        });
        let input = record(json!({ "password": "secret" }));

        let err = resolve_defaults(input, &user_schema(), &hooks).await.unwrap_err();
        assert_eq!(err.to_string(), "bcrypt unavailable");
        assert_eq!(err.field(), "password");
    }

    #[tokio::test]
    async fn test_unregistered_hook_fails() {
        let input = record(json!({ "isAdmin": true }));
        let err = resolve_defaults(input, &user_schema(), &HookRegistry::new())
            .await
            .unwrap_err();
        assert_eq!(err, ResolutionError::unregistered_hook("fullName", "fullName"));
    }

    #[tokio::test]
    async fn test_supplier_called_once_per_missing_field() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let hooks = HookRegistry::new().with_supplier("count", move |_record: Record| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<Value, HookError>(json!(1))
            }
        });
        let schema = SchemaTree::new()
            .field("a", FieldDescriptor::new(DataType::Integer).default_supplier("count"))
            .field("b", FieldDescriptor::new(DataType::Integer).default_supplier("count"))
            .field("c", FieldDescriptor::new(DataType::Integer).default_supplier("count"));

        let resolved = resolve_defaults(record(json!({ "c": 3 })), &schema, &hooks).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolved["c"], json!(3));
    }
}
