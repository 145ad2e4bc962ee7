//! Validation Engine
//!
//! Validates a resolved value-record against a schema tree in two stages.
//!
//! ## Stage 1: field checks
//!
//! Every key of the (flattened) record is checked against the flattened
//! schema. All rules of a field are evaluated and every violation is kept,
//! each under its own suffixed key:
//!
//! | rule                         | key                        |
//! |------------------------------|----------------------------|
//! | unknown field, type mismatch | `field`                    |
//! | required value missing       | `field-nullValidation`     |
//! | string longer than length    | `field-lengthValidation`   |
//! | regex pattern not matched    | `field-patternValidation`  |
//! | outside min/max bounds       | `field-minMaxValidation`   |
//! | predicate hook rejected      | `field-customValidation`   |
//!
//! Bounds are inclusive. On numbers they bound the value, on strings the
//! character count.
//!
//! ## Stage 2: task validator
//!
//! Only when Stage 1 found nothing, the task validator registered for the
//! task name (if any) runs on the record and its response is returned as-is.

use crate::behaviors::HookRegistry;
use crate::models::{
    flatten_record, DataType, FieldDescriptor, FieldErrors, FieldRule, FieldViolation, Record,
    SchemaError, SchemaTree, ValidateResponse, ViolationKind, DEFAULT_MAX_SCHEMA_DEPTH,
};
use crate::services::type_inference::{infer_type, type_matches};
use regex::Regex;
use serde_json::Value;

/// Validates records against one schema
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    schema: &'a SchemaTree,
    hooks: &'a HookRegistry,
    max_depth: usize,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a SchemaTree, hooks: &'a HookRegistry) -> Self {
        Self {
            schema,
            hooks,
            max_depth: DEFAULT_MAX_SCHEMA_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Run both stages
    pub async fn validate(&self, record: &Record, task_name: &str) -> ValidateResponse {
        let violations = match self.check_fields(record).await {
            Ok(violations) => violations,
            Err(e) => {
                tracing::warn!("Cannot validate against schema: {}", e);
                let mut errors = FieldErrors::new();
                errors.insert("schema".to_string(), e.to_string());
                return ValidateResponse::failure(errors);
            }
        };

        if !violations.is_empty() {
            tracing::debug!(
                "Record failed field validation for task '{}' with {} error(s)",
                task_name,
                violations.len()
            );
            return ValidateResponse::from_violations(violations);
        }

        match self.hooks.task_validator(task_name) {
            Some(validator) => {
                let response = validator.validate(record).await;
                if response.is_valid() {
                    ValidateResponse::success()
                } else {
                    tracing::debug!("Task validator '{}' rejected the record", task_name);
                    response
                }
            }
            None => ValidateResponse::success(),
        }
    }

    /// Stage 1 only: every rule violation of every field
    pub async fn check_fields(&self, record: &Record) -> Result<Vec<FieldViolation>, SchemaError> {
        let flat_schema = self.schema.flatten_with_limit(self.max_depth)?;
        let flat_record = flatten_record(record, self.schema);
        let mut violations = Vec::new();

        for (key, value) in &flat_record {
            match flat_schema.get(key) {
                Some(FieldRule::Primitive(data_type)) => {
                    if !value.is_null() && !type_matches(*data_type, value) {
                        violations.push(type_violation(key, *data_type, value));
                    }
                }
                Some(FieldRule::Field(desc)) => {
                    let found = self.check_field(key, desc, value, record).await;
                    violations.extend(override_messages(found, desc));
                }
                // a sub-record name seen where its schema does not place it
                None if flat_schema.is_nested(key) && value.is_object() => {
                    violations.push(unknown_field_violation(key));
                }
                None if flat_schema.is_nested(key) => {
                    if !value.is_null() {
                        violations.push(type_violation(key, DataType::Object, value));
                    }
                }
                None => violations.push(unknown_field_violation(key)),
            }
        }

        for (name, rule) in flat_schema.iter() {
            if let FieldRule::Field(desc) = rule {
                if !desc.allow_null && !flat_record.contains_key(name) {
                    violations.push(override_message(null_violation(name), desc));
                }
            }
        }
        Ok(violations)
    }

    async fn check_field(
        &self,
        key: &str,
        desc: &FieldDescriptor,
        value: &Value,
        record: &Record,
    ) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        if value.is_null() {
            if !desc.allow_null {
                violations.push(null_violation(key));
            }
            return violations;
        }

        if !type_matches(desc.field_type, value) {
            violations.push(type_violation(key, desc.field_type, value));
        }

        match value {
            Value::String(text) => {
                let length = text.chars().count();
                if let Some(max_length) = desc.field_length {
                    if length > max_length {
                        violations.push(FieldViolation::new(
                            key,
                            ViolationKind::Length,
                            format!("Size of {} cannot be longer than {}", key, max_length),
                        ));
                    }
                }
                if let Some(pattern) = &desc.field_pattern {
                    if let Some(violation) = pattern_violation(key, pattern, text) {
                        violations.push(violation);
                    }
                }
                if let Some(message) = range_message(key, "Length of", length as f64, desc) {
                    violations.push(FieldViolation::new(key, ViolationKind::MinMax, message));
                }
            }
            Value::Number(number) => {
                if let Some(message) = number
                    .as_f64()
                    .and_then(|n| range_message(key, "Value of", n, desc))
                {
                    violations.push(FieldViolation::new(key, ViolationKind::MinMax, message));
                }
            }
            _ => {}
        }

        if let Some(hook) = &desc.validate {
            let accepted = match self.hooks.predicate(hook) {
                Some(predicate) => predicate.check(record).await,
                None => {
                    tracing::warn!("Predicate '{}' for field '{}' is not registered", hook, key);
                    false
                }
            };
            if !accepted {
                violations.push(FieldViolation::new(
                    key,
                    ViolationKind::Custom,
                    format!("Invalid value for: {}", key),
                ));
            }
        }

        violations
    }
}

/// Validate one record with the default depth limit
pub async fn validate_record(
    record: &Record,
    schema: &SchemaTree,
    hooks: &HookRegistry,
    task_name: &str,
) -> ValidateResponse {
    Validator::new(schema, hooks).validate(record, task_name).await
}

fn unknown_field_violation(key: &str) -> FieldViolation {
    FieldViolation::new(
        key,
        ViolationKind::UnknownField,
        format!("{} is not defined in the model", key),
    )
}

fn type_violation(key: &str, expected: DataType, value: &Value) -> FieldViolation {
    FieldViolation::new(
        key,
        ViolationKind::Type,
        format!(
            "Invalid type for: {}. Expected {}, got {}",
            key,
            expected,
            infer_type(value)
        ),
    )
}

fn null_violation(key: &str) -> FieldViolation {
    FieldViolation::new(key, ViolationKind::Null, format!("Value is required for: {}", key))
}

fn pattern_violation(key: &str, pattern: &str, text: &str) -> Option<FieldViolation> {
    match Regex::new(pattern) {
        Ok(re) if re.is_match(text) => None,
        Ok(_) => Some(FieldViolation::new(
            key,
            ViolationKind::Pattern,
            format!("Invalid format for: {}", key),
        )),
        Err(e) => Some(FieldViolation::new(
            key,
            ViolationKind::Pattern,
            format!("Invalid pattern for: {}: {}", key, e),
        )),
    }
}

/// Bounds check; a min/max pair is reported as one band violation
fn range_message(key: &str, subject: &str, measure: f64, desc: &FieldDescriptor) -> Option<String> {
    match (desc.min_value, desc.max_value) {
        (Some(min), Some(max)) if measure < min || measure > max => Some(format!(
            "{} {} must be between {} and {}",
            subject, key, min, max
        )),
        (Some(min), None) if measure < min => {
            Some(format!("{} {} cannot be less than {}", subject, key, min))
        }
        (None, Some(max)) if measure > max => {
            Some(format!("{} {} cannot be greater than {}", subject, key, max))
        }
        _ => None,
    }
}

fn override_message(mut violation: FieldViolation, desc: &FieldDescriptor) -> FieldViolation {
    if let Some(message) = &desc.validate_message {
        violation.message = message.clone();
    }
    violation
}

fn override_messages(violations: Vec<FieldViolation>, desc: &FieldDescriptor) -> Vec<FieldViolation> {
    violations
        .into_iter()
        .map(|violation| override_message(violation, desc))
        .collect()
}
