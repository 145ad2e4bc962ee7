//! Service Layer Error Types
//!
//! Errors raised while building models and preparing records. Validation
//! failures are not errors: they travel as
//! [`ValidateResponse`](crate::models::ValidateResponse) values.

use crate::behaviors::HookError;
use crate::models::{FieldErrors, SchemaError};
use thiserror::Error;

/// A default supplier or transform hook failed
///
/// Displays as the hook's own message, unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("{source}")]
    HookFailed { field: String, source: HookError },

    #[error("Hook '{hook}' for field '{field}' is not registered")]
    UnregisteredHook { field: String, hook: String },
}

impl ResolutionError {
    pub fn hook_failed(field: impl Into<String>, source: HookError) -> Self {
        Self::HookFailed {
            field: field.into(),
            source,
        }
    }

    pub fn unregistered_hook(field: impl Into<String>, hook: impl Into<String>) -> Self {
        Self::UnregisteredHook {
            field: field.into(),
            hook: hook.into(),
        }
    }

    /// Field whose hook failed
    pub fn field(&self) -> &str {
        match self {
            Self::HookFailed { field, .. } | Self::UnregisteredHook { field, .. } => field,
        }
    }
}

/// Model construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model collection name is required")]
    MissingCollectionName,

    #[error("Invalid schema: {0}")]
    InvalidSchema(#[from] SchemaError),

    #[error("Hooks referenced by the schema are not registered: {}", .0.join(", "))]
    UnregisteredHooks(Vec<String>),
}

/// Why one record of a save batch was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFailureReason {
    Resolution(ResolutionError),
    Validation(FieldErrors),
}

/// A rejected record, identified by its position in the batch
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub index: usize,
    pub reason: RecordFailureReason,
}

/// Failure reported by the external document executor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ExecutorError(pub String);

impl ExecutorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Save/delete orchestration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    #[error("taskName is required")]
    MissingTaskName,

    #[error("action-params is required to perform save operation")]
    MissingRecords,

    #[error("{} record(s) failed: {}", .0.len(), describe_failures(.0))]
    InvalidRecords(Vec<RecordFailure>),

    #[error("Executor failed: {0}")]
    Executor(#[from] ExecutorError),
}

impl SaveError {
    /// Rejected records, empty for other variants
    pub fn failures(&self) -> &[RecordFailure] {
        match self {
            Self::InvalidRecords(failures) => failures,
            _ => &[],
        }
    }
}

fn describe_failures(failures: &[RecordFailure]) -> String {
    failures
        .iter()
        .map(|failure| match &failure.reason {
            RecordFailureReason::Resolution(err) => {
                format!("record {} ({}): {}", failure.index, err.field(), err)
            }
            RecordFailureReason::Validation(errors) => format!(
                "record {} ({})",
                failure.index,
                errors.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_passes_hook_message_through() {
        let err = ResolutionError::hook_failed("password", HookError::new("hashing failed"));
        assert_eq!(err.to_string(), "hashing failed");
        assert_eq!(err.field(), "password");
    }

    #[test]
    fn test_invalid_records_message_names_records_and_fields() {
        let mut errors = FieldErrors::new();
        errors.insert("email".to_string(), "Invalid type".to_string());
        let err = SaveError::InvalidRecords(vec![
            RecordFailure {
                index: 0,
                reason: RecordFailureReason::Validation(errors),
            },
            RecordFailure {
                index: 2,
                reason: RecordFailureReason::Resolution(ResolutionError::hook_failed(
                    "password",
                    HookError::new("hashing failed"),
                )),
            },
        ]);

        assert_eq!(
            err.to_string(),
            "2 record(s) failed: record 0 (email); record 2 (password): hashing failed"
        );
        assert_eq!(err.failures().len(), 2);
    }
}
