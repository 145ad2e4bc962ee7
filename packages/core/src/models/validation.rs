//! Validation Results
//!
//! Validation failures are data, not errors: a [`ValidateResponse`] carries a
//! field-keyed message map so callers can aggregate results over a batch of
//! records. A single field can carry several messages at once; each rule
//! other than the type check adds its own key suffix.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field key → message
pub type FieldErrors = BTreeMap<String, String>;

/// The rule a field value violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// Key absent from the (flattened) schema
    UnknownField,
    Type,
    Null,
    Length,
    Pattern,
    MinMax,
    Custom,
}

impl ViolationKind {
    /// Suffix appended to the field name in the error map
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::UnknownField | Self::Type => "",
            Self::Null => "-nullValidation",
            Self::Length => "-lengthValidation",
            Self::Pattern => "-patternValidation",
            Self::MinMax => "-minMaxValidation",
            Self::Custom => "-customValidation",
        }
    }
}

/// One rule violation for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    /// Key under which this violation is reported
    pub fn key(&self) -> String {
        format!("{}{}", self.field, self.kind.suffix())
    }
}

/// Outcome of validating one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub ok: bool,
    #[serde(default)]
    pub errors: FieldErrors,
}

impl ValidateResponse {
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: FieldErrors::new(),
        }
    }

    pub fn failure(errors: FieldErrors) -> Self {
        Self { ok: false, errors }
    }

    pub fn from_violations(violations: Vec<FieldViolation>) -> Self {
        if violations.is_empty() {
            return Self::success();
        }
        let errors = violations.into_iter().map(|v| (v.key(), v.message)).collect();
        Self::failure(errors)
    }

    /// Passed: `ok` is set and no error was reported
    pub fn is_valid(&self) -> bool {
        self.ok && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_keys() {
        let null = FieldViolation::new("age", ViolationKind::Null, "Value is required for: age");
        let range = FieldViolation::new("age", ViolationKind::MinMax, "too small");
        let unknown = FieldViolation::new("nickname", ViolationKind::UnknownField, "x");

        assert_eq!(null.key(), "age-nullValidation");
        assert_eq!(range.key(), "age-minMaxValidation");
        assert_eq!(unknown.key(), "nickname");
    }

    #[test]
    fn test_from_violations_keeps_multiple_errors_per_field() {
        let response = ValidateResponse::from_violations(vec![
            FieldViolation::new("code", ViolationKind::Length, "too long"),
            FieldViolation::new("code", ViolationKind::Pattern, "bad format"),
        ]);

        assert!(!response.is_valid());
        assert_eq!(response.errors.len(), 2);
        assert!(ValidateResponse::from_violations(Vec::new()).is_valid());
    }

    #[test]
    fn test_reported_failure_without_errors_is_invalid() {
        let response = ValidateResponse {
            ok: false,
            errors: FieldErrors::new(),
        };
        assert!(!response.is_valid());
    }
}
