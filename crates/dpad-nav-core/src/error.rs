//! Configuration errors with structured context.
//!
//! These are the only errors the navigation layer surfaces to its caller;
//! every page-interaction failure is absorbed where it happens.

use dpad_nav_common::error_codes::{self, ErrorCategory};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid type for '{field}': expected {expected}, got {actual}")]
    InvalidType {
        field: String,
        expected: &'static str,
        actual: String,
    },
    #[error("Invalid value for '{field}': {value} (allowed: {allowed})")]
    InvalidValue {
        field: String,
        value: String,
        allowed: String,
    },
    #[error("Unknown configuration field '{field}'")]
    UnknownField { field: String },
    #[error("Configuration must be an object, got {actual}")]
    NotAnObject { actual: String },
}

impl ConfigError {
    pub fn code(&self) -> i32 {
        match self {
            ConfigError::InvalidType { .. } => error_codes::CONFIG_INVALID_TYPE,
            ConfigError::InvalidValue { .. } => error_codes::CONFIG_INVALID_VALUE,
            ConfigError::UnknownField { .. } => error_codes::CONFIG_UNKNOWN_FIELD,
            ConfigError::NotAnObject { .. } => error_codes::CONFIG_NOT_AN_OBJECT,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }

    /// Name of the offending field, when the error concerns a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidType { field, .. }
            | ConfigError::InvalidValue { field, .. }
            | ConfigError::UnknownField { field } => Some(field),
            ConfigError::NotAnObject { .. } => None,
        }
    }

    pub fn context(&self) -> Value {
        match self {
            ConfigError::InvalidType {
                field,
                expected,
                actual,
            } => json!({ "field": field, "expected": expected, "actual": actual }),
            ConfigError::InvalidValue {
                field,
                value,
                allowed,
            } => json!({ "field": field, "value": value, "allowed": allowed }),
            ConfigError::UnknownField { field } => json!({ "field": field }),
            ConfigError::NotAnObject { actual } => json!({ "actual": actual }),
        }
    }

    pub fn suggestion(&self) -> String {
        match self {
            ConfigError::InvalidType { field, expected, .. } => {
                format!("Pass a {} for '{}'.", expected, field)
            }
            ConfigError::InvalidValue { field, allowed, .. } => {
                format!("Use one of: {} for '{}'.", allowed, field)
            }
            ConfigError::UnknownField { .. } => {
                "Check the field name; configuration keys are camelCase (e.g. coneAngleDegrees)."
                    .to_string()
            }
            ConfigError::NotAnObject { .. } => {
                "Pass a JSON object containing only the fields to change.".to_string()
            }
        }
    }
}

/// Human-readable JSON type name used in `InvalidType` errors.
pub(crate) fn json_type_name(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}
