use chrono::DateTime;
use serde_json::Value;
use thiserror::Error;

use crate::error::FieldErrors;

use super::schema::{FieldKind, FieldSpec, ResourceSchema};
use super::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    /// Full replacement: omitted optional fields are reset
    Replace,
    /// Partial update: only supplied fields are touched
    Patch,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationFailure {
    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("system field '{0}' cannot be set")]
    SystemField(String),

    #[error("payload contains no fields")]
    Empty,

    #[error("invalid fields: {0:?}")]
    Fields(FieldErrors),

    #[error("invalid query parameter '{field}': {message}")]
    Query { field: String, message: String },
}

/// Check a client payload against the schema and return the columns to write.
///
/// Every offending field is reported, not only the first. System fields are
/// rejected outright.
pub fn validate_payload(schema: &ResourceSchema, payload: &Value, mode: WriteMode) -> Result<Record, ValidationFailure> {
    let object = payload.as_object().ok_or(ValidationFailure::NotAnObject)?;

    if let Some(key) = object.keys().find(|k| schema.is_system_field(k)) {
        return Err(ValidationFailure::SystemField(key.clone()));
    }
    if mode == WriteMode::Patch && object.is_empty() {
        return Err(ValidationFailure::Empty);
    }

    let mut errors = FieldErrors::new();
    let mut record = Record::new();

    for (key, value) in object {
        let Some(spec) = schema.field_spec(key) else {
            errors.insert(key.clone(), "unknown field".to_string());
            continue;
        };
        match check_value(spec, value) {
            Ok(()) => {
                record.insert(key.clone(), value.clone());
            }
            Err(msg) => {
                errors.insert(key.clone(), msg);
            }
        }
    }

    if mode != WriteMode::Patch {
        for spec in &schema.fields {
            if object.contains_key(spec.name) {
                continue;
            }
            if let Some(default) = &spec.default {
                record.insert(spec.name.to_string(), default.clone());
            } else if spec.required {
                errors.insert(spec.name.to_string(), "This field is required".to_string());
            } else {
                record.insert(spec.name.to_string(), Value::Null);
            }
        }
    }

    if errors.is_empty() {
        Ok(record)
    } else {
        Err(ValidationFailure::Fields(errors))
    }
}

fn check_value(spec: &FieldSpec, value: &Value) -> Result<(), String> {
    if value.is_null() {
        return if spec.nullable {
            Ok(())
        } else {
            Err("must not be null".to_string())
        };
    }

    match &spec.kind {
        FieldKind::Text => {
            let s = value.as_str().ok_or("must be a string")?;
            check_length(spec, s.chars().count())
        }
        FieldKind::Integer => {
            let n = value.as_i64().ok_or("must be an integer")?;
            check_bounds(spec, n as f64)
        }
        FieldKind::Number => {
            let n = value.as_f64().ok_or("must be a number")?;
            check_bounds(spec, n)
        }
        FieldKind::Boolean => value.as_bool().map(|_| ()).ok_or_else(|| "must be a boolean".to_string()),
        FieldKind::Uuid => {
            let s = value.as_str().ok_or("must be a UUID string")?;
            uuid::Uuid::parse_str(s)
                .map(|_| ())
                .map_err(|_| format!("Invalid UUID format: {}", s))
        }
        FieldKind::Timestamp => {
            let s = value.as_str().ok_or("must be an RFC 3339 timestamp string")?;
            DateTime::parse_from_rfc3339(s)
                .map(|_| ())
                .map_err(|_| format!("Invalid timestamp format: {}", s))
        }
        FieldKind::Enum { values } => {
            let s = value.as_str().ok_or("must be a string")?;
            if values.contains(&s) {
                Ok(())
            } else {
                Err(format!("must be one of: {}", values.join(", ")))
            }
        }
        FieldKind::Tags => {
            let items = value.as_array().ok_or("must be an array of strings")?;
            for item in items {
                let s = item.as_str().ok_or("must be an array of strings")?;
                if spec.max_len.is_some_and(|max| s.chars().count() > max) {
                    return Err(format!("items must be at most {} characters", spec.max_len.unwrap_or_default()));
                }
            }
            Ok(())
        }
        FieldKind::Json => value.as_object().map(|_| ()).ok_or_else(|| "must be an object".to_string()),
    }
}

fn check_length(spec: &FieldSpec, len: usize) -> Result<(), String> {
    if let Some(min) = spec.min_len {
        if len < min {
            return Err(format!("must be at least {} characters", min));
        }
    }
    if let Some(max) = spec.max_len {
        if len > max {
            return Err(format!("must be at most {} characters", max));
        }
    }
    Ok(())
}

fn check_bounds(spec: &FieldSpec, n: f64) -> Result<(), String> {
    if let Some(min) = spec.min {
        if n < min {
            return Err(format!("must be at least {}", min));
        }
    }
    if let Some(max) = spec.max {
        if n > max {
            return Err(format!("must be at most {}", max));
        }
    }
    Ok(())
}
