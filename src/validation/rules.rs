//! Shared building blocks for the per-entity validators.
//!
//! Validators accumulate one message per field path instead of failing on the
//! first problem, and they apply coercions to a working copy of the payload.
//! The working copy is only returned when no error was recorded, so a
//! rejected payload is never half-coerced.

use crate::error::FieldErrors;
use serde_json::{Map, Value};

/// Accumulates field-path keyed messages during a validation pass.
#[derive(Debug, Default)]
pub(crate) struct Errors {
    inner: FieldErrors,
}

impl Errors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.inner.entry(path.into()).or_insert_with(|| message.into());
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Resolve the pass: the coerced payload on success, the collected
    /// messages otherwise.
    pub(crate) fn into_result(self, record: Map<String, Value>) -> Result<Value, FieldErrors> {
        if self.inner.is_empty() {
            Ok(Value::Object(record))
        } else {
            Err(self.inner)
        }
    }
}

/// Clone the payload into a mutable object map, or reject non-object input.
pub(crate) fn object_payload(payload: &Value) -> Result<Map<String, Value>, FieldErrors> {
    match payload {
        Value::Object(map) => Ok(map.clone()),
        _ => {
            let mut errors = FieldErrors::new();
            errors.insert("payload".to_string(), "must be a JSON object".to_string());
            Err(errors)
        }
    }
}

/// True when the field is present with a meaningful value. JSON `null` counts
/// as absent, matching how form layers submit cleared inputs.
pub(crate) fn is_present(record: &Map<String, Value>, field: &str) -> bool {
    matches!(record.get(field), Some(value) if !value.is_null())
}

pub(crate) fn require_present(
    record: &Map<String, Value>,
    field: &str,
    message: &str,
    errors: &mut Errors,
) {
    if !is_present(record, field) {
        errors.add(field, message);
    }
}

/// Require a present, non-whitespace string. Absent fields are left to
/// [`require_present`] so update payloads can omit them.
pub(crate) fn reject_blank(record: &Map<String, Value>, field: &str, message: &str, errors: &mut Errors) {
    if let Some(Value::String(text)) = record.get(field) {
        if text.trim().is_empty() {
            errors.add(field, message);
        }
    }
}

pub(crate) fn check_max_len(
    record: &Map<String, Value>,
    field: &str,
    max: usize,
    errors: &mut Errors,
) {
    if let Some(Value::String(text)) = record.get(field) {
        if text.chars().count() > max {
            errors.add(field, format!("must be at most {max} characters"));
        }
    }
}

pub(crate) fn check_enum(
    record: &Map<String, Value>,
    field: &str,
    allowed: &[&str],
    errors: &mut Errors,
) {
    if let Some(Value::String(text)) = record.get(field) {
        if !allowed.contains(&text.as_str()) {
            errors.add(field, format!("must be one of: {}", allowed.join(", ")));
        }
    } else if let Some(value) = record.get(field) {
        if !value.is_null() {
            errors.add(field, format!("must be one of: {}", allowed.join(", ")));
        }
    }
}

/// Coerce a string-typed field to a JSON number in the working copy.
/// Numbers pass through; anything else present and non-null is an error.
pub(crate) fn coerce_number(record: &mut Map<String, Value>, field: &str, errors: &mut Errors) {
    let Some(value) = record.get(field) else {
        return;
    };
    match value {
        Value::Null | Value::Number(_) => {}
        Value::String(text) => {
            if let Ok(int) = text.trim().parse::<i64>() {
                record.insert(field.to_string(), Value::from(int));
            } else if let Ok(float) = text.trim().parse::<f64>() {
                record.insert(field.to_string(), Value::from(float));
            } else {
                errors.add(field, "must be a number");
            }
        }
        _ => errors.add(field, "must be a number"),
    }
}

/// Coerce a `"true"`/`"false"` string field to a JSON boolean.
pub(crate) fn coerce_bool(record: &mut Map<String, Value>, field: &str, errors: &mut Errors) {
    let Some(value) = record.get(field) else {
        return;
    };
    match value {
        Value::Null | Value::Bool(_) => {}
        Value::String(text) => match text.trim() {
            "true" => {
                record.insert(field.to_string(), Value::Bool(true));
            }
            "false" => {
                record.insert(field.to_string(), Value::Bool(false));
            }
            _ => errors.add(field, "must be a boolean"),
        },
        _ => errors.add(field, "must be a boolean"),
    }
}

pub(crate) fn check_numeric_range(
    record: &Map<String, Value>,
    field: &str,
    min: f64,
    max: f64,
    errors: &mut Errors,
) {
    if let Some(Value::Number(number)) = record.get(field) {
        if let Some(value) = number.as_f64() {
            if value < min || value > max {
                errors.add(field, format!("must be between {min} and {max}"));
            }
        }
    }
}

/// Removed fields get a directed migration message, distinct from a generic
/// unknown-field rejection, so callers know which field replaced them.
pub(crate) fn reject_legacy_field(
    record: &Map<String, Value>,
    field: &str,
    replacement: &str,
    errors: &mut Errors,
) {
    if record.contains_key(field) {
        errors.add(
            field,
            format!("`{field}` is no longer supported, use `{replacement}` instead"),
        );
    }
}

/// Minimal structural email check, enough to catch form typos without
/// reimplementing RFC 5322.
pub(crate) fn is_valid_email(candidate: &str) -> bool {
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !candidate.contains(char::is_whitespace)
}

/// Bracketed path into an array-of-objects field, e.g. `email[2].value`.
pub(crate) fn entry_path(field: &str, index: usize, key: &str) -> String {
    format!("{field}[{index}].{key}")
}
