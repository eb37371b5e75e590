//! Contact payload rules.
//!
//! Contacts carry JSON-array-backed `email` and `phone` fields whose entries
//! are `{ "value": ..., "type": ... }` objects. Form layers routinely submit
//! empty entries for rows the user added but never filled in, so those are
//! filtered out before any rule runs.

use super::rules::{
    check_max_len, coerce_number, entry_path, is_present, is_valid_email, object_payload,
    reject_blank, reject_legacy_field, require_present, Errors,
};
use super::WriteOperation;
use crate::error::FieldErrors;
use serde_json::{Map, Value};

const MAX_EMAIL_ENTRIES: usize = 10;
const MAX_PHONE_ENTRIES: usize = 10;
const MAX_TAGS: usize = 50;

pub(crate) fn validate(op: WriteOperation, payload: &Value) -> Result<Value, FieldErrors> {
    let mut record = object_payload(payload)?;
    let mut errors = Errors::new();

    drop_empty_entries(&mut record, "email");
    drop_empty_entries(&mut record, "phone");

    reject_legacy_field(&record, "company_id", "organization_id", &mut errors);

    reject_blank(&record, "first_name", "First name is required", &mut errors);
    reject_blank(&record, "last_name", "Last name is required", &mut errors);
    check_max_len(&record, "first_name", 100, &mut errors);
    check_max_len(&record, "last_name", 100, &mut errors);
    check_max_len(&record, "title", 100, &mut errors);
    check_max_len(&record, "notes", 5000, &mut errors);

    if op == WriteOperation::Create {
        if !is_present(&record, "name") {
            require_present(&record, "first_name", "First name is required", &mut errors);
            require_present(&record, "last_name", "Last name is required", &mut errors);
        }
        require_present(&record, "sales_id", "Account manager is required", &mut errors);
        require_present(
            &record,
            "organization_id",
            "Organization is required",
            &mut errors,
        );
    }

    check_entry_array(&record, "email", MAX_EMAIL_ENTRIES, true, &mut errors);
    check_entry_array(&record, "phone", MAX_PHONE_ENTRIES, false, &mut errors);
    check_linkedin_url(&record, &mut errors);
    check_tags(&mut record, &mut errors);

    coerce_number(&mut record, "sales_id", &mut errors);
    coerce_number(&mut record, "secondary_sales_id", &mut errors);
    coerce_number(&mut record, "organization_id", &mut errors);
    coerce_number(&mut record, "manager_id", &mut errors);

    check_relationship_cycles(&record, &mut errors);

    errors.into_result(record)
}

/// Drop `{ value: "", type: "" }` placeholder entries submitted for unused
/// form rows.
fn drop_empty_entries(record: &mut Map<String, Value>, field: &str) {
    if let Some(Value::Array(entries)) = record.get_mut(field) {
        entries.retain(|entry| {
            entry
                .get("value")
                .and_then(Value::as_str)
                .is_some_and(|value| !value.trim().is_empty())
        });
    }
}

fn check_entry_array(
    record: &Map<String, Value>,
    field: &str,
    max: usize,
    validate_email: bool,
    errors: &mut Errors,
) {
    let Some(value) = record.get(field) else {
        return;
    };
    let Value::Array(entries) = value else {
        if !value.is_null() {
            errors.add(field, "must be an array of entries");
        }
        return;
    };
    if entries.len() > max {
        errors.add(field, format!("at most {max} entries allowed"));
    }
    for (index, entry) in entries.iter().enumerate() {
        let Some(text) = entry.get("value").and_then(Value::as_str) else {
            errors.add(entry_path(field, index, "value"), "entry value is required");
            continue;
        };
        if validate_email && !is_valid_email(text) {
            errors.add(
                entry_path(field, index, "value"),
                "Must be a valid email address",
            );
        }
    }
}

fn check_linkedin_url(record: &Map<String, Value>, errors: &mut Errors) {
    if let Some(Value::String(url)) = record.get("linkedin_url") {
        if url.is_empty() {
            return;
        }
        let accepted = ["https://linkedin.com/", "https://www.linkedin.com/"]
            .iter()
            .chain(["http://linkedin.com/", "http://www.linkedin.com/"].iter())
            .any(|prefix| url.starts_with(prefix));
        if !accepted {
            errors.add("linkedin_url", "URL must be from linkedin.com");
        }
    }
}

/// Tags are numeric foreign keys; numeric strings are coerced in place.
fn check_tags(record: &mut Map<String, Value>, errors: &mut Errors) {
    let Some(value) = record.get_mut("tags") else {
        return;
    };
    let Value::Array(tags) = value else {
        if !value.is_null() {
            errors.add("tags", "must be an array of tag ids");
        }
        return;
    };
    if tags.len() > MAX_TAGS {
        errors.add("tags", format!("at most {MAX_TAGS} tags allowed"));
        return;
    }
    for (index, tag) in tags.iter_mut().enumerate() {
        match tag {
            Value::Number(_) => {}
            Value::String(text) => match text.trim().parse::<i64>() {
                Ok(id) => *tag = Value::from(id),
                Err(_) => errors.add(format!("tags[{index}]"), "must be a tag id"),
            },
            _ => errors.add(format!("tags[{index}]"), "must be a tag id"),
        }
    }
}

fn check_relationship_cycles(record: &Map<String, Value>, errors: &mut Errors) {
    let id = record.get("id").and_then(Value::as_i64);
    let manager = record.get("manager_id").and_then(Value::as_i64);
    if id.is_some() && id == manager {
        errors.add("manager_id", "Contact cannot be their own manager");
    }

    let primary = record.get("sales_id").and_then(Value::as_i64);
    let secondary = record.get("secondary_sales_id").and_then(Value::as_i64);
    if primary.is_some() && primary == secondary {
        errors.add(
            "secondary_sales_id",
            "Primary and secondary account managers must be different",
        );
    }
}
