//! Organization payload rules.

use super::rules::{
    check_max_len, coerce_number, object_payload, reject_blank, require_present, Errors,
};
use super::WriteOperation;
use crate::error::FieldErrors;
use serde_json::{Map, Value};

pub(crate) fn validate(op: WriteOperation, payload: &Value) -> Result<Value, FieldErrors> {
    let mut record = object_payload(payload)?;
    let mut errors = Errors::new();

    reject_blank(&record, "name", "Organization name is required", &mut errors);
    check_max_len(&record, "name", 255, &mut errors);
    check_max_len(&record, "description", 5000, &mut errors);
    check_max_len(&record, "city", 100, &mut errors);
    check_max_len(&record, "country", 100, &mut errors);

    if op == WriteOperation::Create {
        require_present(&record, "name", "Organization name is required", &mut errors);
    }

    check_url(&record, "website", &mut errors);
    check_url(&record, "linkedin_url", &mut errors);

    coerce_number(&mut record, "sales_id", &mut errors);
    coerce_number(&mut record, "parent_organization_id", &mut errors);

    errors.into_result(record)
}

fn check_url(record: &Map<String, Value>, field: &str, errors: &mut Errors) {
    if let Some(Value::String(url)) = record.get(field) {
        if url.is_empty() {
            return;
        }
        if url.len() > 2048 {
            errors.add(field, "URL too long");
            return;
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.add(field, "must be an http(s) URL");
        }
    }
}
