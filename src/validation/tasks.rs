//! Task payload rules.
//!
//! Tasks reference a contact and an account manager by id; both string and
//! numeric ids are accepted as submitted.

use super::rules::{
    check_enum, check_max_len, coerce_bool, object_payload, reject_blank, require_present, Errors,
};
use super::WriteOperation;
use crate::error::FieldErrors;
use serde_json::Value;

pub const TASK_TYPES: &[&str] = &[
    "call",
    "email",
    "meeting",
    "demo",
    "follow_up",
    "todo",
];

pub(crate) fn validate(op: WriteOperation, payload: &Value) -> Result<Value, FieldErrors> {
    let mut record = object_payload(payload)?;
    let mut errors = Errors::new();

    reject_blank(&record, "text", "Task text is required", &mut errors);
    reject_blank(&record, "due_date", "Due date is required", &mut errors);
    check_max_len(&record, "text", 5000, &mut errors);
    check_enum(&record, "type", TASK_TYPES, &mut errors);

    if op == WriteOperation::Create {
        require_present(&record, "text", "Task text is required", &mut errors);
        require_present(&record, "type", "Task type is required", &mut errors);
        require_present(&record, "due_date", "Due date is required", &mut errors);
        require_present(&record, "contact_id", "Contact is required", &mut errors);
        require_present(&record, "sales_id", "Account manager is required", &mut errors);
    }

    coerce_bool(&mut record, "done", &mut errors);

    errors.into_result(record)
}
