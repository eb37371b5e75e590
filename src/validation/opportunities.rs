//! Opportunity payload rules.
//!
//! Opportunities carry pipeline state: stage and priority are closed enums,
//! and closing an opportunity requires a recorded reason. Two legacy fields
//! survive in old callers and are rejected with migration pointers.

use super::rules::{
    check_enum, check_max_len, check_numeric_range, coerce_number, object_payload, reject_blank,
    reject_legacy_field, require_present, Errors,
};
use super::WriteOperation;
use crate::error::FieldErrors;
use serde_json::{Map, Value};

pub const STAGES: &[&str] = &[
    "new_lead",
    "initial_outreach",
    "sample_visit_offered",
    "awaiting_response",
    "feedback_logged",
    "demo_scheduled",
    "closed_won",
    "closed_lost",
];

pub const PRIORITIES: &[&str] = &["low", "medium", "high", "critical"];

pub(crate) fn validate(op: WriteOperation, payload: &Value) -> Result<Value, FieldErrors> {
    let mut record = object_payload(payload)?;
    let mut errors = Errors::new();

    reject_legacy_field(&record, "company_id", "customer_organization_id", &mut errors);
    reject_legacy_field(&record, "archived_at", "deleted_at", &mut errors);

    reject_blank(&record, "name", "Opportunity name is required", &mut errors);
    check_max_len(&record, "name", 255, &mut errors);
    check_max_len(&record, "description", 5000, &mut errors);
    check_enum(&record, "stage", STAGES, &mut errors);
    check_enum(&record, "priority", PRIORITIES, &mut errors);

    if op == WriteOperation::Create {
        require_present(&record, "name", "Opportunity name is required", &mut errors);
        require_present(
            &record,
            "customer_organization_id",
            "Customer organization is required",
            &mut errors,
        );
        if !record
            .get("contact_ids")
            .and_then(Value::as_array)
            .is_some_and(|ids| !ids.is_empty())
        {
            errors.add("contact_ids", "At least one contact is required");
        }
    }

    coerce_number(&mut record, "customer_organization_id", &mut errors);
    coerce_number(&mut record, "sales_id", &mut errors);
    coerce_number(&mut record, "amount", &mut errors);
    coerce_number(&mut record, "probability", &mut errors);

    check_numeric_range(&record, "probability", 0.0, 100.0, &mut errors);
    if let Some(amount) = record.get("amount").and_then(Value::as_f64) {
        if amount < 0.0 {
            errors.add("amount", "must not be negative");
        }
    }

    check_close_reasons(&record, &mut errors);

    errors.into_result(record)
}

/// Closing stages require a recorded reason, and choosing "other" requires
/// explanatory notes.
fn check_close_reasons(record: &Map<String, Value>, errors: &mut Errors) {
    let stage = record.get("stage").and_then(Value::as_str);
    let win_reason = record.get("win_reason").and_then(Value::as_str);
    let loss_reason = record.get("loss_reason").and_then(Value::as_str);

    if stage == Some("closed_won") && win_reason.map_or(true, str::is_empty) {
        errors.add("win_reason", "Win reason is required when closing as won");
    }
    if stage == Some("closed_lost") && loss_reason.map_or(true, str::is_empty) {
        errors.add("loss_reason", "Loss reason is required when closing as lost");
    }

    if win_reason == Some("other") || loss_reason == Some("other") {
        let has_notes = record
            .get("close_reason_notes")
            .and_then(Value::as_str)
            .is_some_and(|notes| !notes.trim().is_empty());
        if !has_notes {
            errors.add(
                "close_reason_notes",
                "Please specify the reason in notes when selecting 'Other'",
            );
        }
    }
}
