//! # Validation Gate
//!
//! Every write payload passes through here exactly once before anything else
//! touches it. The gate is pure: raw payload in, either a validated (and
//! coerced) payload out or a map of one message per offending field path.
//!
//! ## Architecture
//!
//! - **Per-entity rule modules**: each entity kind owns its rule set
//!   (`contacts`, `organizations`, `opportunities`, `tasks`)
//! - **Shared rule helpers**: accumulation, coercion and path formatting live
//!   in [`rules`] so the per-entity modules stay declarative
//! - **All-or-nothing coercion**: string→number and string→bool coercions are
//!   applied to a working copy and surface only when the whole payload
//!   validates
//!
//! Failures are reported for every offending field in one pass, keyed by
//! dotted/bracketed paths (`email[1].value`), so callers can render errors
//! next to the fields that caused them.

mod contacts;
mod opportunities;
mod organizations;
mod rules;
mod tasks;

use crate::entity::EntityKind;
use crate::error::FieldErrors;
use rules::{object_payload, reject_blank, require_present, Errors};
use serde_json::Value;
use tracing::debug;

pub use opportunities::{PRIORITIES as OPPORTUNITY_PRIORITIES, STAGES as OPPORTUNITY_STAGES};
pub use tasks::TASK_TYPES;

/// Which write path a payload is bound for. Creates enforce required fields;
/// updates accept partial payloads but still reject invalid values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Create,
    Update,
}

/// Validate a raw write payload for the given entity kind.
///
/// Returns the payload with coercions applied, or the full set of field
/// errors. The input is never mutated.
pub fn validate(
    kind: EntityKind,
    op: WriteOperation,
    payload: &Value,
) -> Result<Value, FieldErrors> {
    let result = match kind {
        EntityKind::Contacts => contacts::validate(op, payload),
        EntityKind::Organizations => organizations::validate(op, payload),
        EntityKind::Opportunities => opportunities::validate(op, payload),
        EntityKind::Tasks => tasks::validate(op, payload),
        EntityKind::ContactNotes | EntityKind::OpportunityNotes => validate_note(op, payload),
        EntityKind::Tags => validate_tag(op, payload),
    };

    if let Err(errors) = &result {
        debug!(
            entity = %kind,
            field_count = errors.len(),
            "payload rejected by validation"
        );
    }
    result
}

fn validate_note(op: WriteOperation, payload: &Value) -> Result<Value, FieldErrors> {
    let record = object_payload(payload)?;
    let mut errors = Errors::new();

    reject_blank(&record, "text", "Note text is required", &mut errors);
    if op == WriteOperation::Create {
        require_present(&record, "text", "Note text is required", &mut errors);
        require_present(&record, "sales_id", "Account manager is required", &mut errors);
    }

    errors.into_result(record)
}

fn validate_tag(op: WriteOperation, payload: &Value) -> Result<Value, FieldErrors> {
    let record = object_payload(payload)?;
    let mut errors = Errors::new();

    reject_blank(&record, "name", "Tag name is required", &mut errors);
    if op == WriteOperation::Create {
        require_present(&record, "name", "Tag name is required", &mut errors);
    }

    errors.into_result(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dispatches_to_the_entity_rule_set() {
        let errors = validate(EntityKind::Contacts, WriteOperation::Create, &json!({}))
            .unwrap_err();
        assert!(errors.contains_key("organization_id"));

        let errors = validate(EntityKind::Tasks, WriteOperation::Create, &json!({}))
            .unwrap_err();
        assert!(errors.contains_key("due_date"));
    }

    #[test]
    fn notes_require_text_and_author() {
        let errors = validate(EntityKind::ContactNotes, WriteOperation::Create, &json!({}))
            .unwrap_err();
        assert!(errors.contains_key("text"));
        assert!(errors.contains_key("sales_id"));

        let payload = json!({ "text": "Met at the trade show", "sales_id": 7 });
        assert!(validate(EntityKind::OpportunityNotes, WriteOperation::Create, &payload).is_ok());
    }

    #[test]
    fn tags_require_a_name_on_create_only() {
        let errors = validate(EntityKind::Tags, WriteOperation::Create, &json!({})).unwrap_err();
        assert!(errors.contains_key("name"));

        assert!(validate(EntityKind::Tags, WriteOperation::Update, &json!({ "color": "teal" })).is_ok());
    }

    #[test]
    fn reported_errors_cover_every_offending_field_in_one_pass() {
        let payload = json!({
            "text": "",
            "type": "carrier-pigeon"
        });
        let errors = validate(EntityKind::Tasks, WriteOperation::Create, &payload).unwrap_err();
        assert!(errors.len() >= 4);
    }
}
