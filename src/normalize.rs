//! # Response Normalization
//!
//! JSON-array-backed columns must always come back to callers as arrays.
//! Historical rows predating the array migration can still hold `null` or a
//! bare object, so returned records are normalized: `null` becomes `[]`, a
//! lone object becomes a one-element array, anything else non-array becomes
//! `[]`. Normalization is idempotent.

use crate::entity::EntityKind;
use serde_json::Value;

/// Normalize the array-backed fields of a single record in place.
pub fn normalize_record(kind: EntityKind, mut record: Value) -> Value {
    let array_fields = kind.array_fields();
    if array_fields.is_empty() {
        return record;
    }

    if let Value::Object(map) = &mut record {
        for field in array_fields {
            if let Some(value) = map.get_mut(*field) {
                if !value.is_array() {
                    let ensured = match value.take() {
                        Value::Null => Vec::new(),
                        obj @ Value::Object(_) => vec![obj],
                        _ => Vec::new(),
                    };
                    *value = Value::Array(ensured);
                }
            }
        }
    }

    record
}

/// Normalize every record of a list response.
pub fn normalize_records(kind: EntityKind, records: Vec<Value>) -> Vec<Value> {
    records
        .into_iter()
        .map(|record| normalize_record(kind, record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_array_fields_become_empty_arrays() {
        let record = json!({ "id": 1, "email": null, "tags": [1, 2] });
        let normalized = normalize_record(EntityKind::Contacts, record);
        assert_eq!(normalized["email"], json!([]));
        assert_eq!(normalized["tags"], json!([1, 2]));
    }

    #[test]
    fn lone_object_becomes_single_element_array() {
        let record = json!({ "id": 1, "phone": { "value": "555", "type": "work" } });
        let normalized = normalize_record(EntityKind::Contacts, record);
        assert_eq!(
            normalized["phone"],
            json!([{ "value": "555", "type": "work" }])
        );
    }

    #[test]
    fn missing_fields_are_left_absent() {
        let record = json!({ "id": 1 });
        let normalized = normalize_record(EntityKind::Contacts, record);
        assert!(normalized.get("email").is_none());
    }

    #[test]
    fn normalization_is_idempotent() {
        let record = json!({ "id": 1, "email": null, "tags": "oops" });
        let once = normalize_record(EntityKind::Contacts, record);
        let twice = normalize_record(EntityKind::Contacts, once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn kinds_without_array_fields_pass_through() {
        let record = json!({ "id": 1, "text": "call back" });
        let normalized = normalize_record(EntityKind::Tasks, record.clone());
        assert_eq!(normalized, record);
    }
}
