//! The filter compiler: structured expression → wire filter.

use crate::filter::escape::{escape_list_value, render_wire_value};
use crate::filter::expression::{FilterExpression, FilterValue};
use serde_json::Value;
use std::collections::BTreeMap;

/// The compiled, wire-level filter: query-parameter keys (operator suffixes
/// included) mapped to already-escaped values. Ordered for determinism.
pub type WireFilter = BTreeMap<String, String>;

/// Compile a filter expression into its wire form.
///
/// `array_fields` is the static set of JSON-array-backed columns for the
/// target entity: non-empty lists on those columns become `@cs={...}`
/// (contains any of), lists on every other column become `@in=(...)`
/// (is one of).
///
/// Empty lists compile to no constraint at all. An empty "any of" matches
/// nothing server-side, which in practice always means a stale widget state
/// rather than an intentional match-nothing query, so the entry is dropped.
/// This mirrors the backend provider's behavior and is relied upon by list
/// screens; see the regression test below before changing it.
pub fn compile(filter: &FilterExpression, array_fields: &[&str]) -> WireFilter {
    let mut wire = WireFilter::new();

    for (key, value) in filter.iter() {
        // Keys already carrying an operator marker are the caller's business.
        if key.contains('@') {
            if let Some(rendered) = render_passthrough(value) {
                wire.insert(key.clone(), rendered);
            }
            continue;
        }

        match value {
            FilterValue::Absent => {}
            FilterValue::Scalar(Value::Null) => {}
            FilterValue::Raw { operator, value } => {
                wire.insert(format!("{key}@{operator}"), render_wire_value(value));
            }
            FilterValue::AnyOf(values) if values.is_empty() => {}
            FilterValue::AnyOf(values) => {
                let escaped: Vec<String> = values.iter().map(escape_list_value).collect();
                if array_fields.contains(&key.as_str()) {
                    wire.insert(format!("{key}@cs"), format!("{{{}}}", escaped.join(",")));
                } else {
                    wire.insert(format!("{key}@in"), format!("({})", escaped.join(",")));
                }
            }
            FilterValue::Scalar(scalar) => {
                // A single value against a JSON-array column still needs the
                // contains operator; plain equality would compare the whole
                // array.
                if array_fields.contains(&key.as_str()) {
                    wire.insert(
                        format!("{key}@cs"),
                        format!("{{{}}}", escape_list_value(scalar)),
                    );
                } else {
                    wire.insert(key.clone(), render_wire_value(scalar));
                }
            }
        }
    }

    wire
}

/// Render a value under a caller-controlled key. Scalars render verbatim,
/// lists render as an escaped comma-join (the caller chose the surrounding
/// operator), absent entries drop.
fn render_passthrough(value: &FilterValue) -> Option<String> {
    match value {
        FilterValue::Absent => None,
        FilterValue::Scalar(v) => Some(render_wire_value(v)),
        FilterValue::AnyOf(values) if values.is_empty() => None,
        FilterValue::AnyOf(values) => Some(
            values
                .iter()
                .map(escape_list_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        FilterValue::Raw { value, .. } => Some(render_wire_value(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use serde_json::{json, Value};

    const ARRAY_FIELDS: &[&str] = &["tags", "email", "phone"];

    #[test]
    fn array_value_on_array_field_uses_contains() {
        let filter = FilterExpression::new().with_any_of("tags", ["a", "b"]);
        let wire = compile(&filter, ARRAY_FIELDS);
        assert_eq!(wire.get("tags@cs").map(String::as_str), Some("{a,b}"));
        assert!(!wire.contains_key("tags"));
    }

    #[test]
    fn array_value_on_scalar_field_uses_is_one_of() {
        let filter = FilterExpression::new().with_any_of("stage", ["won", "lost"]);
        let wire = compile(&filter, ARRAY_FIELDS);
        assert_eq!(wire.get("stage@in").map(String::as_str), Some("(won,lost)"));
    }

    #[test]
    fn empty_array_is_dropped_not_match_nothing() {
        // Intentional: an empty "any of" becomes "no constraint", not a
        // zero-result query. Guard this policy.
        let filter = FilterExpression::new().with_any_of("tags", Vec::<String>::new());
        let wire = compile(&filter, ARRAY_FIELDS);
        assert!(wire.is_empty());
    }

    #[test]
    fn null_scalar_is_dropped() {
        let filter = FilterExpression::new().with("priority", FilterValue::Scalar(Value::Null));
        assert!(compile(&filter, ARRAY_FIELDS).is_empty());
    }

    #[test]
    fn absent_is_dropped() {
        let filter = FilterExpression::new().with("priority", FilterValue::Absent);
        assert!(compile(&filter, ARRAY_FIELDS).is_empty());
    }

    #[test]
    fn scalar_passes_through_as_equality() {
        let filter = FilterExpression::new().with_eq("stage", "closed_won");
        let wire = compile(&filter, ARRAY_FIELDS);
        assert_eq!(
            wire.get("stage").map(String::as_str),
            Some("closed_won")
        );
    }

    #[test]
    fn scalar_on_array_field_still_uses_contains() {
        let filter = FilterExpression::new().with_eq("tags", "vip");
        let wire = compile(&filter, ARRAY_FIELDS);
        assert_eq!(wire.get("tags@cs").map(String::as_str), Some("{vip}"));
    }

    #[test]
    fn operator_keys_pass_through_unchanged() {
        let filter = FilterExpression::new()
            .with("deleted_at@is", FilterValue::Scalar(Value::Null))
            .with("amount@gte", FilterValue::Scalar(json!(100)));
        let wire = compile(&filter, ARRAY_FIELDS);
        assert_eq!(wire.get("deleted_at@is").map(String::as_str), Some("null"));
        assert_eq!(wire.get("amount@gte").map(String::as_str), Some("100"));
    }

    #[test]
    fn raw_variant_builds_operator_key() {
        let filter =
            FilterExpression::new().with("amount", FilterValue::raw("gte", json!(100)));
        let wire = compile(&filter, ARRAY_FIELDS);
        assert_eq!(wire.get("amount@gte").map(String::as_str), Some("100"));
    }

    #[test]
    fn list_values_are_escaped_identically_in_both_styles() {
        let filter = FilterExpression::new()
            .with_any_of("tags", ["O'Brien, Inc."])
            .with_any_of("stage", ["O'Brien, Inc."]);
        let wire = compile(&filter, ARRAY_FIELDS);
        assert_eq!(
            wire.get("tags@cs").map(String::as_str),
            Some("{\"O'Brien, Inc.\"}")
        );
        assert_eq!(
            wire.get("stage@in").map(String::as_str),
            Some("(\"O'Brien, Inc.\")")
        );
    }

    #[test]
    fn compilation_is_deterministic_and_non_mutating() {
        let filter = FilterExpression::new()
            .with_any_of("tags", ["b", "a"])
            .with_eq("stage", "closed_won")
            .with("amount", FilterValue::raw("gte", json!(10)));
        let before = filter.clone();

        let first = compile(&filter, ARRAY_FIELDS);
        let second = compile(&filter, ARRAY_FIELDS);

        assert_eq!(first, second);
        assert_eq!(filter, before);
    }

    #[test]
    fn mixed_value_types_render_json_forms() {
        let filter = FilterExpression::new()
            .with_any_of("sales_id", [json!(1), json!(2)])
            .with_eq("disqualified", json!(false));
        let wire = compile(&filter, &[]);
        assert_eq!(wire.get("sales_id@in").map(String::as_str), Some("(1,2)"));
        assert_eq!(
            wire.get("disqualified").map(String::as_str),
            Some("false")
        );
    }
}
