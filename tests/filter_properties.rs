//! Property tests for filter compilation and list-value escaping.

use crm_data_core::entity::DELETED_AT;
use crm_data_core::filter::{compile, escape_list_value, FilterExpression};
use crm_data_core::visibility::apply_visibility;
use proptest::prelude::*;
use serde_json::{json, Value};

const ARRAY_FIELDS: &[&str] = &["tags", "email", "phone"];

/// Undo list-value escaping: strip the outer quotes and collapse the escape
/// sequences, in the reverse order they were applied.
fn unescape(escaped: &str) -> Option<String> {
    let inner = escaped.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next()?);
        } else {
            out.push(c);
        }
    }
    Some(out)
}

fn field_key() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,12}"
}

fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[ -~]{0,20}".prop_map(Value::from),
    ]
}

proptest! {
    /// Same expression, same wire filter, input untouched.
    #[test]
    fn compilation_is_deterministic(entries in proptest::collection::btree_map(
        field_key(),
        proptest::collection::vec(scalar_value(), 0..4),
        0..6,
    )) {
        let filter: FilterExpression = entries
            .iter()
            .map(|(k, vs)| {
                (
                    k.clone(),
                    crm_data_core::filter::FilterValue::AnyOf(vs.clone()),
                )
            })
            .collect();
        let before = filter.clone();

        let first = compile(&filter, ARRAY_FIELDS);
        let second = compile(&filter, ARRAY_FIELDS);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(filter, before);
    }

    /// Escaping is lossless: quoted outputs unescape back to the original
    /// string, bare outputs are the original string.
    #[test]
    fn escaping_is_lossless(raw in "[ -~]{0,40}") {
        let escaped = escape_list_value(&json!(raw));
        if escaped.starts_with('"') {
            prop_assert_eq!(unescape(&escaped), Some(raw));
        } else {
            prop_assert_eq!(escaped, raw);
        }
    }

    /// Values containing a list delimiter or quote character never appear
    /// bare, in either list style.
    #[test]
    fn reserved_characters_always_force_quoting(raw in "[ -~]{1,40}") {
        let reserved = [',', '.', '"', '\'', '(', ')', ' '];
        prop_assume!(raw.chars().any(|c| reserved.contains(&c)));

        let escaped = escape_list_value(&json!(raw));
        prop_assert!(escaped.starts_with('"') && escaped.ends_with('"'));
    }

    /// The visibility policy never double-constrains the marker column and
    /// never touches a filter that already constrains it.
    #[test]
    fn visibility_injects_at_most_one_marker_constraint(
        keys in proptest::collection::vec(field_key(), 0..5),
        include_deleted in any::<bool>(),
    ) {
        let filter: FilterExpression = keys
            .iter()
            .map(|k| {
                (
                    k.clone(),
                    crm_data_core::filter::FilterValue::Scalar(json!("x")),
                )
            })
            .collect();
        let already = filter.constrains(DELETED_AT);

        let applied = apply_visibility(filter.clone(), include_deleted);
        let wire = compile(&applied, ARRAY_FIELDS);

        let marker_entries = wire
            .keys()
            .filter(|k| *k == DELETED_AT || k.starts_with("deleted_at@"))
            .count();
        if include_deleted || already {
            prop_assert_eq!(applied, filter);
        } else {
            prop_assert_eq!(marker_entries, 1);
        }
    }
}
