//! Full-text search expansion.
//!
//! The reserved `q` filter key is not a column: it expands into an `@or`
//! group of `column@ilike` constraints over the entity kind's configured
//! searchable columns before compilation. The JSON-array columns `email` and
//! `phone` search their flattened `_fts` companions instead of the raw
//! arrays.

use crate::entity::EntityKind;
use crate::filter::expression::{FilterExpression, FilterValue};
use serde_json::{Map, Value};

/// Reserved filter key carrying the caller's free-text query.
pub const SEARCH_KEY: &str = "q";

/// Expand a `q` entry into the `@or` ilike group for `kind`. Filters without
/// a `q` entry pass through untouched; a `q` on a kind with no searchable
/// columns is dropped rather than sent to the backend as a bogus column.
pub fn apply_search(mut filter: FilterExpression, kind: EntityKind) -> FilterExpression {
    let Some(value) = filter.take(SEARCH_KEY) else {
        return filter;
    };

    let query = match value {
        FilterValue::Scalar(Value::String(s)) if !s.trim().is_empty() => s,
        // Non-string or blank q carries no usable query.
        _ => return filter,
    };

    let columns = kind.searchable_columns();
    if columns.is_empty() {
        return filter;
    }

    let mut group = Map::new();
    for column in columns {
        let target = match *column {
            "email" => "email_fts",
            "phone" => "phone_fts",
            other => other,
        };
        group.insert(format!("{target}@ilike"), Value::String(query.clone()));
    }

    filter.set("@or", FilterValue::Scalar(Value::Object(group)));
    filter
}
