//! # Soft-Delete Visibility Policy
//!
//! Reads exclude soft-deleted rows by default. The policy injects a
//! `deleted_at@is null` constraint into the read filter unless the caller
//! already constrains the marker column; an explicit caller constraint
//! always wins, and no second constraint is added. It runs strictly before
//! filter compilation so the injected entry participates in normal
//! compilation.

use crate::entity::DELETED_AT;
use crate::filter::{FilterExpression, FilterValue};
use serde_json::Value;

/// Apply the soft-delete visibility policy to a read filter.
///
/// With `include_deleted` the filter passes through unchanged and the marker
/// column stays unconstrained.
pub fn apply_visibility(mut filter: FilterExpression, include_deleted: bool) -> FilterExpression {
    if include_deleted || filter.constrains(DELETED_AT) {
        return filter;
    }

    filter.set(
        format!("{DELETED_AT}@is"),
        FilterValue::Scalar(Value::Null),
    );
    filter
}
