//! Application-level filter expressions, prior to wire compilation.

use serde_json::Value;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// A single filter entry's value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Equality on the field; emitted without an operator suffix.
    Scalar(Value),
    /// "Any of" over an ordered list; routed to `@cs` or `@in` at compile
    /// time depending on whether the column is JSON-array-backed. An empty
    /// list compiles to no constraint at all.
    AnyOf(Vec<Value>),
    /// Caller-controlled operator: `Raw { operator: "gte", value: 5 }` on key
    /// `amount` compiles to `amount@gte=5` with no further interpretation.
    Raw { operator: String, value: Value },
    /// Entry is dropped at compile time. Allows callers to clear a filter
    /// slot without removing the key themselves.
    Absent,
}

impl FilterValue {
    pub fn raw(operator: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterValue::Raw {
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// An ordered field-key → value mapping. Ordering makes compilation
/// deterministic regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    entries: BTreeMap<String, FilterValue>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, builder-style.
    pub fn with(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.set(key, value);
        self
    }

    /// Equality constraint shorthand.
    pub fn with_eq(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(key, FilterValue::Scalar(value.into()))
    }

    /// "Any of" constraint shorthand.
    pub fn with_any_of(
        self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.with(
            key,
            FilterValue::AnyOf(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn set(&mut self, key: impl Into<String>, value: FilterValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.get(key)
    }

    /// Remove and return an entry.
    pub fn take(&mut self, key: &str) -> Option<FilterValue> {
        self.entries.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any entry constrains `field`, either directly or through an
    /// operator-suffixed key (`field@is`, `field@gte`, ...) or a raw-operator
    /// value on the bare key.
    pub fn constrains(&self, field: &str) -> bool {
        let prefix = format!("{field}@");
        self.entries
            .keys()
            .any(|k| k == field || k.starts_with(&prefix))
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FilterValue> {
        self.entries.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, FilterValue)> for FilterExpression {
    fn from_iter<I: IntoIterator<Item = (K, FilterValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constrains_matches_bare_and_operator_keys() {
        let filter = FilterExpression::new()
            .with("deleted_at@is", FilterValue::Scalar(Value::Null))
            .with_eq("stage", "closed_won");

        assert!(filter.constrains("deleted_at"));
        assert!(filter.constrains("stage"));
        assert!(!filter.constrains("priority"));
    }

    #[test]
    fn constrains_does_not_match_prefix_of_other_field() {
        let filter = FilterExpression::new().with_eq("stage_detail", "x");
        assert!(!filter.constrains("stage"));
    }

    #[test]
    fn builder_replaces_existing_keys() {
        let filter = FilterExpression::new()
            .with_eq("priority", "low")
            .with_eq("priority", "high");
        assert_eq!(filter.len(), 1);
        assert_eq!(
            filter.get("priority"),
            Some(&FilterValue::Scalar(json!("high")))
        );
    }
}
