//! Value escaping for PostgREST list operators.
//!
//! PostgREST uses backslash escaping inside quoted list values, not doubled
//! quotes. The same rule applies to both list styles (`@in` parentheses and
//! `@cs` braces).

use serde_json::Value;

/// Characters that force a list value to be wrapped in double quotes.
const QUOTE_TRIGGERS: &[char] = &[',', '.', '"', '\'', '(', ')', ' '];

/// Render a JSON value the way it appears on the wire, outside any quoting.
/// Strings render bare (no surrounding JSON quotes); everything else uses its
/// JSON form (`null`, `true`, `42`).
pub(crate) fn render_wire_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Escape a value for placement inside a delimited list.
///
/// Values containing any reserved character are wrapped in double quotes with
/// embedded backslashes and double quotes escaped (backslash first, then
/// quotes; the order matters). Values with no reserved characters are
/// emitted bare.
pub fn escape_list_value(value: &Value) -> String {
    let raw = render_wire_value(value);

    if !raw.chars().any(|c| QUOTE_TRIGGERS.contains(&c)) {
        return raw;
    }

    let escaped = raw.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
