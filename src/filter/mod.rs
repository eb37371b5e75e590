//! # Filter Compilation
//!
//! Translates application-level filter expressions into the operator-suffixed,
//! value-escaped query-parameter form the PostgREST-style backend understands.
//!
//! ## Overview
//!
//! A [`FilterExpression`] maps field keys to [`FilterValue`]s. Compilation is
//! a pure function: entries with absent values are dropped, array values are
//! routed to the contains (`@cs`) or is-one-of (`@in`) operator depending on
//! whether the column is JSON-array-backed, and list values are escaped per
//! the backend's quoting rules. Keys that already carry an `@` operator
//! marker pass through verbatim (the caller has taken full control of that
//! field), and the typed [`FilterValue::Raw`] variant offers the same escape
//! hatch without string-munged keys.
//!
//! Compilation is deterministic: entries are held in an ordered map, the
//! same expression always compiles to the same wire filter, and the compiler
//! never mutates its input.

pub mod compile;
pub mod escape;
pub mod expression;
pub mod search;

pub use compile::{compile, WireFilter};
pub use escape::escape_list_value;
pub use expression::{FilterExpression, FilterValue};
pub use search::{apply_search, SEARCH_KEY};
