//! # Entity Registry
//!
//! Static per-entity configuration consumed by the rest of the core: backend
//! resource names, JSON-array-backed columns, searchable columns, soft-delete
//! support and summary-view substitution. This is configuration, not data:
//! nothing here is derived from payloads at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column used to mark a record as soft-deleted.
pub const DELETED_AT: &str = "deleted_at";

/// The entity kinds the data access core knows how to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Contacts,
    Organizations,
    Opportunities,
    Tasks,
    ContactNotes,
    OpportunityNotes,
    Tags,
}

impl EntityKind {
    /// Backend table name for write operations and non-view reads.
    pub fn resource_name(self) -> &'static str {
        match self {
            EntityKind::Contacts => "contacts",
            EntityKind::Organizations => "organizations",
            EntityKind::Opportunities => "opportunities",
            EntityKind::Tasks => "tasks",
            EntityKind::ContactNotes => "contact_notes",
            EntityKind::OpportunityNotes => "opportunity_notes",
            EntityKind::Tags => "tags",
        }
    }

    /// Summary view used for list/one reads, when one exists. Views filter
    /// soft-deleted rows internally, so the visibility policy must be skipped
    /// for them.
    pub fn summary_view(self) -> Option<&'static str> {
        match self {
            EntityKind::Contacts => Some("contacts_summary"),
            EntityKind::Organizations => Some("organizations_summary"),
            _ => None,
        }
    }

    /// Resource name to query for list-style reads.
    pub fn list_resource(self) -> &'static str {
        self.summary_view().unwrap_or_else(|| self.resource_name())
    }

    /// Columns stored server-side as JSON arrays. Array filters on these use
    /// the contains operator instead of the scalar is-one-of operator, and
    /// response values for them are normalized to arrays.
    pub fn array_fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::Contacts => &["tags", "email", "phone"],
            EntityKind::Organizations => &["tags"],
            EntityKind::Opportunities => &["tags"],
            _ => &[],
        }
    }

    /// Columns a full-text `q` filter expands over.
    pub fn searchable_columns(self) -> &'static [&'static str] {
        match self {
            EntityKind::Contacts => &[
                "first_name",
                "last_name",
                "title",
                "email",
                "phone",
                "background",
            ],
            EntityKind::Organizations => &["name", "phone_number", "website", "city", "description"],
            EntityKind::Opportunities => &["name", "category", "description", "next_action"],
            EntityKind::Tasks => &["text"],
            EntityKind::ContactNotes | EntityKind::OpportunityNotes => &["text"],
            EntityKind::Tags => &[],
        }
    }

    /// Whether deletes on this kind are soft (set `deleted_at`) rather than
    /// physical row removal.
    pub fn supports_soft_delete(self) -> bool {
        matches!(
            self,
            EntityKind::Contacts
                | EntityKind::Organizations
                | EntityKind::Opportunities
                | EntityKind::Tasks
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_name())
    }
}

/// Record identifier. The backend issues both integer and string (UUID) ids
/// depending on the table, so both are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ident {
    Int(i64),
    Str(String),
}

impl Ident {
    /// JSON representation, used when the id participates in a filter.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Ident::Int(n) => serde_json::Value::from(*n),
            Ident::Str(s) => serde_json::Value::from(s.clone()),
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ident::Int(n) => write!(f, "{n}"),
            Ident::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Ident {
    fn from(value: i64) -> Self {
        Ident::Int(value)
    }
}

impl From<&str> for Ident {
    fn from(value: &str) -> Self {
        Ident::Str(value.to_string())
    }
}

impl From<String> for Ident {
    fn from(value: String) -> Self {
        Ident::Str(value)
    }
}
