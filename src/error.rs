//! # Structured Error Handling
//!
//! The core's error taxonomy. Transport-level failures carry their retry
//! classification so the resilient executor can decide between fail-fast and
//! backoff without inspecting backend-specific details. Validation failures
//! carry one message per offending field path and never reach the transport.

use crate::entity::{EntityKind, Ident};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Per-field validation messages, keyed by dotted/bracketed field path
/// (e.g. `email[2].value`). Ordered so rendered errors are stable.
pub type FieldErrors = BTreeMap<String, String>;

/// Retry classification for a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Backend rejected the call due to rate limiting; retry after cooldown.
    RateLimited,
    /// Transient network failure; retry with exponential backoff.
    Network,
    /// Will never succeed on retry; surface immediately.
    Permanent,
}

/// Errors reported by the transport seam.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("rate limited by backend (retry_after: {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("network error: {0}")]
    Network(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl TransportError {
    /// Classify this error for the retry state machine.
    pub fn class(&self) -> ErrorClass {
        match self {
            TransportError::RateLimited { .. } => ErrorClass::RateLimited,
            TransportError::Network(_) => ErrorClass::Network,
            TransportError::NotFound(_)
            | TransportError::Conflict(_)
            | TransportError::Unauthorized(_)
            | TransportError::BadRequest(_) => ErrorClass::Permanent,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class() != ErrorClass::Permanent
    }
}

/// Terminal outcomes surfaced to callers of the data access core.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Boundary validation failed; never retried, never reaches the transport.
    #[error("validation failed for {entity}: {} field error(s)", errors.len())]
    Validation {
        entity: EntityKind,
        errors: FieldErrors,
    },

    /// Permanent transport failure, surfaced immediately with the originating
    /// operation's context attached.
    #[error("{operation} on {entity}{} failed: {source}", fmt_id(.id))]
    Permanent {
        entity: EntityKind,
        operation: &'static str,
        id: Option<Ident>,
        #[source]
        source: TransportError,
    },

    /// Transient failures persisted through every allowed attempt.
    #[error("{operation} on {entity} gave up after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        entity: EntityKind,
        operation: &'static str,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// Caller cancelled the operation. Distinct from failure: no retries were
    /// pending and no terminal transport error was observed.
    #[error("operation cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DataError {
    /// Field-path messages, when this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            DataError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

fn fmt_id(id: &Option<Ident>) -> String {
    match id {
        Some(id) => format!(" (id {id})"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
