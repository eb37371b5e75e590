//! Operation parameter and result types.

use crate::entity::Ident;
use crate::error::DataError;
use crate::filter::FilterExpression;
use crate::transport::{Page, Sort};
use serde_json::Value;

/// Parameters for a list read.
#[derive(Debug, Clone, Default)]
pub struct GetListParams {
    pub filter: FilterExpression,
    pub pagination: Option<Page>,
    pub sort: Option<Sort>,
    /// Opt out of the soft-delete visibility policy for this read.
    pub include_deleted: bool,
}

impl GetListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_pagination(mut self, pagination: Page) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn include_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = include_deleted;
        self
    }
}

/// A page of records plus the backend's total row count when reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult {
    pub data: Vec<Value>,
    pub total: Option<u64>,
}

/// One failed target of a bulk operation.
#[derive(Debug)]
pub struct BulkFailure {
    pub id: Ident,
    pub error: DataError,
}

/// Aggregate result of a bulk fan-out. Keyed by id, independent of the order
/// in which the per-id calls completed.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub succeeded: Vec<Ident>,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkStatus {
    /// Every target succeeded.
    Complete,
    /// Some targets succeeded, the rest are listed in `failed`.
    Partial,
    /// Every target failed.
    Failed,
}

impl BulkOutcome {
    pub fn status(&self) -> BulkStatus {
        match (self.succeeded.is_empty(), self.failed.is_empty()) {
            (_, true) => BulkStatus::Complete,
            (false, false) => BulkStatus::Partial,
            (true, false) => BulkStatus::Failed,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == BulkStatus::Complete
    }
}
