//! # Transport Seam
//!
//! The core never builds raw HTTP requests. It describes each remote call as
//! a structured [`TransportRequest`] (method, resource, compiled wire
//! filter, pagination/sort, payload) and hands it to a [`Transport`]
//! implementation (the backend SDK adapter in production, a scripted mock in
//! tests). Credentials are the transport's concern.

use crate::error::TransportError;
use crate::filter::WireFilter;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP-shaped verb for a structured call description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

/// Page-based pagination, passed through uncompiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Sort directive, passed through uncompiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

/// A fully-compiled call description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportRequest {
    pub method: Method,
    pub resource: String,
    pub filter: WireFilter,
    pub pagination: Option<Page>,
    pub sort: Option<Sort>,
    pub payload: Option<Value>,
}

impl TransportRequest {
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            method,
            resource: resource.into(),
            filter: WireFilter::new(),
            pagination: None,
            sort: None,
            payload: None,
        }
    }

    pub fn with_filter(mut self, filter: WireFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_pagination(mut self, pagination: Option<Page>) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_sort(mut self, sort: Option<Sort>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Response to a structured call: zero or more records plus the backend's
/// total row count when it reports one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportResponse {
    pub records: Vec<Value>,
    pub total: Option<u64>,
}

impl TransportResponse {
    pub fn of(records: Vec<Value>) -> Self {
        let total = Some(records.len() as u64);
        Self { records, total }
    }

    /// The single record of a one-row response, if present.
    pub fn into_single(self) -> Option<Value> {
        self.records.into_iter().next()
    }
}

/// The remote service boundary. Implementations attach credentials, issue the
/// wire call and map backend failures onto [`TransportError`]s with the
/// correct retry classification.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
