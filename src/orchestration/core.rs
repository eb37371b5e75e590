//! The operation orchestrator.
//!
//! [`DataCore`] glues the pipeline together: validation gate on the write
//! path, search expansion and soft-delete visibility on the read path, filter
//! compilation, then the resilient executor around the transport call, and
//! response normalization on the way back out. Each logical operation issues
//! exactly one compiled request; bulk operations fan out one request per
//! target id and aggregate per-id outcomes.

use crate::config::DataCoreConfig;
use crate::entity::{EntityKind, Ident, DELETED_AT};
use crate::error::{DataError, Result, TransportError};
use crate::filter::{apply_search, compile, FilterExpression};
use crate::normalize::{normalize_record, normalize_records};
use crate::orchestration::params::{BulkFailure, BulkOutcome, GetListParams, ListResult};
use crate::resilience::{ExecContext, InMemoryRateLimitState, RetryExecutor, SharedRateLimit};
use crate::transport::{Method, Transport, TransportRequest, TransportResponse};
use crate::validation::{validate, WriteOperation};
use crate::visibility::apply_visibility;
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The data access core: one entry point per operation, all sharing a single
/// retry executor and rate-limit cooldown.
pub struct DataCore<T> {
    transport: Arc<T>,
    executor: RetryExecutor,
}

impl<T: Transport> DataCore<T> {
    pub fn new(transport: Arc<T>, config: DataCoreConfig) -> Self {
        let rate_limit: SharedRateLimit = Arc::new(InMemoryRateLimitState::new());
        Self {
            transport,
            executor: RetryExecutor::new(config.executor, rate_limit),
        }
    }

    /// Build with an externally-owned executor, e.g. to share one rate-limit
    /// cooldown across several cores.
    pub fn with_executor(transport: Arc<T>, executor: RetryExecutor) -> Self {
        Self { transport, executor }
    }

    /// List records of `kind` matching the filter, respecting the soft-delete
    /// visibility policy. Pagination and sort pass through uncompiled.
    pub async fn get_list(
        &self,
        kind: EntityKind,
        params: GetListParams,
        cancel: &CancellationToken,
    ) -> Result<ListResult> {
        let filter = self.read_filter(kind, params.filter, params.include_deleted);
        let wire = compile(&filter, kind.array_fields());
        debug!(entity = %kind, filter_len = wire.len(), "get_list");

        let request = TransportRequest::new(Method::Get, kind.list_resource())
            .with_filter(wire)
            .with_pagination(params.pagination)
            .with_sort(params.sort);

        let ctx = ExecContext::new(kind, "get_list");
        let response = self.run(&ctx, cancel, request).await?;
        Ok(ListResult {
            total: response.total,
            data: normalize_records(kind, response.records),
        })
    }

    /// Fetch one record by id. A missing record is a permanent not-found
    /// error.
    pub async fn get_one(
        &self,
        kind: EntityKind,
        id: Ident,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let filter = self.read_filter(
            kind,
            FilterExpression::new().with_eq("id", id.to_value()),
            false,
        );
        debug!(entity = %kind, id = %id, "get_one");

        let request = TransportRequest::new(Method::Get, kind.list_resource())
            .with_filter(compile(&filter, kind.array_fields()));

        let ctx = ExecContext::new(kind, "get_one").with_id(id.clone());
        let response = self.run(&ctx, cancel, request).await?;
        match response.into_single() {
            Some(record) => Ok(normalize_record(kind, record)),
            None => Err(DataError::Permanent {
                entity: kind,
                operation: "get_one",
                id: Some(id.clone()),
                source: TransportError::NotFound(format!("{kind}/{id}")),
            }),
        }
    }

    /// Fetch a batch of records by id in a single call. Fewer records than
    /// ids is not an error; callers handle the shortfall.
    pub async fn get_many(
        &self,
        kind: EntityKind,
        ids: &[Ident],
        cancel: &CancellationToken,
    ) -> Result<Vec<Value>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter =
            FilterExpression::new().with_any_of("id", ids.iter().map(Ident::to_value));
        debug!(entity = %kind, requested = ids.len(), "get_many");

        let request = TransportRequest::new(Method::Get, kind.resource_name())
            .with_filter(compile(&filter, kind.array_fields()));

        let ctx = ExecContext::new(kind, "get_many");
        let response = self.run(&ctx, cancel, request).await?;
        Ok(normalize_records(kind, response.records))
    }

    /// Validate and create a record. Validation failures short-circuit before
    /// any transport call.
    pub async fn create(
        &self,
        kind: EntityKind,
        payload: &Value,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let validated = validate(kind, WriteOperation::Create, payload)
            .map_err(|errors| DataError::Validation { entity: kind, errors })?;
        debug!(entity = %kind, "create");

        let request =
            TransportRequest::new(Method::Post, kind.resource_name()).with_payload(validated.clone());

        let ctx = ExecContext::new(kind, "create");
        let response = self.run(&ctx, cancel, request).await?;
        Ok(normalize_record(
            kind,
            response.into_single().unwrap_or(validated),
        ))
    }

    /// Validate and update the record with `id`. Partial payloads are
    /// accepted; validation failures short-circuit before any transport call.
    pub async fn update(
        &self,
        kind: EntityKind,
        id: Ident,
        payload: &Value,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let validated = validate(kind, WriteOperation::Update, payload)
            .map_err(|errors| DataError::Validation { entity: kind, errors })?;
        self.update_validated(kind, id, validated, cancel).await
    }

    /// Update path for a payload that already passed the gate. Bulk updates
    /// call this per target so the gate still runs exactly once.
    async fn update_validated(
        &self,
        kind: EntityKind,
        id: Ident,
        validated: Value,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        debug!(entity = %kind, id = %id, "update");
        let request = self.patch_request(kind, &id, validated.clone());

        let ctx = ExecContext::new(kind, "update").with_id(id);
        let response = self.run(&ctx, cancel, request).await?;
        Ok(normalize_record(
            kind,
            response.into_single().unwrap_or(validated),
        ))
    }

    /// Delete the record with `id`. Soft-delete-capable kinds are marked
    /// deleted with a timestamp instead of removed; deleting an
    /// already-missing record succeeds.
    pub async fn delete(
        &self,
        kind: EntityKind,
        id: Ident,
        cancel: &CancellationToken,
    ) -> Result<()> {
        debug!(entity = %kind, id = %id, soft = kind.supports_soft_delete(), "delete");
        let request = if kind.supports_soft_delete() {
            self.patch_request(kind, &id, deletion_marker())
        } else {
            TransportRequest::new(Method::Delete, kind.resource_name())
                .with_filter(compile(&id_filter(&id), &[]))
        };

        let ctx = ExecContext::new(kind, "delete").with_id(id);
        match self.run(&ctx, cancel, request).await {
            Ok(_) => Ok(()),
            // Idempotent delete: the record being gone is the desired state.
            Err(DataError::Permanent {
                source: TransportError::NotFound(_),
                ..
            }) => Ok(()),
            Err(error) => Err(error),
        }
    }

    /// Apply one validated update payload to each target id. Per-id calls run
    /// concurrently and succeed or fail independently.
    pub async fn bulk_update(
        &self,
        kind: EntityKind,
        ids: &[Ident],
        payload: &Value,
        cancel: &CancellationToken,
    ) -> Result<BulkOutcome> {
        // The gate runs exactly once: the same validated payload goes to
        // every target.
        let validated = validate(kind, WriteOperation::Update, payload)
            .map_err(|errors| DataError::Validation { entity: kind, errors })?;

        let outcomes = join_all(ids.iter().cloned().map(|id| {
            let payload = validated.clone();
            async move {
                let result = self.update_validated(kind, id.clone(), payload, cancel).await;
                (id, result.map(|_| ()))
            }
        }))
        .await;

        aggregate(outcomes)
    }

    /// Delete each target id independently under the shared retry policy.
    pub async fn bulk_delete(
        &self,
        kind: EntityKind,
        ids: &[Ident],
        cancel: &CancellationToken,
    ) -> Result<BulkOutcome> {
        let outcomes = join_all(ids.iter().cloned().map(|id| async move {
            let result = self.delete(kind, id.clone(), cancel).await;
            (id, result)
        }))
        .await;

        aggregate(outcomes)
    }

    /// Read-path filter pipeline: search expansion, then the visibility
    /// policy. Summary views filter soft-deleted rows themselves, so the
    /// policy is skipped when the read targets a view.
    fn read_filter(
        &self,
        kind: EntityKind,
        filter: FilterExpression,
        include_deleted: bool,
    ) -> FilterExpression {
        let filter = apply_search(filter, kind);
        if kind.summary_view().is_some() {
            return filter;
        }
        apply_visibility(filter, include_deleted)
    }

    fn patch_request(&self, kind: EntityKind, id: &Ident, payload: Value) -> TransportRequest {
        TransportRequest::new(Method::Patch, kind.resource_name())
            .with_filter(compile(&id_filter(id), &[]))
            .with_payload(payload)
    }

    /// One executor-wrapped transport call.
    async fn run(
        &self,
        ctx: &ExecContext,
        cancel: &CancellationToken,
        request: TransportRequest,
    ) -> Result<TransportResponse> {
        let transport = Arc::clone(&self.transport);
        self.executor
            .execute(ctx, cancel, move || {
                let transport = Arc::clone(&transport);
                let request = request.clone();
                async move { transport.execute(request).await }
            })
            .await
    }
}

fn id_filter(id: &Ident) -> FilterExpression {
    FilterExpression::new().with_eq("id", id.to_value())
}

fn deletion_marker() -> Value {
    json!({ DELETED_AT: chrono::Utc::now().to_rfc3339() })
}

/// Fold per-id outcomes into an order-independent aggregate, sorted by id.
/// Cancellation is not a per-id failure: if any target was cancelled the
/// whole operation reports the distinct cancelled outcome.
fn aggregate(outcomes: Vec<(Ident, Result<()>)>) -> Result<BulkOutcome> {
    if outcomes
        .iter()
        .any(|(_, result)| matches!(result, Err(DataError::Cancelled)))
    {
        return Err(DataError::Cancelled);
    }

    let mut bulk = BulkOutcome::default();
    for (id, result) in outcomes {
        match result {
            Ok(()) => bulk.succeeded.push(id),
            Err(error) => bulk.failed.push(BulkFailure { id, error }),
        }
    }
    bulk.succeeded.sort();
    bulk.failed.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(bulk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutorConfig;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Transport mock that records every request and replays scripted
    /// responses; once the script runs out it answers with empty success.
    struct ScriptedTransport {
        requests: Mutex<Vec<TransportRequest>>,
        responses: Mutex<VecDeque<std::result::Result<TransportResponse, TransportError>>>,
    }

    impl ScriptedTransport {
        fn new(
            responses: Vec<std::result::Result<TransportResponse, TransportError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                responses: Mutex::new(responses.into()),
            })
        }

        fn seen(&self) -> Vec<TransportRequest> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(
            &self,
            request: TransportRequest,
        ) -> std::result::Result<TransportResponse, TransportError> {
            self.requests.lock().push(request);
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(TransportResponse::default()))
        }
    }

    fn core(transport: Arc<ScriptedTransport>) -> DataCore<ScriptedTransport> {
        let config = DataCoreConfig {
            executor: ExecutorConfig {
                max_attempts: 2,
                base_delay_ms: 1,
                max_delay_ms: 5,
                backoff_multiplier: 2.0,
                jitter_factor: 0.0,
            },
        };
        DataCore::new(transport, config)
    }

    #[tokio::test]
    async fn get_list_targets_summary_view_without_visibility_filter() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::of(vec![
            json!({ "id": 1, "email": null, "tags": [2] }),
        ]))]);
        let core = core(Arc::clone(&transport));

        let result = core
            .get_list(
                EntityKind::Contacts,
                GetListParams::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let seen = transport.seen();
        assert_eq!(seen[0].resource, "contacts_summary");
        // The view already excludes soft-deleted rows.
        assert!(!seen[0].filter.contains_key("deleted_at@is"));
        // Array-backed fields come back normalized.
        assert_eq!(result.data[0]["email"], json!([]));
        assert_eq!(result.total, Some(1));
    }

    #[tokio::test]
    async fn get_list_injects_visibility_filter_for_plain_tables() {
        let transport = ScriptedTransport::new(vec![]);
        let core = core(Arc::clone(&transport));

        core.get_list(
            EntityKind::Opportunities,
            GetListParams::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let seen = transport.seen();
        assert_eq!(seen[0].resource, "opportunities");
        assert_eq!(
            seen[0].filter.get("deleted_at@is").map(String::as_str),
            Some("null")
        );
    }

    #[tokio::test]
    async fn soft_delete_issues_a_patch_with_a_deletion_timestamp() {
        let transport = ScriptedTransport::new(vec![]);
        let core = core(Arc::clone(&transport));

        core.delete(EntityKind::Contacts, Ident::Int(7), &CancellationToken::new())
            .await
            .unwrap();

        let seen = transport.seen();
        assert_eq!(seen[0].method, Method::Patch);
        assert_eq!(seen[0].resource, "contacts");
        assert_eq!(seen[0].filter.get("id").map(String::as_str), Some("7"));
        let marker = seen[0].payload.as_ref().unwrap();
        assert!(marker[DELETED_AT].is_string());
    }

    #[tokio::test]
    async fn hard_delete_is_used_for_kinds_without_soft_delete() {
        let transport = ScriptedTransport::new(vec![]);
        let core = core(Arc::clone(&transport));

        core.delete(EntityKind::Tags, Ident::Int(3), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(transport.seen()[0].method, Method::Delete);
    }

    #[tokio::test]
    async fn deleting_a_missing_record_succeeds() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::NotFound(
            "tags/9".into(),
        ))]);
        let core = core(Arc::clone(&transport));

        let result = core
            .delete(EntityKind::Tags, Ident::Int(9), &CancellationToken::new())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn get_many_tolerates_a_shortfall() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::of(vec![
            json!({ "id": 1 }),
        ]))]);
        let core = core(Arc::clone(&transport));

        let records = core
            .get_many(
                EntityKind::Tasks,
                &[Ident::Int(1), Ident::Int(2), Ident::Int(3)],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        let seen = transport.seen();
        assert_eq!(
            seen[0].filter.get("id@in").map(String::as_str),
            Some("(1,2,3)")
        );
    }

    #[tokio::test]
    async fn get_many_with_no_ids_makes_no_call() {
        let transport = ScriptedTransport::new(vec![]);
        let core = core(Arc::clone(&transport));

        let records = core
            .get_many(EntityKind::Tasks, &[], &CancellationToken::new())
            .await
            .unwrap();

        assert!(records.is_empty());
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn get_one_maps_an_empty_response_to_not_found() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::default())]);
        let core = core(Arc::clone(&transport));

        let result = core
            .get_one(EntityKind::Tasks, Ident::Int(42), &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(DataError::Permanent {
                source: TransportError::NotFound(_),
                ..
            })
        ));
    }
}
