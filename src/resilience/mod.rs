//! # Resilience Module
//!
//! Retry, backoff and rate-limit coordination for every remote call the core
//! issues. A single [`RetryExecutor`] wraps the transport: permanent failures
//! fail fast, transient failures wait and retry up to a bounded attempt cap,
//! and rate-limit observations feed a process-wide cooldown shared by all
//! in-flight calls.
//!
//! ## Architecture
//!
//! - **Retry Executor**: Per-call state machine (attempting → waiting →
//!   attempting → ... → done/exhausted) with exponential backoff and jitter
//! - **Rate Limit State**: Shared, monotonic cooldown deadline written on
//!   every rate-limit observation and read without blocking
//! - **Cancellation**: Callers can abort an in-flight call; a pending
//!   backoff sleep is interrupted immediately and no further attempt is made
//!
//! ## Usage
//!
//! ```rust,no_run
//! use crm_data_core::config::ExecutorConfig;
//! use crm_data_core::entity::EntityKind;
//! use crm_data_core::error::TransportError;
//! use crm_data_core::resilience::{ExecContext, InMemoryRateLimitState, RetryExecutor};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = RetryExecutor::new(
//!     ExecutorConfig::default(),
//!     Arc::new(InMemoryRateLimitState::new()),
//! );
//!
//! let ctx = ExecContext::new(EntityKind::Contacts, "get_list");
//! let cancel = CancellationToken::new();
//! let result = executor
//!     .execute(&ctx, &cancel, || async {
//!         Ok::<_, TransportError>("response")
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod executor;
pub mod rate_limit;

pub use executor::{ExecContext, RetryExecutor};
pub use rate_limit::{InMemoryRateLimitState, RateLimitState, SharedRateLimit};
