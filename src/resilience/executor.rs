//! # Resilient Executor
//!
//! Wraps a single remote call in the retry state machine:
//!
//! ```text
//! ┌────────────┐ transient ┌─────────┐  deadline  ┌────────────┐
//! │ Attempting │──────────▶│ Waiting │───────────▶│ Attempting │ ...
//! └────────────┘           └─────────┘            └────────────┘
//!       │ success / permanent / cap reached
//!       ▼
//!     Done
//! ```
//!
//! Permanent errors return immediately. Rate-limit errors feed their
//! retry-after hint into the shared cooldown before waiting; network errors
//! wait on exponential backoff with jitter. Every wait is bounded by the
//! attempt cap, and the wait itself is the later of the computed backoff and
//! the shared cooldown deadline. Cancellation aborts a pending wait at once.

use crate::config::ExecutorConfig;
use crate::entity::{EntityKind, Ident};
use crate::error::{DataError, ErrorClass, TransportError};
use crate::resilience::rate_limit::SharedRateLimit;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Identifying context attached to terminal errors and log lines.
#[derive(Debug, Clone)]
pub struct ExecContext {
    pub entity: EntityKind,
    pub operation: &'static str,
    pub id: Option<Ident>,
}

impl ExecContext {
    pub fn new(entity: EntityKind, operation: &'static str) -> Self {
        Self {
            entity,
            operation,
            id: None,
        }
    }

    pub fn with_id(mut self, id: Ident) -> Self {
        self.id = Some(id);
        self
    }
}

/// Executes transport thunks under the configured retry policy. Stateless
/// between calls except for the shared rate-limit cooldown.
#[derive(Clone)]
pub struct RetryExecutor {
    config: ExecutorConfig,
    rate_limit: SharedRateLimit,
}

impl RetryExecutor {
    pub fn new(config: ExecutorConfig, rate_limit: SharedRateLimit) -> Self {
        Self { config, rate_limit }
    }

    pub fn rate_limit(&self) -> &SharedRateLimit {
        &self.rate_limit
    }

    /// Run `thunk` until success, a permanent failure, cancellation, or the
    /// attempt cap. The thunk is re-invoked for each attempt.
    pub async fn execute<F, Fut, T>(
        &self,
        ctx: &ExecContext,
        cancel: &CancellationToken,
        mut thunk: F,
    ) -> Result<T, DataError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut attempt: u32 = 1;

        loop {
            if cancel.is_cancelled() {
                return Err(DataError::Cancelled);
            }

            let error = match thunk().await {
                Ok(value) => {
                    debug!(
                        entity = %ctx.entity,
                        operation = ctx.operation,
                        attempt,
                        "call succeeded"
                    );
                    return Ok(value);
                }
                Err(error) => error,
            };

            match error.class() {
                ErrorClass::Permanent => {
                    warn!(
                        entity = %ctx.entity,
                        operation = ctx.operation,
                        attempt,
                        error = %error,
                        "permanent failure, not retrying"
                    );
                    return Err(DataError::Permanent {
                        entity: ctx.entity,
                        operation: ctx.operation,
                        id: ctx.id.clone(),
                        source: error,
                    });
                }
                ErrorClass::RateLimited => {
                    if let TransportError::RateLimited {
                        retry_after: Some(hint),
                    } = &error
                    {
                        self.rate_limit.observe_rate_limit(*hint);
                    }
                    warn!(
                        entity = %ctx.entity,
                        operation = ctx.operation,
                        attempt,
                        "rate limited"
                    );
                }
                ErrorClass::Network => {
                    warn!(
                        entity = %ctx.entity,
                        operation = ctx.operation,
                        attempt,
                        error = %error,
                        "transient network failure"
                    );
                }
            }

            if attempt >= self.config.max_attempts {
                return Err(DataError::RetriesExhausted {
                    entity: ctx.entity,
                    operation: ctx.operation,
                    attempts: attempt,
                    source: error,
                });
            }

            // Waiting: the later of the computed backoff and the shared
            // cooldown, abortable by cancellation.
            let backoff = self.backoff_delay(attempt);
            let wait = match self.rate_limit.cooldown_remaining() {
                Some(cooldown) => cooldown.max(backoff),
                None => backoff,
            };
            debug!(
                entity = %ctx.entity,
                operation = ctx.operation,
                attempt,
                wait_ms = wait.as_millis() as u64,
                "waiting before retry"
            );
            tokio::select! {
                _ = cancel.cancelled() => return Err(DataError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }

            attempt += 1;
        }
    }

    /// Exponential backoff with bounded jitter, capped at the configured
    /// ceiling.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        // Computed in f64 milliseconds and capped before constructing the
        // Duration: the uncapped product overflows Duration within a few
        // dozen attempts, and high attempt caps are valid configuration.
        let factor = self
            .config
            .backoff_multiplier
            .powi(attempt.saturating_sub(1).min(i32::MAX as u32) as i32);
        let uncapped_ms = self.config.base_delay_ms as f64 * factor;
        let delay = if uncapped_ms.is_finite() && uncapped_ms < self.config.max_delay_ms as f64 {
            Duration::from_millis(uncapped_ms as u64)
        } else {
            self.config.max_delay()
        };

        let jittered = if self.config.jitter_factor > 0.0 {
            let jitter = fastrand::f64() * self.config.jitter_factor;
            delay.mul_f64(1.0 + jitter)
        } else {
            delay
        };

        jittered.min(self.config.max_delay())
    }
}
