//! Shared rate-limit cooldown state.
//!
//! Every in-flight call reads this state when it enters its waiting phase and
//! writes it when the backend reports a rate limit. The deadline is a single
//! scalar, so the whole coordination protocol is one atomic max-update: the
//! cooldown never moves earlier, reads never block, and concurrent observers
//! with different hints converge on the latest deadline.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Injectable cooldown state. The in-memory implementation below is the
/// default; a distributed implementation can substitute as long as it keeps
/// the monotonic-update contract.
pub trait RateLimitState: Send + Sync {
    /// Time remaining until the cooldown deadline, if one is set and still in
    /// the future. Must not block.
    fn cooldown_remaining(&self) -> Option<Duration>;

    /// Record a rate-limit observation: extend the shared deadline to at
    /// least `now + hint`. Monotonic; never shortens a deadline set by a
    /// concurrent call.
    fn observe_rate_limit(&self, hint: Duration);

    /// Last hint observed, for diagnostics.
    fn last_hint(&self) -> Option<Duration>;
}

pub type SharedRateLimit = Arc<dyn RateLimitState>;

/// Process-local cooldown state backed by a single atomic deadline.
#[derive(Debug)]
pub struct InMemoryRateLimitState {
    /// Reference point for the deadline encoding.
    epoch: Instant,
    /// Cooldown deadline in milliseconds since `epoch`; 0 means unset.
    deadline_ms: AtomicU64,
    /// Diagnostics only; not part of the coordination protocol.
    last_hint: Mutex<Option<Duration>>,
}

impl InMemoryRateLimitState {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            deadline_ms: AtomicU64::new(0),
            last_hint: Mutex::new(None),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

impl Default for InMemoryRateLimitState {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitState for InMemoryRateLimitState {
    fn cooldown_remaining(&self) -> Option<Duration> {
        let deadline = self.deadline_ms.load(Ordering::Acquire);
        let now = self.now_ms();
        if deadline > now {
            Some(Duration::from_millis(deadline - now))
        } else {
            None
        }
    }

    fn observe_rate_limit(&self, hint: Duration) {
        let target = self.now_ms().saturating_add(hint.as_millis() as u64);
        // fetch_max is the single atomic update: concurrent observers end up
        // with the later of their deadlines.
        self.deadline_ms.fetch_max(target, Ordering::AcqRel);
        *self.last_hint.lock() = Some(hint);
    }

    fn last_hint(&self) -> Option<Duration> {
        *self.last_hint.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_no_cooldown() {
        let state = InMemoryRateLimitState::new();
        assert_eq!(state.cooldown_remaining(), None);
        assert_eq!(state.last_hint(), None);
    }

    #[test]
    fn observation_sets_deadline_near_hint() {
        let state = InMemoryRateLimitState::new();
        state.observe_rate_limit(Duration::from_secs(10));

        let remaining = state.cooldown_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining > Duration::from_secs(9));
        assert_eq!(state.last_hint(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn deadline_is_monotonic_across_observers() {
        let state = InMemoryRateLimitState::new();
        state.observe_rate_limit(Duration::from_secs(30));
        // A later, shorter hint must not pull the deadline earlier.
        state.observe_rate_limit(Duration::from_secs(1));

        let remaining = state.cooldown_remaining().unwrap();
        assert!(remaining > Duration::from_secs(20));
    }

    #[test]
    fn concurrent_observers_converge_on_later_deadline() {
        let state = Arc::new(InMemoryRateLimitState::new());
        let handles: Vec<_> = [5u64, 60, 15]
            .into_iter()
            .map(|secs| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    state.observe_rate_limit(Duration::from_secs(secs));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let remaining = state.cooldown_remaining().unwrap();
        assert!(remaining > Duration::from_secs(50));
    }
}
