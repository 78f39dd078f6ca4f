//! In-process sliding-window limiter for verification attempts, keyed by client IP.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Length of the window the per-minute budget applies to.
pub const VERIFY_WINDOW: Duration = Duration::from_secs(60);

/// Attempts per client inside a sliding [`VERIFY_WINDOW`].
///
/// Clones share the same counters. A budget of 0 disables limiting.
#[derive(Debug, Clone)]
pub struct VerifyRateLimiter {
    attempts: Arc<DashMap<String, Vec<Instant>>>,
    max_attempts: u32,
    window: Duration,
}

impl VerifyRateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            window,
        }
    }

    pub fn per_minute(max_attempts: u32) -> Self {
        Self::new(max_attempts, VERIFY_WINDOW)
    }

    /// Record an attempt by `client` at `now`. Returns `false` once the window is full;
    /// rejected attempts do not count against the budget.
    pub fn try_acquire(&self, client: &str, now: Instant) -> bool {
        if self.max_attempts == 0 {
            return true;
        }
        let mut seen = self.attempts.entry(client.to_owned()).or_default();
        seen.retain(|at| now.saturating_duration_since(*at) < self.window);
        if seen.len() >= self.max_attempts as usize {
            return false;
        }
        seen.push(now);
        true
    }

    /// Drop clients with no attempt inside the window.
    pub fn evict_idle(&self, now: Instant) {
        self.attempts.retain(|_, seen| {
            seen.retain(|at| now.saturating_duration_since(*at) < self.window);
            !seen.is_empty()
        });
    }

    /// Clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.attempts.len()
    }
}
