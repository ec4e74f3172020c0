//! Abuse guard trait, verdicts, and the shared throttle policy.

use async_trait::async_trait;
use std::time::Duration;

/// Outcome of classifying one creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Proceed immediately.
    Allow,
    /// Proceed after waiting this long.
    Delay(Duration),
    /// Refuse; the client may retry after this long.
    Reject { retry_after: Duration },
}

/// Two throttles sharing one rolling window.
///
/// - **Delay**: once a client has made more than `delay_after` requests in
///   the window, each further request waits `delay_step` times the excess,
///   capped at `max_delay`.
/// - **Hard cap**: more than `max_requests` requests in the window are
///   rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub window: Duration,
    pub max_requests: u32,
    pub delay_after: u32,
    pub delay_step: Duration,
    pub max_delay: Duration,
}

impl Default for ThrottlePolicy {
    /// One creation per 30 seconds, slowing down from the second request.
    fn default() -> Self {
        Self {
            window: Duration::from_secs(30),
            max_requests: 1,
            delay_after: 1,
            delay_step: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl ThrottlePolicy {
    /// Delay owed by the `hits`-th request of a window.
    pub fn delay_for(&self, hits: u32) -> Verdict {
        if hits <= self.delay_after {
            return Verdict::Allow;
        }

        let excess = hits - self.delay_after;
        let delay = self.delay_step.saturating_mul(excess).min(self.max_delay);

        if delay.is_zero() {
            Verdict::Allow
        } else {
            Verdict::Delay(delay)
        }
    }

    /// Combines both throttles for a window counter.
    ///
    /// `remaining` is the time left in the current window.
    pub fn verdict(&self, hits: u32, remaining: Duration) -> Verdict {
        if hits > self.max_requests {
            return Verdict::Reject {
                retry_after: remaining,
            };
        }

        self.delay_for(hits)
    }
}

/// Classifies creation requests per client.
///
/// Call sites depend only on this trait, so the backing counters can move
/// from process memory to a shared store without touching them.
///
/// # Implementations
///
/// - [`crate::infrastructure::abuse_guard::MemoryAbuseGuard`] - In-process counters
/// - [`crate::infrastructure::abuse_guard::RedisAbuseGuard`] - Redis-backed counters
#[async_trait]
pub trait AbuseGuard: Send + Sync {
    /// Records one request from `client_id` and classifies it.
    async fn classify(&self, client_id: &str) -> Verdict;

    /// Checks if the backing counter store is reachable.
    async fn health_check(&self) -> bool;

    /// Short backend name for health reports.
    fn backend(&self) -> &'static str;
}
