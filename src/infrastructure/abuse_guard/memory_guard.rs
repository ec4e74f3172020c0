//! In-process abuse guard.

use async_trait::async_trait;
use dashmap::DashMap;
use governor::clock::Clock;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tracing::debug;

use super::service::{AbuseGuard, ThrottlePolicy, Verdict};

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Abuse guard keeping its counters in process memory.
///
/// The hard cap is a keyed GCRA limiter (`max_requests` burst, refilled over
/// the window). The delay throttle counts hits per client in fixed windows.
/// Counters are per-process: with several workers each one enforces its own
/// budget. Use [`super::RedisAbuseGuard`] for a shared budget.
pub struct MemoryAbuseGuard {
    policy: ThrottlePolicy,
    limiter: DefaultKeyedRateLimiter<String>,
    windows: DashMap<String, Window>,
}

impl MemoryAbuseGuard {
    pub fn new(policy: ThrottlePolicy) -> Self {
        let burst = NonZeroU32::new(policy.max_requests.max(1)).unwrap_or(NonZeroU32::MIN);
        let period = (policy.window / burst.get()).max(Duration::from_nanos(1));
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst);

        Self {
            policy,
            limiter: RateLimiter::keyed(quota),
            windows: DashMap::new(),
        }
    }

    pub fn policy(&self) -> &ThrottlePolicy {
        &self.policy
    }

    /// Drops state for clients that have been quiet for a full window.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();

        let window = self.policy.window;
        self.windows.retain(|_, w| w.started.elapsed() < window);
        self.windows.shrink_to_fit();
    }

    /// Number of clients currently tracked by the delay throttle.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    fn record_hit(&self, client_id: &str) -> u32 {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(client_id.to_string())
            .or_insert(Window {
                started: now,
                hits: 0,
            });

        if now.duration_since(entry.started) >= self.policy.window {
            entry.started = now;
            entry.hits = 0;
        }

        entry.hits = entry.hits.saturating_add(1);
        entry.hits
    }
}

#[async_trait]
impl AbuseGuard for MemoryAbuseGuard {
    async fn classify(&self, client_id: &str) -> Verdict {
        let hits = self.record_hit(client_id);

        if let Err(not_until) = self.limiter.check_key(&client_id.to_string()) {
            let retry_after = not_until.wait_time_from(self.limiter.clock().now());
            debug!(client = %client_id, hits, ?retry_after, "hard cap reached");
            return Verdict::Reject { retry_after };
        }

        self.policy.delay_for(hits)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient_cap_policy() -> ThrottlePolicy {
        ThrottlePolicy {
            window: Duration::from_secs(30),
            max_requests: 5,
            delay_after: 1,
            delay_step: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }

    #[tokio::test]
    async fn test_default_policy_allows_one_then_rejects() {
        let guard = MemoryAbuseGuard::new(ThrottlePolicy::default());

        assert_eq!(guard.classify("1.2.3.4").await, Verdict::Allow);

        match guard.classify("1.2.3.4").await {
            Verdict::Reject { retry_after } => {
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= Duration::from_secs(30));
            }
            other => panic!("expected reject, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_clients_are_isolated() {
        let guard = MemoryAbuseGuard::new(ThrottlePolicy::default());

        assert_eq!(guard.classify("1.1.1.1").await, Verdict::Allow);
        assert_eq!(guard.classify("2.2.2.2").await, Verdict::Allow);
    }

    #[tokio::test]
    async fn test_delay_before_cap() {
        let guard = MemoryAbuseGuard::new(lenient_cap_policy());

        assert_eq!(guard.classify("c").await, Verdict::Allow);
        assert_eq!(
            guard.classify("c").await,
            Verdict::Delay(Duration::from_millis(500))
        );
        assert_eq!(
            guard.classify("c").await,
            Verdict::Delay(Duration::from_millis(1000))
        );
    }

    #[tokio::test]
    async fn test_cap_after_burst() {
        let guard = MemoryAbuseGuard::new(lenient_cap_policy());

        for _ in 0..5 {
            assert!(!matches!(
                guard.classify("c").await,
                Verdict::Reject { .. }
            ));
        }

        assert!(matches!(guard.classify("c").await, Verdict::Reject { .. }));
    }

    #[tokio::test]
    async fn test_prune_keeps_active_clients() {
        let guard = MemoryAbuseGuard::new(ThrottlePolicy::default());
        guard.classify("a").await;
        guard.classify("b").await;

        guard.prune();

        assert_eq!(guard.tracked_clients(), 2);
    }

    #[tokio::test]
    async fn test_prune_drops_expired_windows() {
        let guard = MemoryAbuseGuard::new(ThrottlePolicy {
            window: Duration::from_millis(20),
            ..ThrottlePolicy::default()
        });
        guard.classify("a").await;

        tokio::time::sleep(Duration::from_millis(40)).await;
        guard.prune();

        assert_eq!(guard.tracked_clients(), 0);
        assert_eq!(guard.classify("a").await, Verdict::Allow);
    }
}
