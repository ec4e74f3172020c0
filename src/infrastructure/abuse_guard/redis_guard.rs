//! Redis-backed abuse guard.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{info, warn};

use super::service::{AbuseGuard, ThrottlePolicy, Verdict};

/// Abuse guard whose counters live in Redis, shared by every worker.
///
/// Each client gets a fixed-window counter: the key is created with the
/// window as its TTL and incremented in the same `MULTI` block, so the count
/// and remaining time come back from a single round trip.
///
/// All operations are fail-open: if Redis errors, the request is allowed and
/// the error is logged.
pub struct RedisAbuseGuard {
    client: ConnectionManager,
    policy: ThrottlePolicy,
    key_prefix: String,
}

impl RedisAbuseGuard {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns a [`redis::RedisError`] if the URL is invalid, the connection
    /// cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, policy: ThrottlePolicy) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;

        let mut test_conn = manager.clone();
        test_conn.ping::<()>().await?;

        info!("Connected to Redis for creation throttling");

        Ok(Self {
            client: manager,
            policy,
            key_prefix: "throttle:create:".to_string(),
        })
    }

    fn build_key(&self, client_id: &str) -> String {
        format!("{}{}", self.key_prefix, client_id)
    }
}

#[async_trait]
impl AbuseGuard for RedisAbuseGuard {
    async fn classify(&self, client_id: &str) -> Verdict {
        let key = self.build_key(client_id);
        let window_ms = self.policy.window.as_millis().max(1) as u64;
        let mut conn = self.client.clone();

        let result: redis::RedisResult<(u32, i64)> = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&key)
            .arg(0)
            .arg("PX")
            .arg(window_ms)
            .arg("NX")
            .ignore()
            .incr(&key, 1)
            .pttl(&key)
            .query_async(&mut conn)
            .await;

        match result {
            Ok((hits, ttl_ms)) => {
                let remaining = Duration::from_millis(ttl_ms.max(0) as u64);
                self.policy.verdict(hits, remaining)
            }
            Err(e) => {
                warn!(client = %client_id, "Redis throttle error, allowing request: {}", e);
                Verdict::Allow
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
