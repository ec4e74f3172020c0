//! Throttling for the slug-creation path.
//!
//! Provides an [`AbuseGuard`] trait with two implementations:
//! - [`MemoryAbuseGuard`] - Per-process counters (governor + dashmap)
//! - [`RedisAbuseGuard`] - Shared counters for multi-worker deployments

mod memory_guard;
mod redis_guard;
mod service;

pub use memory_guard::MemoryAbuseGuard;
pub use redis_guard::RedisAbuseGuard;
pub use service::{AbuseGuard, ThrottlePolicy, Verdict};
