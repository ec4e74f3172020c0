//! HTTP middleware for request processing and protection.
//!
//! Provides the creation throttle, error detail exposure, flood protection,
//! security headers and request tracing.

pub mod abuse_guard;
pub mod error_detail;
pub mod rate_limit;
pub mod security;
pub mod tracing;
