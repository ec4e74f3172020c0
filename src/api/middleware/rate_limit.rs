//! Per-IP flood protection for the redirect route, using a token bucket.
//!
//! This is independent of the creation throttle in
//! [`crate::api::middleware::abuse_guard`].

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::{GovernorConfig, GovernorConfigBuilder},
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

const PER_SECOND: u64 = 2;
const BURST_SIZE: u32 = 100;

/// Token bucket keyed by the socket peer address.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn layer() -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>
{
    GovernorLayer::new(config(PeerIpKeyExtractor))
}

/// Same limits, keyed by `X-Forwarded-For` / `X-Real-IP` / `Forwarded`
/// before falling back to the peer address. Use only behind a trusted proxy.
pub fn proxied_layer()
-> GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    GovernorLayer::new(config(SmartIpKeyExtractor))
}

fn config<K: KeyExtractor>(extractor: K) -> Arc<GovernorConfig<K, NoOpMiddleware<QuantaInstant>>> {
    Arc::new(
        GovernorConfigBuilder::default()
            .per_second(PER_SECOND)
            .burst_size(BURST_SIZE)
            .key_extractor(extractor)
            .finish()
            .expect("non-zero rate and burst always build a governor config"),
    )
}
