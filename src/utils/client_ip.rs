//! Client identity extraction for per-client throttling.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Identity used when no address information is available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolves the identity of the calling client.
///
/// When `behind_proxy` is set, the first address in `X-Forwarded-For`, then
/// `X-Real-IP`, takes precedence over the socket peer. Enable it only when
/// a trusted reverse proxy sets these headers.
pub fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy && let Some(forwarded) = forwarded_ip(headers) {
        return forwarded;
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let from_forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let from_real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    from_forwarded_for.or_else(from_real_ip).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.7:41000".parse().unwrap())
    }

    #[test]
    fn test_uses_peer_address() {
        let headers = HeaderMap::new();
        assert_eq!(client_id(&headers, peer(), false), "10.0.0.7");
    }

    #[test]
    fn test_ignores_forwarded_headers_without_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));

        assert_eq!(client_id(&headers, peer(), false), "10.0.0.7");
    }

    #[test]
    fn test_uses_first_forwarded_for_entry_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );

        assert_eq!(client_id(&headers, peer(), true), "203.0.113.9");
    }

    #[test]
    fn test_falls_back_to_real_ip_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));

        assert_eq!(client_id(&headers, peer(), true), "198.51.100.4");
    }

    #[test]
    fn test_unknown_without_any_source() {
        let headers = HeaderMap::new();
        assert_eq!(client_id(&headers, None, true), UNKNOWN_CLIENT);
    }
}
