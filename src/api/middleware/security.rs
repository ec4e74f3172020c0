//! Response headers applied to every route: permissive CORS and a
//! same-origin Content-Security-Policy.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

/// Policy sent with every response that does not already set one.
///
/// The bundled pages load their script, stylesheet and images from
/// `/static`, so nothing outside the origin is allowed.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self'; \
     style-src 'self'; img-src 'self'; font-src 'self'; object-src 'none'; \
     base-uri 'self'; frame-ancestors 'self'";

/// Allows cross-origin calls from any origin.
///
/// Preflight requests are answered by the layer itself; request headers
/// listed in `Access-Control-Request-Headers` are mirrored back.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/url", post(create_link_handler))
///     .layer(security::cors());
/// ```
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}

/// Sets `Content-Security-Policy` unless the handler set its own.
pub fn content_security_policy() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    )
}
