//! API route configuration.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::api::handlers::{
    create_link_handler, health_handler, not_found_handler, redirect_handler,
};
use crate::api::middleware::{abuse_guard, rate_limit};
use crate::state::AppState;

/// Link creation and health.
///
/// # Endpoints
///
/// - `POST /url`    - Create a short link (creation throttle applies)
/// - `GET  /health` - Component health
///
/// Other methods on these paths fall through to the not-found page.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let create = post(create_link_handler)
        .route_layer(middleware::from_fn_with_state(state, abuse_guard::layer))
        .fallback(not_found_handler);

    Router::new()
        .route("/url", create)
        .route("/health", get(health_handler).fallback(not_found_handler))
}

/// `GET /{slug}` behind per-IP flood protection.
pub fn redirect_routes(behind_proxy: bool) -> Router<AppState> {
    let router = Router::new().route(
        "/{slug}",
        get(redirect_handler).fallback(not_found_handler),
    );

    if behind_proxy {
        router.layer(rate_limit::proxied_layer())
    } else {
        router.layer(rate_limit::layer())
    }
}
