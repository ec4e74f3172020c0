//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`          - Static index page
//! - `GET  /static/*`  - Static assets
//! - `GET  /health`    - Health check: store and abuse guard
//! - `POST /url`       - Create a short link
//! - `GET  /{slug}`    - Short link redirect
//! - anything else     - HTML not-found page
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Security headers** - CORS for any origin and a same-origin CSP
//! - **Error detail** - Adds `stack` to JSON errors outside production
//! - **Creation throttle** - On `POST /url` only
//! - **Flood protection** - Per-IP token bucket on `GET /{slug}`

use std::path::Path;

use axum::handler::HandlerWithoutStateExt;
use axum::{Router, middleware};
use tower_http::services::{ServeDir, ServeFile};

use crate::api;
use crate::api::handlers::not_found_handler;
use crate::api::middleware::{error_detail, security, tracing};
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `static_dir` - directory holding `index.html` and the assets served
///   under `/static`
pub fn app_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let static_dir = static_dir.as_ref();
    let assets = ServeDir::new(static_dir).not_found_service(not_found_handler.into_service());

    Router::new()
        .merge(api::routes::api_routes(state.clone()))
        .merge(api::routes::redirect_routes(state.behind_proxy))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", assets)
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error_detail::layer,
        ))
        .layer(security::content_security_policy())
        .layer(security::cors())
        .layer(tracing::layer())
        .with_state(state)
}
