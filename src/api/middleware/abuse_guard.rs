//! Creation throttle middleware.
//!
//! Runs on `POST /url` before the body is parsed, so rejected clients never
//! reach validation or the store.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::infrastructure::abuse_guard::Verdict;
use crate::state::AppState;
use crate::utils::client_ip::client_id;

/// Classifies the caller and rejects, delays or passes the request through.
///
/// # Errors
///
/// Returns [`AppError::RateLimited`] (429 with `Retry-After`) when the
/// client is over the hard cap.
///
/// # Example
///
/// ```rust,ignore
/// let create = post(create_link_handler)
///     .route_layer(middleware::from_fn_with_state(state.clone(), abuse_guard::layer));
/// ```
pub async fn layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_id(req.headers(), peer, state.behind_proxy);

    match state.abuse_guard.classify(&client).await {
        Verdict::Allow => {}
        Verdict::Delay(delay) => {
            debug!(%client, delay_ms = delay.as_millis() as u64, "Delaying creation request");
            tokio::time::sleep(delay).await;
        }
        Verdict::Reject { retry_after } => {
            warn!(%client, retry_after_secs = retry_after.as_secs(), "Creation throttle rejected request");
            return Err(AppError::rate_limited(retry_after));
        }
    }

    Ok(next.run(req).await)
}
