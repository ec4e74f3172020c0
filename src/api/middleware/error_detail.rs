//! Exposes error debug detail outside production.
//!
//! [`AppError`](crate::error::AppError) responses always carry an
//! [`ErrorDetail`] extension. This layer either drops it or, when
//! `expose_error_details` is set, rewrites the JSON body to include it as
//! `stack`.

use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::{ErrorBody, ErrorDetail};
use crate::state::AppState;

pub async fn layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let Some(detail) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };

    if !state.expose_error_details {
        return response;
    }

    let body = ErrorBody {
        message: detail.message,
        stack: Some(detail.stack),
    };

    match serde_json::to_vec(&body) {
        Ok(bytes) => {
            let (mut parts, _) = response.into_parts();
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::error!("Failed to serialize error detail: {}", e);
            response
        }
    }
}
