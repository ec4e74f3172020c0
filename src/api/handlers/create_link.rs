//! Handler for the link creation endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::link::{CreateLinkRequest, ShortLinkResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /url`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com", "slug": "my-link" }
/// ```
///
/// `slug` is optional; one is generated when it is missing or blank.
///
/// # Response
///
/// ```json
/// {
///   "id": 1,
///   "slug": "my-link",
///   "url": "https://example.com",
///   "clicks": 0,
///   "createdAt": "2024-01-15T10:30:00Z",
///   "updatedAt": "2024-01-15T10:30:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 for malformed JSON, an invalid URL or slug, or a link back to this service
/// - 409 if the slug is taken
/// - 429 when the creation throttle rejects the client (see
///   [`crate::api::middleware::abuse_guard`])
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<Json<ShortLinkResponse>, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Request body must be a JSON object with a url field",
            json!({ "reason": rejection.body_text() }),
        )
    })?;

    let payload = payload.trimmed();
    payload.validate()?;

    let link = state
        .link_service
        .create_link(&payload.url, payload.slug.as_deref())
        .await?;

    Ok(Json(link.into()))
}
