//! Handler for short link redirects.

use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use url::Url;

use crate::api::handlers::not_found::not_found_page;
use crate::application::services::Resolution;
use crate::state::AppState;

/// Redirects a slug to its target and counts the click.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// # Responses
///
/// - **302 Found** with `Location` set to the target
/// - **404 Not Found** with the HTML not-found page, for unknown slugs,
///   undecodable path segments and any store failure
pub async fn redirect_handler(
    slug: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    uri: Uri,
) -> Response {
    let Ok(Path(slug)) = slug else {
        return not_found_page(uri.path()).into_response();
    };

    match state.redirect_resolver.resolve(&slug).await {
        Resolution::Redirect(target) => match location(&target) {
            Some(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
            None => {
                tracing::error!(%slug, %target, "Stored target is not a valid Location header");
                not_found_page(uri.path()).into_response()
            }
        },
        Resolution::NotFound => not_found_page(uri.path()).into_response(),
    }
}

/// Targets are stored as submitted. `url` re-serializes them so non-ASCII
/// characters leave percent-encoded.
fn location(target: &str) -> Option<HeaderValue> {
    Url::parse(target)
        .ok()
        .and_then(|url| HeaderValue::from_str(url.as_str()).ok())
        .or_else(|| HeaderValue::from_str(target).ok())
}
