//! The HTML not-found page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
};

/// Renders `templates/not_found.html`.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub path: String,
}

/// Builds a 404 response carrying the not-found page for `path`.
pub fn not_found_page(path: &str) -> (StatusCode, NotFoundTemplate) {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            path: path.to_string(),
        },
    )
}

/// Fallback for unknown paths and unsupported methods.
pub async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    not_found_page(uri.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_page_owns_path() {
        let (status, page) = {
            let path = String::from("/missing");
            not_found_page(&path)
        };

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(page.path, "/missing");
    }

    #[tokio::test]
    async fn test_not_found_handler_renders_404() {
        let uri: Uri = "/nope?x=1".parse().unwrap();

        let response = not_found_handler(uri).await.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
