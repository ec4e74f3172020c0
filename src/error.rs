//! Application error taxonomy and its HTTP mapping.
//!
//! Every write-path failure is an [`AppError`] variant. The variant alone
//! decides the status code; the JSON body is always `{message, stack?}`.
//! The `stack` field is attached later by
//! [`crate::api::middleware::error_detail`] when the service is not running
//! in production mode.

use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use validator::ValidationErrors;

/// JSON error body returned to API callers.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Debug detail carried in response extensions so the error-detail
/// middleware can expose it outside production.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    pub stack: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed input: bad JSON, non-URL target, bad slug characters.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Well-formed input rejected by service policy.
    #[error("{message}")]
    Policy { message: String, details: Value },

    /// The slug already exists in the store.
    #[error("Slug in use.")]
    DuplicateSlug { slug: String },

    /// The client exceeded the creation throttle.
    #[error("Too many requests, please try again later.")]
    RateLimited { retry_after: Duration },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// A backing service could not be reached; the operation was not applied.
    #[error("{message}")]
    Unavailable { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn policy(message: impl Into<String>, details: Value) -> Self {
        Self::Policy {
            message: message.into(),
            details,
        }
    }

    pub fn duplicate_slug(slug: impl Into<String>) -> Self {
        Self::DuplicateSlug { slug: slug.into() }
    }

    pub fn rate_limited(retry_after: Duration) -> Self {
        Self::RateLimited { retry_after }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Maps each error kind to its HTTP status.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::Policy { .. } => StatusCode::BAD_REQUEST,
            AppError::DuplicateSlug { .. } => StatusCode::CONFLICT,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true for failures where the store never applied the operation
    /// and a retry is safe.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Unavailable { .. })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        let detail = ErrorDetail {
            message: message.clone(),
            stack: format!("{:#?}", self),
        };

        let body = ErrorBody {
            message,
            stack: None,
        };

        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited { retry_after } = &self {
            let seconds = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response.extensions_mut().insert(detail);
        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => AppError::unavailable(
                "Storage temporarily unavailable",
                json!({ "reason": e.to_string() }),
            ),
            sqlx::Error::RowNotFound => AppError::not_found("Record not found", json!({})),
            other => AppError::internal("Database error", json!({ "reason": other.to_string() })),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.keys().cloned().collect();
        fields.sort();

        let message = fields
            .first()
            .and_then(|field| {
                field_errors.get(field).and_then(|list| list.first()).map(|err| {
                    err.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field))
                })
            })
            .unwrap_or_else(|| "Invalid request".to_string());

        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));

        AppError::bad_request(message, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::bad_request("bad", json!({})).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::policy("nope", json!({})).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::duplicate_slug("abc").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::rate_limited(Duration::from_secs(3)).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::not_found("gone", json!({})).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::unavailable("down", json!({})).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::internal("boom", json!({})).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_duplicate_slug_message() {
        assert_eq!(AppError::duplicate_slug("abc").to_string(), "Slug in use.");
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AppError::rate_limited(Duration::from_millis(2500)).into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "3");
    }

    #[test]
    fn test_rate_limited_retry_after_is_at_least_one_second() {
        let response = AppError::rate_limited(Duration::ZERO).into_response();

        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "1");
    }

    #[test]
    fn test_response_carries_error_detail() {
        let response = AppError::internal("Database error", json!({"reason": "x"})).into_response();

        let detail = response.extensions().get::<ErrorDetail>().unwrap();
        assert_eq!(detail.message, "Database error");
        assert!(detail.stack.contains("Internal"));
    }

    #[test]
    fn test_pool_timeout_is_transient() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);

        assert!(err.is_transient());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_validation_errors_use_field_message() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "url",
            ValidationError::new("url").with_message("url must be a valid URL".into()),
        );

        let err = AppError::from(errors);

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.to_string(), "url must be a valid URL");
    }
}
