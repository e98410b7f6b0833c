use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::image_client::ImageApiError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("AI provider not configured")]
    ProviderNotConfigured,

    #[error("Image generation error: {0}")]
    ImageGeneration(String),
}

impl From<ImageApiError> for AppError {
    fn from(e: ImageApiError) -> Self {
        match e {
            ImageApiError::NotConfigured => AppError::ProviderNotConfigured,
            ImageApiError::Api { message, .. } => AppError::ImageGeneration(message),
            other => AppError::ImageGeneration(other.to_string()),
        }
    }
}

/// Whole minutes until `retry_after`, never less than one.
fn minutes_until(retry_after: Duration) -> u64 {
    retry_after.as_secs().div_ceil(60).max(1)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::RateLimited { retry_after } => {
                let minutes = minutes_until(*retry_after);
                let body = Json(json!({
                    "error": {
                        "code": "RATE_LIMITED",
                        "message": format!(
                            "Too many requests. Please try again in {minutes} minute{}.",
                            if minutes == 1 { "" } else { "s" }
                        )
                    }
                }));
                // Retry-After is in seconds, rounded up
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, secs.to_string())],
                    body,
                )
                    .into_response();
            }
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                "Method not allowed".to_string(),
            ),
            AppError::ProviderNotConfigured => {
                tracing::error!("Image request received but no API key is configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROVIDER_NOT_CONFIGURED",
                    "AI provider not configured.".to_string(),
                )
            }
            AppError::ImageGeneration(msg) => {
                tracing::error!("Image generation error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IMAGE_GENERATION_ERROR",
                    format!("Failed to generate image. {msg}"),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_round_up() {
        assert_eq!(minutes_until(Duration::from_secs(0)), 1);
        assert_eq!(minutes_until(Duration::from_secs(59)), 1);
        assert_eq!(minutes_until(Duration::from_secs(61)), 2);
        assert_eq!(minutes_until(Duration::from_secs(600)), 10);
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AppError::RateLimited {
            retry_after: Duration::from_millis(90_500),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "91");
    }

    #[test]
    fn test_not_configured_maps_to_provider_error() {
        let err: AppError = ImageApiError::NotConfigured.into();
        assert!(matches!(err, AppError::ProviderNotConfigured));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_api_message_is_kept() {
        let err: AppError = ImageApiError::Api {
            status: 400,
            message: "content policy".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::ImageGeneration(ref m) if m == "content policy"));
    }
}
