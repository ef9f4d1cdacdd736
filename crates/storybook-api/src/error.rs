//! Storybook: API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use storybook_core::error::GenerationError;
use storybook_providers::ProviderError;
use thiserror::Error;
use tracing::error;

/// Startup errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A model provider could not be constructed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Client-facing error message.
    pub error: &'static str,
}

/// HTTP-layer wrapper around `GenerationError` that implements
/// `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub GenerationError);

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            GenerationError::Validation(_) => (StatusCode::BAD_REQUEST, "Prompt is required"),
            GenerationError::Upstream(_)
            | GenerationError::Unavailable(_)
            | GenerationError::Schema(_)
            | GenerationError::EmptyResponse
            | GenerationError::Task(_) => {
                error!(error = %self.0, "story generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate story")
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: GenerationError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(GenerationError::Validation("Prompt is required".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_upstream_maps_to_500() {
        assert_eq!(
            status_of(GenerationError::Upstream("connection refused".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_schema_violation_maps_to_500() {
        assert_eq!(
            status_of(GenerationError::Schema("missing pages".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_empty_response_and_task_failure_map_to_500() {
        assert_eq!(
            status_of(GenerationError::EmptyResponse),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(GenerationError::Task("panicked".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
