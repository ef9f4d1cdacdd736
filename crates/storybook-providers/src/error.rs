//! Provider error types.

use reqwest::StatusCode;
use storybook_core::error::GenerationError;
use thiserror::Error;

/// Errors raised by the HTTP model adapters.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure, including timeouts.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("unexpected http status {status}: {body}")]
    HttpStatus {
        /// Response status.
        status: StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body could not be parsed.
    #[error("failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// An inline image payload could not be decoded.
    #[error("failed to decode image payload: {0}")]
    Decode(String),

    /// The adapter was configured with unusable values.
    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),

    /// The provider answered, but with nothing usable.
    #[error("provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Returns `true` for failures a later attempt may not hit: transport
    /// errors, timeouts, rate limits and server-side errors.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::HttpStatus { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::Json(_) | Self::Decode(_) | Self::InvalidConfig(_) | Self::EmptyResponse => false,
        }
    }
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::EmptyResponse => GenerationError::EmptyResponse,
            ProviderError::Json(e) => GenerationError::Schema(e.to_string()),
            other if other.is_transient() => GenerationError::Unavailable(other.to_string()),
            other => GenerationError::Upstream(other.to_string()),
        }
    }
}

/// Turn a non-success response into `ProviderError::HttpStatus`.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::HttpStatus { status, body })
}
