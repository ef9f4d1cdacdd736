//! Asset generation: one image call per prompt, re-encoded as a data URI.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use storybook_core::error::GenerationError;
use storybook_core::model::{ImageModel, ImageSize};
use storybook_core::story::{GeneratedAsset, ImagePrompt};
use tokio::sync::Semaphore;
use tokio_retry2::strategy::ExponentialBackoff;
use tokio_retry2::{Retry, RetryError};
use tracing::warn;

/// Retry policy for the image call of a single asset.
///
/// The default makes exactly one attempt: a failed image degrades the page
/// immediately. Only errors that report themselves as retryable are tried
/// again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// No retries.
    pub const NONE: Self = Self {
        max_retries: 0,
        base_delay: Duration::ZERO,
    };

    /// Retry up to `max_retries` times with exponential backoff.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// The delays between attempts: `base_delay`, `2 * base_delay`, ...
    #[must_use]
    pub fn backoff(&self) -> impl Iterator<Item = Duration> + use<> {
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let retries = usize::try_from(self.max_retries).unwrap_or(usize::MAX);
        // ExponentialBackoff yields factor * 2, factor * 4, ...
        ExponentialBackoff::from_millis(2)
            .factor(base_ms)
            .map(|delay| delay / 2)
            .take(retries)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::NONE
    }
}

/// Sniff the image mime type from its magic bytes.
#[must_use]
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/png",
    }
}

/// Encode raw image bytes as a `data:` URI.
#[must_use]
pub fn encode_data_uri(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", sniff_mime(bytes), BASE64.encode(bytes))
}

/// Generates one image for `prompt` and packages it for transport.
///
/// Each attempt holds a permit from `gate` only while the image call is in
/// flight, so backoff sleeps do not occupy a slot.
///
/// # Errors
///
/// Returns the first non-retryable error, the last retryable error once
/// the retry policy is exhausted, or `GenerationError::EmptyResponse` if
/// the model returned no bytes.
pub async fn generate_asset(
    prompt: &ImagePrompt,
    size: ImageSize,
    model: &dyn ImageModel,
    gate: &Semaphore,
    retry: &RetryPolicy,
) -> Result<GeneratedAsset, GenerationError> {
    debug_assert!(prompt.style_applied, "image prompt sent without style directive");

    let max_attempts = retry.max_retries.saturating_add(1);
    let mut attempt = 0u32;
    let bytes = Retry::spawn(retry.backoff(), || {
        attempt += 1;
        let attempt = attempt;
        async move {
            let Ok(_permit) = gate.acquire().await else {
                return Err(RetryError::Permanent(GenerationError::Task(
                    "asset gate closed".into(),
                )));
            };

            match model.generate_image(&prompt.text, size).await {
                Ok(bytes) if bytes.is_empty() => {
                    Err(RetryError::Permanent(GenerationError::EmptyResponse))
                }
                Ok(bytes) => Ok(bytes),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    warn!(attempt, max_attempts, error = %err, "image generation failed, retrying");
                    Err(RetryError::Transient {
                        err,
                        retry_after: None,
                    })
                }
                Err(err) => Err(RetryError::Permanent(err)),
            }
        }
    })
    .await?;

    Ok(GeneratedAsset {
        encoded_image: encode_data_uri(&bytes),
        source_prompt: prompt.text.clone(),
    })
}
