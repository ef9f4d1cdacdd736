//! Test image models: mock `ImageModel` implementations.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use storybook_core::error::GenerationError;
use storybook_core::model::{ImageModel, ImageSize};

/// The eight-byte PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// An image model that returns a tiny PNG-looking payload, records every
/// prompt, and tracks how many calls were in flight at once.
#[derive(Debug, Default)]
pub struct RecordingImageModel {
    prompts: Mutex<Vec<(String, ImageSize)>>,
    fail_when: Option<String>,
    latency: Option<Duration>,
    transient_failures: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingImageModel {
    /// Create a model that succeeds immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call whose prompt contains `needle`.
    #[must_use]
    pub fn failing_when(mut self, needle: impl Into<String>) -> Self {
        self.fail_when = Some(needle.into());
        self
    }

    /// Sleep for `latency` inside every call.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail the first `count` calls, then succeed.
    #[must_use]
    pub fn with_transient_failures(self, count: usize) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Number of calls received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Snapshot of every prompt received, in arrival order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(prompt, _)| prompt.clone())
            .collect()
    }

    /// Snapshot of every requested size, in arrival order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sizes(&self) -> Vec<ImageSize> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, size)| *size)
            .collect()
    }

    /// Highest number of calls observed in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageModel for RecordingImageModel {
    async fn generate_image(
        &self,
        prompt: &str,
        size: ImageSize,
    ) -> Result<Vec<u8>, GenerationError> {
        self.prompts.lock().unwrap().push((prompt.to_owned(), size));

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let transient = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if transient {
            return Err(GenerationError::Unavailable("image quota exceeded".into()));
        }

        if self
            .fail_when
            .as_deref()
            .is_some_and(|needle| prompt.contains(needle))
        {
            return Err(GenerationError::Upstream("image model rejected prompt".into()));
        }

        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(prompt.as_bytes());
        Ok(bytes)
    }
}

/// An image model that always fails.
#[derive(Debug, Default)]
pub struct FailingImageModel {
    calls: AtomicUsize,
}

impl FailingImageModel {
    /// Number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageModel for FailingImageModel {
    async fn generate_image(
        &self,
        _prompt: &str,
        _size: ImageSize,
    ) -> Result<Vec<u8>, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GenerationError::Unavailable("image model unavailable".into()))
    }
}
