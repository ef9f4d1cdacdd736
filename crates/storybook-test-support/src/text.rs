//! Test text models: mock `TextModel` implementations.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use storybook_core::error::GenerationError;
use storybook_core::model::TextModel;

/// A text model that answers with a short scene description derived from
/// the `Title:` line of its prompt. Can be told to fail for prompts that
/// contain a given needle.
#[derive(Debug, Default)]
pub struct EchoTextModel {
    prompts: Mutex<Vec<String>>,
    fail_when: Option<String>,
}

impl EchoTextModel {
    /// Create a model that never fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model that fails whenever the prompt contains `needle`.
    #[must_use]
    pub fn failing_when(needle: impl Into<String>) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail_when: Some(needle.into()),
        }
    }

    /// Number of calls received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Snapshot of every prompt received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextModel for EchoTextModel {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());

        if self
            .fail_when
            .as_deref()
            .is_some_and(|needle| prompt.contains(needle))
        {
            return Err(GenerationError::Upstream("text model timed out".into()));
        }

        let title = prompt
            .lines()
            .find_map(|line| line.trim().strip_prefix("Title:"))
            .map_or("an untitled scene", str::trim);

        Ok(format!(
            "A storybook illustration of {title}, characters with expressive faces."
        ))
    }
}

/// A text model that always fails.
#[derive(Debug, Default)]
pub struct FailingTextModel {
    calls: AtomicUsize,
}

impl FailingTextModel {
    /// Number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextModel for FailingTextModel {
    async fn generate_text(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GenerationError::Upstream("text model unavailable".into()))
    }
}
