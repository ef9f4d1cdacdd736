//! Test structured models: mock `StructuredModel` implementations.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use storybook_core::error::GenerationError;
use storybook_core::model::StructuredModel;

/// A structured model that returns the same JSON value on every call and
/// records the prompts and schemas it was given.
#[derive(Debug)]
pub struct StaticStructuredModel {
    value: serde_json::Value,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, serde_json::Value)>>,
}

impl StaticStructuredModel {
    /// Create a model that always answers with `value`.
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self {
            value,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every `(prompt, schema)` pair received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<(String, serde_json::Value)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredModel for StaticStructuredModel {
    async fn generate_object(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((prompt.to_owned(), schema.clone()));
        Ok(self.value.clone())
    }
}

/// A structured model that always fails with an upstream error.
#[derive(Debug, Default)]
pub struct FailingStructuredModel {
    calls: AtomicUsize,
}

impl FailingStructuredModel {
    /// Number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StructuredModel for FailingStructuredModel {
    async fn generate_object(
        &self,
        _prompt: &str,
        _schema: &serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GenerationError::Upstream("structured model unavailable".into()))
    }
}
