//! Generation error types.

use thiserror::Error;

/// Top-level error type for story generation.
///
/// Whether an error is fatal depends on where it is raised: the pipeline
/// aborts on errors from validation and outline generation, and absorbs
/// errors from asset generation into page-local state.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request failed validation before any model was called.
    #[error("validation error: {0}")]
    Validation(String),

    /// An upstream model call failed in a way that will not go away on
    /// its own (bad request, rejected credentials, refused prompt).
    #[error("upstream model error: {0}")]
    Upstream(String),

    /// The upstream model is temporarily unreachable or overloaded
    /// (transport failure, timeout, rate limit, 5xx).
    #[error("upstream model unavailable: {0}")]
    Unavailable(String),

    /// The model answered, but the payload does not satisfy the story schema.
    #[error("schema violation: {0}")]
    Schema(String),

    /// The model answered with nothing usable.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// A spawned generation task could not be joined.
    #[error("task failure: {0}")]
    Task(String),
}

impl GenerationError {
    /// Returns `true` if the error was raised before any upstream call.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` if repeating the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
