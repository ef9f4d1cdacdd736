//! Commands for story generation.

use storybook_core::error::GenerationError;
use storybook_core::story::StoryRequest;
use uuid::Uuid;

/// Command to generate a complete illustrated story.
#[derive(Debug, Clone)]
pub struct GenerateStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The validated request.
    pub request: StoryRequest,
}

impl GenerateStory {
    /// Validate a raw prompt and wrap it in a command with a fresh
    /// correlation ID.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Validation` if the prompt is missing or
    /// blank.
    pub fn new(prompt: Option<&str>) -> Result<Self, GenerationError> {
        Ok(Self {
            correlation_id: Uuid::new_v4(),
            request: StoryRequest::new(prompt)?,
        })
    }
}
