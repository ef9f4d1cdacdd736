//! Shared application state.

use std::sync::Arc;

use storybook_generation::application::pipeline::StoryPipeline;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The story pipeline, including its process-wide asset gate.
    pub pipeline: Arc<StoryPipeline>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(pipeline: StoryPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
