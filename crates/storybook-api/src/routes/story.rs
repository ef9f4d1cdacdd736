//! Route for story generation.

use axum::body::Bytes;
use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::Deserialize;
use storybook_core::story::CompletedStory;
use storybook_generation::domain::commands::GenerateStory;
use tracing::{debug, info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /generate-story.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateStoryRequest {
    /// Free-text story idea.
    #[serde(default)]
    pub prompt: Option<String>,
}

impl GenerateStoryRequest {
    /// Parse a request body. An unreadable body is treated as a request
    /// without a prompt.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|err| {
            debug!(error = %err, "unreadable generate-story body");
            Self::default()
        })
    }
}

/// POST /generate-story
#[instrument(skip_all)]
async fn generate_story(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CompletedStory>, ApiError> {
    let request = GenerateStoryRequest::from_body(&body);
    let command = GenerateStory::new(request.prompt.as_deref())?;

    info!(correlation_id = %command.correlation_id, "handling generate_story command");

    let story = state.pipeline.handle_generate_story(&command).await?;

    Ok(Json(story))
}

/// Returns the story generation router.
pub fn router() -> Router<AppState> {
    Router::new().route("/generate-story", post(generate_story))
}
