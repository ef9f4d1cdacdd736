//! Outline generation: prompt in, typed `StoryOutline` out.

use storybook_core::error::GenerationError;
use storybook_core::model::StructuredModel;
use storybook_core::story::{StoryOutline, StoryRequest};
use tracing::{debug, instrument};

use crate::domain::schema::{PAGE_COUNT, decode_outline, story_outline_schema};

/// Instruction sent to the structured model for a user prompt.
#[must_use]
pub fn outline_instruction(prompt: &str) -> String {
    format!(
        "Create a children's storybook based on this prompt: \"{prompt}\".\n\
         The story should have {min}-{max} pages, with each page having:\n\
         - A clear title\n\
         - 2-3 sentences of engaging content appropriate for children\n\
         - Characters involved in that scene\n\
         - Setting/location description\n\
         - Mood/atmosphere\n\
         \n\
         Number the pages from 1 in reading order.\n\
         Make it educational, fun, and age-appropriate for children aged 4-8 years.",
        min = PAGE_COUNT.start(),
        max = PAGE_COUNT.end(),
    )
}

/// Generates the story outline. Any failure here is fatal for the request.
///
/// # Errors
///
/// Returns the model's error if the call fails, or
/// `GenerationError::Schema` if the answer does not satisfy the outline
/// schema.
#[instrument(skip_all)]
pub async fn generate_outline(
    request: &StoryRequest,
    model: &dyn StructuredModel,
) -> Result<StoryOutline, GenerationError> {
    let schema = story_outline_schema();
    let value = model
        .generate_object(&outline_instruction(request.prompt()), &schema)
        .await?;

    let outline = decode_outline(value)?;
    debug!(title = %outline.title, pages = outline.pages.len(), "outline decoded");
    Ok(outline)
}
