//! Image prompt synthesis for the cover and for each page.
//!
//! The text model writes a short scene description; the shared style
//! directive is then appended verbatim so every image in the book carries
//! byte-identical style language.

use storybook_core::error::GenerationError;
use storybook_core::model::TextModel;
use storybook_core::story::{ImagePrompt, PageOutline, StoryOutline};
use storybook_core::style::StyleDirective;

/// Word budget given to the text model for a scene description.
pub const MAX_PROMPT_WORDS: usize = 80;

/// Book-level summary used to describe the cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverBrief {
    /// Book title.
    pub title: String,
    /// Genre label.
    pub genre: String,
    /// Every character in the book, deduplicated, in first-seen order.
    pub characters: Vec<String>,
}

impl CoverBrief {
    /// Summarize an outline for the cover.
    #[must_use]
    pub fn from_outline(outline: &StoryOutline) -> Self {
        Self {
            title: outline.title.clone(),
            genre: outline.genre.clone(),
            characters: outline
                .unique_characters()
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Instruction asking the text model to describe the cover.
#[must_use]
pub fn cover_instruction(brief: &CoverBrief, directive: &StyleDirective) -> String {
    format!(
        "Create a detailed cover image prompt for this children's storybook:\n\
         \n\
         Title: {title}\n\
         Genre: {genre}\n\
         Main Characters: {characters}\n\
         \n\
         Generate a prompt for a beautiful, colorful children's book cover illustration.\n\
         Include:\n\
         - Main characters together in a welcoming scene\n\
         - An empty area for the title overlay (do not include any text)\n\
         - Warm, inviting colors\n\
         - Storybook cover composition\n\
         \n\
         Style keywords: {directive}\n\
         \n\
         Keep it concise (max {MAX_PROMPT_WORDS} words).",
        title = brief.title,
        genre = brief.genre,
        characters = brief.characters.join(", "),
    )
}

/// Instruction asking the text model to describe one page's scene.
#[must_use]
pub fn page_instruction(page: &PageOutline, directive: &StyleDirective) -> String {
    format!(
        "Create a detailed, child-friendly illustration prompt for this storybook page:\n\
         \n\
         Title: {title}\n\
         Content: {content}\n\
         Characters: {characters}\n\
         Setting: {setting}\n\
         Mood: {mood}\n\
         \n\
         Generate a prompt for a colorful children's book illustration that captures this scene.\n\
         Include details about:\n\
         - The characters and their expressions\n\
         - The setting and environment\n\
         - Colors and lighting that match the mood\n\
         - Important objects or elements from the story\n\
         \n\
         Style keywords: {directive}\n\
         \n\
         Keep it descriptive but concise (max {MAX_PROMPT_WORDS} words).",
        title = page.title,
        content = page.content,
        characters = page.characters.join(", "),
        setting = page.setting,
        mood = page.mood,
    )
}

async fn synthesize(
    instruction: &str,
    directive: &StyleDirective,
    model: &dyn TextModel,
) -> Result<ImagePrompt, GenerationError> {
    let description = model.generate_text(instruction).await?;
    if description.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(ImagePrompt {
        text: directive.apply(&description),
        style_applied: true,
    })
}

/// Synthesizes the cover image prompt.
///
/// # Errors
///
/// Returns the text model's error, or `GenerationError::EmptyResponse` if it
/// answered with blank text.
pub async fn synthesize_cover_prompt(
    brief: &CoverBrief,
    directive: &StyleDirective,
    model: &dyn TextModel,
) -> Result<ImagePrompt, GenerationError> {
    synthesize(&cover_instruction(brief, directive), directive, model).await
}

/// Synthesizes the image prompt for one page.
///
/// # Errors
///
/// Returns the text model's error, or `GenerationError::EmptyResponse` if it
/// answered with blank text.
pub async fn synthesize_page_prompt(
    page: &PageOutline,
    directive: &StyleDirective,
    model: &dyn TextModel,
) -> Result<ImagePrompt, GenerationError> {
    synthesize(&page_instruction(page, directive), directive, model).await
}
