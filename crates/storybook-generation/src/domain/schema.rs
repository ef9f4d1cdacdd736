//! The story outline schema and its validation.

use std::ops::RangeInclusive;

use serde_json::json;
use storybook_core::error::GenerationError;
use storybook_core::story::StoryOutline;

/// Allowed number of pages in an outline.
pub const PAGE_COUNT: RangeInclusive<usize> = 6..=8;

/// Response schema sent with the outline request.
#[must_use]
pub fn story_outline_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "genre": { "type": "STRING" },
            "targetAge": { "type": "STRING" },
            "pages": {
                "type": "ARRAY",
                "minItems": PAGE_COUNT.start(),
                "maxItems": PAGE_COUNT.end(),
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "pageNumber": { "type": "INTEGER" },
                        "title": { "type": "STRING" },
                        "content": { "type": "STRING" },
                        "characters": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "setting": { "type": "STRING" },
                        "mood": { "type": "STRING" }
                    },
                    "required": ["pageNumber", "title", "content", "characters", "setting", "mood"],
                    "propertyOrdering": ["pageNumber", "title", "content", "characters", "setting", "mood"]
                }
            }
        },
        "required": ["title", "genre", "targetAge", "pages"],
        "propertyOrdering": ["title", "genre", "targetAge", "pages"]
    })
}

fn require(field: &str, value: &str) -> Result<(), GenerationError> {
    if value.trim().is_empty() {
        return Err(GenerationError::Schema(format!("`{field}` must not be empty")));
    }
    Ok(())
}

/// Decode and validate a structured-model answer into a `StoryOutline`.
///
/// Pages are renumbered `1..=N` by position; the model's own numbering is
/// not trusted.
///
/// # Errors
///
/// Returns `GenerationError::Schema` if the value does not decode, the page
/// count is outside `PAGE_COUNT`, or a required field is blank.
pub fn decode_outline(value: serde_json::Value) -> Result<StoryOutline, GenerationError> {
    let mut outline: StoryOutline = serde_json::from_value(value)
        .map_err(|e| GenerationError::Schema(format!("outline did not decode: {e}")))?;

    require("title", &outline.title)?;
    require("genre", &outline.genre)?;
    require("targetAge", &outline.target_age)?;

    if !PAGE_COUNT.contains(&outline.pages.len()) {
        return Err(GenerationError::Schema(format!(
            "outline has {} pages, expected {}..={}",
            outline.pages.len(),
            PAGE_COUNT.start(),
            PAGE_COUNT.end()
        )));
    }

    for (page_number, page) in (1u32..).zip(outline.pages.iter_mut()) {
        page.page_number = page_number;
        require("title", &page.title)?;
        require("content", &page.content)?;
        require("setting", &page.setting)?;
        require("mood", &page.mood)?;
        page.characters.retain(|name| !name.trim().is_empty());
        if page.characters.is_empty() {
            return Err(GenerationError::Schema(format!(
                "page {page_number} lists no characters"
            )));
        }
    }

    Ok(outline)
}
