//! Story data model: the request, the outline, and the completed book.

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Error tag attached to a page whose illustration could not be produced.
pub const IMAGE_FAILED: &str = "Failed to generate image";

/// A validated request to generate a story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRequest {
    prompt: String,
}

impl StoryRequest {
    /// Validate a raw prompt.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Validation` if the prompt is missing or
    /// blank after trimming.
    pub fn new(prompt: Option<&str>) -> Result<Self, GenerationError> {
        match prompt.map(str::trim) {
            Some(prompt) if !prompt.is_empty() => Ok(Self {
                prompt: prompt.to_owned(),
            }),
            _ => Err(GenerationError::Validation("Prompt is required".into())),
        }
    }

    /// The trimmed user prompt.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// One page of the narrative outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOutline {
    /// 1-based position of the page in the book.
    pub page_number: u32,
    /// Page heading.
    pub title: String,
    /// Two or three sentences of story text.
    pub content: String,
    /// Characters present in the scene.
    pub characters: Vec<String>,
    /// Where the scene takes place.
    pub setting: String,
    /// Atmosphere of the scene.
    pub mood: String,
}

/// The structured narrative skeleton produced before any image exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryOutline {
    /// Book title.
    pub title: String,
    /// Genre label.
    pub genre: String,
    /// Intended reader age, as free text (e.g. "4-8 years").
    pub target_age: String,
    /// Pages in reading order.
    pub pages: Vec<PageOutline>,
}

impl StoryOutline {
    /// All characters across the book, deduplicated, in first-seen order.
    #[must_use]
    pub fn unique_characters(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for name in self.pages.iter().flat_map(|p| p.characters.iter()) {
            if !seen.contains(&name.as_str()) {
                seen.push(name);
            }
        }
        seen
    }
}

/// An image prompt ready for the image model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePrompt {
    /// Full prompt text, including the style directive.
    pub text: String,
    /// Whether the shared style directive has been appended.
    pub style_applied: bool,
}

/// A generated image plus the prompt that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAsset {
    /// Image bytes as a `data:` URI.
    pub encoded_image: String,
    /// The prompt sent to the image model.
    pub source_prompt: String,
}

/// A page of the finished book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPage {
    /// The narrative fields of the page.
    #[serde(flatten)]
    pub outline: PageOutline,
    /// Illustration, present iff generation succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Prompt that produced the illustration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    /// Failure tag, present iff generation failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoryPage {
    /// A page whose illustration was generated.
    #[must_use]
    pub fn illustrated(outline: PageOutline, asset: GeneratedAsset) -> Self {
        Self {
            outline,
            image_url: Some(asset.encoded_image),
            image_prompt: Some(asset.source_prompt),
            error: None,
        }
    }

    /// A page whose illustration failed.
    #[must_use]
    pub fn failed(outline: PageOutline) -> Self {
        Self {
            outline,
            image_url: None,
            image_prompt: None,
            error: Some(IMAGE_FAILED.to_owned()),
        }
    }

    /// A page whose image step never ran.
    #[must_use]
    pub fn text_only(outline: PageOutline) -> Self {
        Self {
            outline,
            image_url: None,
            image_prompt: None,
            error: None,
        }
    }
}

/// The finished, illustrated book returned to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedStory {
    /// Book title.
    pub title: String,
    /// Genre label.
    pub genre: String,
    /// Intended reader age.
    pub target_age: String,
    /// Pages in the same order and count as the outline.
    pub pages: Vec<StoryPage>,
    /// Cover illustration, absent if the cover task failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, characters: &[&str]) -> PageOutline {
        PageOutline {
            page_number: number,
            title: format!("Page {number}"),
            content: "Something happens.".into(),
            characters: characters.iter().map(|c| (*c).to_owned()).collect(),
            setting: "A street".into(),
            mood: "Warm".into(),
        }
    }

    #[test]
    fn test_story_request_trims_prompt() {
        let request = StoryRequest::new(Some("  a dragon learns to knit \n")).unwrap();
        assert_eq!(request.prompt(), "a dragon learns to knit");
    }

    #[test]
    fn test_story_request_rejects_missing_and_blank_prompts() {
        for raw in [None, Some(""), Some("   \t")] {
            let err = StoryRequest::new(raw).unwrap_err();
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_unique_characters_preserves_first_seen_order() {
        let outline = StoryOutline {
            title: "Friends".into(),
            genre: "Friendship".into(),
            target_age: "4-8".into(),
            pages: vec![
                page(1, &["Leo", "Biscuit"]),
                page(2, &["Biscuit", "Mrs. Park"]),
                page(3, &["Leo"]),
            ],
        };

        assert_eq!(outline.unique_characters(), vec!["Leo", "Biscuit", "Mrs. Park"]);
    }

    #[test]
    fn test_outline_deserializes_camel_case_fields() {
        let json = serde_json::json!({
            "title": "Friends",
            "genre": "Friendship",
            "targetAge": "4-8 years",
            "pages": [{
                "pageNumber": 1,
                "title": "Hello",
                "content": "Leo meets a dog.",
                "characters": ["Leo"],
                "setting": "Street",
                "mood": "Curious"
            }]
        });

        let outline: StoryOutline = serde_json::from_value(json).unwrap();
        assert_eq!(outline.target_age, "4-8 years");
        assert_eq!(outline.pages[0].page_number, 1);
    }

    #[test]
    fn test_story_page_serializes_flat_and_omits_absent_fields() {
        let failed = StoryPage::failed(page(2, &["Leo"]));
        let json = serde_json::to_value(&failed).unwrap();

        assert_eq!(json["pageNumber"], 2);
        assert_eq!(json["error"], IMAGE_FAILED);
        assert!(json.get("imageUrl").is_none());
        assert!(json.get("outline").is_none());
    }

    #[test]
    fn test_completed_story_omits_missing_cover() {
        let story = CompletedStory {
            title: "Friends".into(),
            genre: "Friendship".into(),
            target_age: "4-8".into(),
            pages: vec![],
            cover_image_url: None,
        };
        let json = serde_json::to_value(&story).unwrap();

        assert_eq!(json["targetAge"], "4-8");
        assert!(json.get("coverImageUrl").is_none());
    }
}
