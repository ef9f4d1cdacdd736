//! Asset task outcomes and the merge back into the book.

use std::fmt;

use storybook_core::story::{CompletedStory, GeneratedAsset, StoryOutline, StoryPage};

/// Which illustration an asset task produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetSlot {
    /// The book cover.
    Cover,
    /// The page at this zero-based index of the outline.
    Page(usize),
}

impl fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cover => f.write_str("cover"),
            Self::Page(index) => write!(f, "page {}", index + 1),
        }
    }
}

/// Settled result of one asset task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// The illustration was generated.
    Generated(GeneratedAsset),
    /// Prompt synthesis or image generation failed; carries the reason.
    Failed(String),
}

/// Outcomes of every asset task of one request, collected in any order.
#[derive(Debug)]
pub struct AssetOutcomes {
    cover: Option<AssetOutcome>,
    pages: Vec<Option<AssetOutcome>>,
}

impl AssetOutcomes {
    /// Empty collection for a book of `page_count` pages.
    #[must_use]
    pub fn new(page_count: usize) -> Self {
        Self {
            cover: None,
            pages: (0..page_count).map(|_| None).collect(),
        }
    }

    /// Record a settled outcome. Outcomes for unknown page indices are
    /// ignored.
    pub fn record(&mut self, slot: AssetSlot, outcome: AssetOutcome) {
        match slot {
            AssetSlot::Cover => self.cover = Some(outcome),
            AssetSlot::Page(index) => {
                if let Some(entry) = self.pages.get_mut(index) {
                    *entry = Some(outcome);
                }
            }
        }
    }

    /// Number of pages whose task failed.
    #[must_use]
    pub fn failed_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|o| matches!(o, Some(AssetOutcome::Failed(_))))
            .count()
    }

    /// Zip the outline with the outcomes by page index. Never fails: a
    /// failed page keeps its text and carries an error tag, a failed cover is
    /// simply omitted.
    #[must_use]
    pub fn merge(self, outline: StoryOutline) -> CompletedStory {
        let pages = outline
            .pages
            .into_iter()
            .zip(self.pages.into_iter().chain(std::iter::repeat(None)))
            .map(|(page, outcome)| match outcome {
                Some(AssetOutcome::Generated(asset)) => StoryPage::illustrated(page, asset),
                Some(AssetOutcome::Failed(_)) => StoryPage::failed(page),
                None => StoryPage::text_only(page),
            })
            .collect();

        let cover_image_url = match self.cover {
            Some(AssetOutcome::Generated(asset)) => Some(asset.encoded_image),
            _ => None,
        };

        CompletedStory {
            title: outline.title,
            genre: outline.genre,
            target_age: outline.target_age,
            pages,
            cover_image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storybook_core::story::IMAGE_FAILED;
    use storybook_test_support::sample_outline;

    fn asset(name: &str) -> AssetOutcome {
        AssetOutcome::Generated(GeneratedAsset {
            encoded_image: format!("data:image/png;base64,{name}"),
            source_prompt: format!("prompt for {name}"),
        })
    }

    #[test]
    fn test_merge_orders_by_index_not_arrival() {
        // Arrange
        let outline = sample_outline(6);
        let mut outcomes = AssetOutcomes::new(6);
        for index in [5, 2, 0, 4, 1, 3] {
            outcomes.record(AssetSlot::Page(index), asset(&format!("p{index}")));
        }
        outcomes.record(AssetSlot::Cover, asset("cover"));

        // Act
        let story = outcomes.merge(outline);

        // Assert
        assert_eq!(story.pages.len(), 6);
        for (index, page) in story.pages.iter().enumerate() {
            assert_eq!(page.outline.page_number as usize, index + 1);
            assert_eq!(
                page.image_url.as_deref(),
                Some(format!("data:image/png;base64,p{index}").as_str())
            );
        }
        assert_eq!(
            story.cover_image_url.as_deref(),
            Some("data:image/png;base64,cover")
        );
    }

    #[test]
    fn test_merge_marks_failed_page_and_omits_failed_cover() {
        // Arrange
        let mut outcomes = AssetOutcomes::new(6);
        for index in 0..6 {
            let outcome = if index == 3 {
                AssetOutcome::Failed("quota".into())
            } else {
                asset("ok")
            };
            outcomes.record(AssetSlot::Page(index), outcome);
        }
        outcomes.record(AssetSlot::Cover, AssetOutcome::Failed("timeout".into()));
        assert_eq!(outcomes.failed_pages(), 1);

        // Act
        let story = outcomes.merge(sample_outline(6));

        // Assert
        let failed = &story.pages[3];
        assert_eq!(failed.error.as_deref(), Some(IMAGE_FAILED));
        assert!(failed.image_url.is_none());
        assert!(story.cover_image_url.is_none());
        assert_eq!(
            story.pages.iter().filter(|p| p.image_url.is_some()).count(),
            5
        );
    }

    #[test]
    fn test_merge_leaves_unsettled_pages_text_only() {
        let outcomes = AssetOutcomes::new(6);

        let story = outcomes.merge(sample_outline(6));

        assert!(
            story
                .pages
                .iter()
                .all(|p| p.image_url.is_none() && p.error.is_none())
        );
    }

    #[test]
    fn test_record_ignores_out_of_range_page() {
        let mut outcomes = AssetOutcomes::new(6);
        outcomes.record(AssetSlot::Page(10), asset("stray"));

        let story = outcomes.merge(sample_outline(6));
        assert!(story.pages.iter().all(|p| p.image_url.is_none()));
    }

    #[test]
    fn test_slot_display_is_one_based() {
        assert_eq!(AssetSlot::Page(0).to_string(), "page 1");
        assert_eq!(AssetSlot::Cover.to_string(), "cover");
    }
}
