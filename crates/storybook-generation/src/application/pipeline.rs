//! The story pipeline: validate → outline → asset fan-out → merge.
//!
//! The outline is generated first because every image depends on it. The
//! cover task and one task per page then run concurrently behind a
//! semaphore, each converting its own failure into an `AssetOutcome`. The
//! merge waits for every task to settle and reassembles the book by page
//! index, so completion order never matters.

use std::collections::HashMap;
use std::sync::Arc;

use storybook_core::error::GenerationError;
use storybook_core::model::{ImageModel, ImageSize, ModelSet, TextModel};
use storybook_core::story::{CompletedStory, PageOutline, StoryOutline};
use storybook_core::style::{StyleDirective, StyleProfile};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, Span, error, info, instrument, warn};

use crate::application::assets::{RetryPolicy, generate_asset};
use crate::application::image_prompts::{
    CoverBrief, synthesize_cover_prompt, synthesize_page_prompt,
};
use crate::application::outline::generate_outline;
use crate::domain::commands::GenerateStory;
use crate::domain::outcome::{AssetOutcome, AssetOutcomes, AssetSlot};

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Resolution of every generated image.
    pub image_size: ImageSize,
    /// Maximum asset tasks in flight at once, across all requests.
    pub max_concurrent_assets: usize,
    /// Retry policy for the image call of each asset.
    pub asset_retry: RetryPolicy,
    /// Illustration style shared by every image.
    pub style: StyleProfile,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            image_size: ImageSize::default(),
            max_concurrent_assets: 4,
            asset_retry: RetryPolicy::default(),
            style: StyleProfile::default(),
        }
    }
}

/// What an asset task turns into a prompt.
enum PromptSource {
    Cover(CoverBrief),
    Page(PageOutline),
}

/// Everything an asset task needs, cheap to clone into a spawned task.
#[derive(Clone)]
struct AssetTaskContext {
    text: Arc<dyn TextModel>,
    image: Arc<dyn ImageModel>,
    directive: StyleDirective,
    size: ImageSize,
    retry: RetryPolicy,
    gate: Arc<Semaphore>,
}

impl AssetTaskContext {
    /// Synthesize the prompt and generate the image for one slot. Never
    /// fails: every error becomes `AssetOutcome::Failed`.
    async fn run(self, slot: AssetSlot, source: PromptSource) -> AssetOutcome {
        let prompt = {
            let Ok(_permit) = self.gate.acquire().await else {
                return AssetOutcome::Failed("asset gate closed".into());
            };
            match &source {
                PromptSource::Cover(brief) => {
                    synthesize_cover_prompt(brief, &self.directive, self.text.as_ref()).await
                }
                PromptSource::Page(page) => {
                    synthesize_page_prompt(page, &self.directive, self.text.as_ref()).await
                }
            }
        };

        let result = match prompt {
            Ok(prompt) => {
                generate_asset(
                    &prompt,
                    self.size,
                    self.image.as_ref(),
                    &self.gate,
                    &self.retry,
                )
                .await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(asset) => {
                info!(%slot, "asset generated");
                AssetOutcome::Generated(asset)
            }
            Err(err) => {
                warn!(%slot, error = %err, "asset generation failed");
                AssetOutcome::Failed(err.to_string())
            }
        }
    }
}

/// Orchestrates story generation against a set of models.
#[derive(Debug)]
pub struct StoryPipeline {
    models: ModelSet,
    settings: PipelineSettings,
    asset_gate: Arc<Semaphore>,
}

impl StoryPipeline {
    /// Create a pipeline. `max_concurrent_assets` is clamped to at least one.
    #[must_use]
    pub fn new(models: ModelSet, settings: PipelineSettings) -> Self {
        let permits = settings.max_concurrent_assets.max(1);
        Self {
            models,
            settings,
            asset_gate: Arc::new(Semaphore::new(permits)),
        }
    }

    /// The settings this pipeline runs with.
    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Handles the `GenerateStory` command: generates the outline, then the
    /// cover and page illustrations, and merges them into the finished book.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` only if outline generation fails. Asset
    /// failures are absorbed into the returned story.
    #[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
    pub async fn handle_generate_story(
        &self,
        command: &GenerateStory,
    ) -> Result<CompletedStory, GenerationError> {
        info!("generating story outline");
        let outline = generate_outline(&command.request, self.models.structured.as_ref())
            .await
            .inspect_err(|err| error!(error = %err, "outline generation failed"))?;
        info!(title = %outline.title, pages = outline.pages.len(), "outline generated");

        let directive = self.settings.style.directive();
        let outcomes = self.fan_out_assets(&outline, directive).await;
        info!(
            failed_pages = outcomes.failed_pages(),
            "all asset tasks settled"
        );

        Ok(outcomes.merge(outline))
    }

    /// Spawns the cover task and one task per page, then waits for every
    /// task to settle regardless of outcome.
    async fn fan_out_assets(
        &self,
        outline: &StoryOutline,
        directive: StyleDirective,
    ) -> AssetOutcomes {
        let context = AssetTaskContext {
            text: Arc::clone(&self.models.text),
            image: Arc::clone(&self.models.image),
            directive,
            size: self.settings.image_size,
            retry: self.settings.asset_retry,
            gate: Arc::clone(&self.asset_gate),
        };

        let jobs = std::iter::once((
            AssetSlot::Cover,
            PromptSource::Cover(CoverBrief::from_outline(outline)),
        ))
        .chain(
            outline
                .pages
                .iter()
                .enumerate()
                .map(|(index, page)| (AssetSlot::Page(index), PromptSource::Page(page.clone()))),
        );

        let mut tasks = JoinSet::new();
        let mut slots = HashMap::new();
        for (slot, source) in jobs {
            let task = context
                .clone()
                .run(slot, source)
                .instrument(Span::current());
            let handle = tasks.spawn(task);
            slots.insert(handle.id(), slot);
        }

        let mut outcomes = AssetOutcomes::new(outline.pages.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, outcome),
                Err(join_error) => {
                    let err = GenerationError::Task(join_error.to_string());
                    warn!(error = %err, "asset task did not complete");
                    (join_error.id(), AssetOutcome::Failed(err.to_string()))
                }
            };
            if let Some(slot) = slots.remove(&id) {
                outcomes.record(slot, outcome);
            }
        }

        outcomes
    }
}
