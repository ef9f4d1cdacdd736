//! Storybook API server entry point.

use std::error::Error;
use std::sync::Arc;

use storybook_api::config::Config;
use storybook_api::state::AppState;
use storybook_core::model::ModelSet;
use storybook_generation::application::pipeline::StoryPipeline;
use storybook_providers::{FalImageClient, GeminiClient};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Storybook API server");

    let config = Config::from_env()?;

    // Gemini serves both the outline and the image prompts.
    let gemini = Arc::new(GeminiClient::new(
        &config.gemini.api_key,
        &config.gemini.model,
        config.gemini.base_url.as_deref(),
        config.request_timeout,
    )?);
    let fal = Arc::new(FalImageClient::new(
        &config.fal.api_key,
        &config.fal.model,
        config.fal.base_url.as_deref(),
        config.request_timeout,
    )?);
    let models = ModelSet::new(gemini.clone(), gemini, fal);

    tracing::info!(
        text_model = %config.gemini.model,
        image_model = %config.fal.model,
        image_size = %config.pipeline.image_size,
        max_concurrent_assets = config.pipeline.max_concurrent_assets,
        asset_retries = config.pipeline.asset_retry.max_retries,
        style_profile = %config.pipeline.style.name,
        "pipeline configured"
    );

    let pipeline = StoryPipeline::new(models, config.pipeline.clone());

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = storybook_api::app(AppState::new(pipeline))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
