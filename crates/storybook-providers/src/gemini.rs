//! Google Gemini adapter for structured and free-text generation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use storybook_core::error::GenerationError;
use storybook_core::model::{StructuredModel, TextModel};
use tracing::debug;

use crate::error::{ProviderError, check_status};

/// Default REST endpoint of the Gemini API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate that has any.
fn first_candidate_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .find(|text| !text.trim().is_empty())
        .ok_or(ProviderError::EmptyResponse)
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    url: String,
    api_key: HeaderValue,
}

impl GeminiClient {
    /// Create a client for `model`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidConfig` if the key or model is blank
    /// or the key is not a valid header value, or `ProviderError::Http` if
    /// the HTTP client cannot be built.
    pub fn new(
        api_key: &str,
        model: &str,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(
                "Gemini api key must not be empty".into(),
            ));
        }
        if model.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(
                "Gemini model must not be empty".into(),
            ));
        }

        let base = base_url
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');

        let mut api_key = HeaderValue::from_str(api_key.trim())
            .map_err(|e| ProviderError::InvalidConfig(format!("Gemini api key: {e}")))?;
        api_key.set_sensitive(true);

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: format!("{base}/models/{}:generateContent", model.trim()),
            api_key,
        })
    }

    async fn generate(
        &self,
        prompt: &str,
        schema: Option<&serde_json::Value>,
    ) -> Result<String, ProviderError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: schema.map(|schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            }),
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", self.api_key.clone())
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let parsed: GenerateContentResponse = response.json().await?;
        let text = first_candidate_text(parsed)?;
        debug!(chars = text.len(), structured = schema.is_some(), "gemini responded");
        Ok(text)
    }
}

#[async_trait]
impl StructuredModel for GeminiClient {
    async fn generate_object(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError> {
        let text = self.generate(prompt, Some(schema)).await?;
        let value = serde_json::from_str(&text).map_err(ProviderError::from)?;
        Ok(value)
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        Ok(self.generate(prompt, None).await?)
    }
}
