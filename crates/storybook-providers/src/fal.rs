//! fal.ai adapter for image generation.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::{Deserialize, Serialize};
use storybook_core::error::GenerationError;
use storybook_core::model::{ImageModel, ImageSize};
use tracing::debug;

use crate::error::{ProviderError, check_status};

/// Default synchronous endpoint of the fal.ai queue-less API.
pub const DEFAULT_BASE_URL: &str = "https://fal.run";

#[derive(Serialize)]
struct FalImageSize {
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct FalRequest<'a> {
    prompt: &'a str,
    image_size: FalImageSize,
    num_images: u32,
    sync_mode: bool,
    enable_safety_checker: bool,
}

#[derive(Debug, Deserialize)]
struct FalResponse {
    #[serde(default)]
    images: Vec<FalImage>,
}

#[derive(Debug, Deserialize)]
struct FalImage {
    url: String,
}

/// Decode the payload of a base64 `data:` URI.
///
/// # Errors
///
/// Returns `ProviderError::Decode` if the URI is not a base64 data URI or
/// the payload is not valid base64.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ProviderError> {
    let (header, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| ProviderError::Decode("not a data URI".into()))?;
    if !header.ends_with(";base64") {
        return Err(ProviderError::Decode(format!(
            "unsupported data URI encoding `{header}`"
        )));
    }
    BASE64
        .decode(payload.trim())
        .map_err(|e| ProviderError::Decode(e.to_string()))
}

/// Client for a fal.ai text-to-image model.
#[derive(Debug, Clone)]
pub struct FalImageClient {
    client: Client,
    url: String,
    auth: HeaderValue,
}

impl FalImageClient {
    /// Create a client for `model` (e.g. `fal-ai/flux/schnell`).
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
                "fal api key must not be empty".into(),
            ));
        }
        let model = model.trim().trim_matches('/');
        if model.is_empty() {
            return Err(ProviderError::InvalidConfig(
                "fal model must not be empty".into(),
            ));
        }

        let mut auth = HeaderValue::from_str(&format!("Key {}", api_key.trim()))
            .map_err(|e| ProviderError::InvalidConfig(format!("fal api key: {e}")))?;
        auth.set_sensitive(true);

        let base = base_url
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: format!("{base}/{model}"),
            auth,
        })
    }

    async fn render(&self, prompt: &str, size: ImageSize) -> Result<Vec<u8>, ProviderError> {
        let body = FalRequest {
            prompt,
            image_size: FalImageSize {
                width: size.width,
                height: size.height,
            },
            num_images: 1,
            sync_mode: true,
            enable_safety_checker: true,
        };

        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, self.auth.clone())
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let parsed: FalResponse = response.json().await?;
        let image = parsed
            .images
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        if image.url.starts_with("data:") {
            return decode_data_uri(&image.url);
        }

        debug!(url = %image.url, "downloading generated image");
        let download = check_status(self.client.get(&image.url).send().await?).await?;
        Ok(download.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageModel for FalImageClient {
    async fn generate_image(
        &self,
        prompt: &str,
        size: ImageSize,
    ) -> Result<Vec<u8>, GenerationError> {
        Ok(self.render(prompt, size).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    const PIXELS: &[u8] = &[0x89, b'P', b'N', b'G', 1, 2, 3];

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Key fal-key")
    }

    #[tokio::test]
    async fn test_generate_image_decodes_inline_data_uri() {
        // Arrange
        let router = Router::new().route(
            "/fal-ai/flux/schnell",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if !authorized(&headers) {
                    return Err(StatusCode::UNAUTHORIZED);
                }
                assert_eq!(body["image_size"], json!({ "width": 1024, "height": 1024 }));
                assert_eq!(body["num_images"], 1);
                let uri = format!("data:image/png;base64,{}", BASE64.encode(PIXELS));
                Ok(Json(json!({ "images": [{ "url": uri, "content_type": "image/png" }] })))
            }),
        );
        let base = serve(router).await;
        let client =
            FalImageClient::new("fal-key", "fal-ai/flux/schnell", Some(&base), Duration::from_secs(5))
                .unwrap();

        // Act
        let bytes = client
            .generate_image("a puppy", ImageSize::SQUARE_1024)
            .await
            .unwrap();

        // Assert
        assert_eq!(bytes, PIXELS);
    }

    #[tokio::test]
    async fn test_generate_image_downloads_hosted_url() {
        // Arrange
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let router = Router::new()
            .route(
                "/fal-ai/flux/schnell",
                post(|State(base): State<String>| async move {
                    Json(json!({ "images": [{ "url": format!("{base}/files/out.png") }] }))
                }),
            )
            .route("/files/out.png", get(|| async { PIXELS }))
            .with_state(base.clone());
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        let client =
            FalImageClient::new("fal-key", "fal-ai/flux/schnell", Some(&base), Duration::from_secs(5))
                .unwrap();

        // Act
        let bytes = client
            .generate_image("a puppy", ImageSize::SQUARE_1024)
            .await
            .unwrap();

        // Assert
        assert_eq!(bytes, PIXELS);
    }

    #[tokio::test]
    async fn test_no_images_is_empty_response() {
        let router = Router::new().route(
            "/fal-ai/flux/schnell",
            post(|| async { Json(json!({ "images": [] })) }),
        );
        let base = serve(router).await;
        let client =
            FalImageClient::new("fal-key", "fal-ai/flux/schnell", Some(&base), Duration::from_secs(5))
                .unwrap();

        let err = client
            .generate_image("a puppy", ImageSize::SQUARE_1024)
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable_error() {
        let router = Router::new().route(
            "/fal-ai/flux/schnell",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
        );
        let base = serve(router).await;
        let client =
            FalImageClient::new("fal-key", "fal-ai/flux/schnell", Some(&base), Duration::from_secs(5))
                .unwrap();

        let err = client
            .generate_image("a puppy", ImageSize::SQUARE_1024)
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_rejected_key_is_permanent_upstream_error() {
        let router = Router::new().route(
            "/fal-ai/flux/schnell",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid key") }),
        );
        let base = serve(router).await;
        let client =
            FalImageClient::new("fal-key", "fal-ai/flux/schnell", Some(&base), Duration::from_secs(5))
                .unwrap();

        let err = client
            .generate_image("a puppy", ImageSize::SQUARE_1024)
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Upstream(ref msg) if msg.contains("401")));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_decode_data_uri_rejects_non_base64() {
        assert!(decode_data_uri("data:image/png,raw").is_err());
        assert!(decode_data_uri("https://example.test/a.png").is_err());
        assert_eq!(decode_data_uri("data:image/png;base64,AQID").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let client =
            FalImageClient::new("secret-fal-key", "fal-ai/flux/schnell", None, Duration::from_secs(1))
                .unwrap();

        assert!(!format!("{client:?}").contains("secret-fal-key"));
    }

    #[test]
    fn test_new_rejects_blank_key() {
        assert!(FalImageClient::new("", "fal-ai/flux/schnell", None, Duration::from_secs(1)).is_err());
    }
}
