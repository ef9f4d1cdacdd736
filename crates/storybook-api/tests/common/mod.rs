//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use storybook_core::model::{ImageModel, ModelSet, StructuredModel, TextModel};
use storybook_generation::application::pipeline::{PipelineSettings, StoryPipeline};
use tower::ServiceExt;

use storybook_api::state::AppState;

/// Build the full app router around the given models. Uses the same route
/// structure as `main.rs`.
pub fn build_test_app(
    structured: Arc<dyn StructuredModel>,
    text: Arc<dyn TextModel>,
    image: Arc<dyn ImageModel>,
) -> Router {
    build_test_app_with(structured, text, image, PipelineSettings::default())
}

/// Build the full app router with custom pipeline settings.
pub fn build_test_app_with(
    structured: Arc<dyn StructuredModel>,
    text: Arc<dyn TextModel>,
    image: Arc<dyn ImageModel>,
    settings: PipelineSettings,
) -> Router {
    let pipeline = StoryPipeline::new(ModelSet::new(structured, text, image), settings);
    storybook_api::app(AppState::new(pipeline))
}

/// Send a POST request with a raw body and return the response.
pub async fn post_body(app: Router, uri: &str, body: Body) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_body(app, uri, Body::from(serde_json::to_vec(body).unwrap())).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
