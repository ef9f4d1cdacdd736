//! Integration tests for the health endpoint.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use storybook_test_support::{EchoTextModel, RecordingImageModel, StaticStructuredModel, sample_outline_json};

fn app() -> axum::Router {
    common::build_test_app(
        Arc::new(StaticStructuredModel::new(sample_outline_json(6))),
        Arc::new(EchoTextModel::new()),
        Arc::new(RecordingImageModel::new()),
    )
}

#[tokio::test]
async fn test_health_returns_200_with_status_ok() {
    let (status, json) = common::get_json(app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["styleProfile"], "storybook-cartoon");
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/v1/nonexistent")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
