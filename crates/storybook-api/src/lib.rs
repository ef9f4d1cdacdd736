//! Storybook API: HTTP surface of the story generation pipeline.

use axum::Router;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use state::AppState;

/// Build the application router with every route mounted.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::story::router())
        .with_state(state)
}
