//! Storybook providers: HTTP adapters for the generative models.
//!
//! `GeminiClient` implements both `StructuredModel` and `TextModel`;
//! `FalImageClient` implements `ImageModel`.

pub mod error;
pub mod fal;
pub mod gemini;

pub use error::ProviderError;
pub use fal::FalImageClient;
pub use gemini::GeminiClient;
