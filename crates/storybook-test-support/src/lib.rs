//! Shared test mocks and fixtures for the Storybook generator.

mod fixtures;
mod image;
mod structured;
mod text;

pub use fixtures::{SAMPLE_PROMPT, sample_outline, sample_outline_json};
pub use image::{FailingImageModel, PNG_SIGNATURE, RecordingImageModel};
pub use structured::{FailingStructuredModel, StaticStructuredModel};
pub use text::{EchoTextModel, FailingTextModel};
