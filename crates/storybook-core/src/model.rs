//! Generative model abstractions.
//!
//! The pipeline depends only on these call/result contracts. Vendor
//! adapters live in `storybook-providers`; tests inject mocks from
//! `storybook-test-support`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GenerationError;

/// A model that returns a JSON object constrained by a response schema.
#[async_trait]
pub trait StructuredModel: Send + Sync {
    /// Generate a JSON value for `prompt` that conforms to `schema`.
    async fn generate_object(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError>;
}

/// A model that returns free text.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Generate text for `prompt`.
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// A model that renders an image for a prompt and returns the raw bytes.
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Generate one image of the requested size.
    async fn generate_image(&self, prompt: &str, size: ImageSize)
    -> Result<Vec<u8>, GenerationError>;
}

/// The three collaborators a story pipeline needs.
#[derive(Clone)]
pub struct ModelSet {
    /// Schema-constrained model used for the outline.
    pub structured: Arc<dyn StructuredModel>,
    /// Free-text model used for image prompt synthesis.
    pub text: Arc<dyn TextModel>,
    /// Image model used for page and cover assets.
    pub image: Arc<dyn ImageModel>,
}

impl ModelSet {
    /// Bundle the three model collaborators.
    #[must_use]
    pub fn new(
        structured: Arc<dyn StructuredModel>,
        text: Arc<dyn TextModel>,
        image: Arc<dyn ImageModel>,
    ) -> Self {
        Self {
            structured,
            text,
            image,
        }
    }
}

impl fmt::Debug for ModelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSet").finish_non_exhaustive()
    }
}

/// Target resolution of a generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Square 1024×1024, the size every book image is rendered at by default.
    pub const SQUARE_1024: Self = Self {
        width: 1024,
        height: 1024,
    };
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::SQUARE_1024
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GenerationError::Validation(format!("invalid image size `{s}`"));
        let (width, height) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_parses_width_by_height() {
        let size: ImageSize = "768x512".parse().unwrap();
        assert_eq!(
            size,
            ImageSize {
                width: 768,
                height: 512
            }
        );
        assert_eq!(size.to_string(), "768x512");
    }

    #[test]
    fn test_image_size_rejects_zero_and_garbage() {
        assert!("0x1024".parse::<ImageSize>().is_err());
        assert!("1024".parse::<ImageSize>().is_err());
        assert!("axb".parse::<ImageSize>().is_err());
    }

    #[test]
    fn test_image_size_defaults_to_square_1024() {
        assert_eq!(ImageSize::default().to_string(), "1024x1024");
    }
}
