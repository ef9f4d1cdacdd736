//! Server configuration read from the environment.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use storybook_core::model::ImageSize;
use storybook_core::style::StyleProfile;
use storybook_generation::application::assets::RetryPolicy;
use storybook_generation::application::pipeline::PipelineSettings;

use crate::error::AppError;

/// Connection settings for one model provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// API key.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Override for the provider's base URL.
    pub base_url: Option<String>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Text and structured model provider.
    pub gemini: ProviderSettings,
    /// Image model provider.
    pub fal: ProviderSettings,
    /// Timeout for every outbound model call.
    pub request_timeout: Duration,
    /// Pipeline tunables.
    pub pipeline: PipelineSettings,
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
        _ => Ok(default),
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, AppError> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("{key} environment variable must be set")))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Load a style profile from a YAML file.
///
/// # Errors
///
/// Returns `AppError::Config` if the file cannot be read or parsed.
pub fn load_style_profile(path: &str) -> Result<StyleProfile, AppError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read style profile `{path}`: {e}")))?;
    serde_yaml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("invalid style profile `{path}`: {e}")))
}

impl Config {
    /// Read configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required key is missing or a value
    /// does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let image_size: ImageSize = parse_or(&lookup, "IMAGE_SIZE", ImageSize::default())?;
        let max_concurrent_assets: usize = parse_or(&lookup, "MAX_CONCURRENT_ASSETS", 4)?;
        if max_concurrent_assets == 0 {
            return Err(AppError::Config(
                "MAX_CONCURRENT_ASSETS must be at least 1".into(),
            ));
        }
        let timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 120)?;
        if timeout_secs == 0 {
            return Err(AppError::Config(
                "REQUEST_TIMEOUT_SECS must be at least 1".into(),
            ));
        }
        let retries: u32 = parse_or(&lookup, "ASSET_RETRY_ATTEMPTS", 0)?;
        let retry_delay_ms: u64 = parse_or(&lookup, "ASSET_RETRY_BASE_DELAY_MS", 500)?;
        let style = match optional(&lookup, "STYLE_PROFILE_PATH") {
            Some(path) => load_style_profile(&path)?,
            None => StyleProfile::default(),
        };

        Ok(Self {
            host: optional(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,
            gemini: ProviderSettings {
                api_key: required(&lookup, "GEMINI_API_KEY")?,
                model: optional(&lookup, "GEMINI_MODEL")
                    .unwrap_or_else(|| "gemini-2.5-flash".to_string()),
                base_url: optional(&lookup, "GEMINI_BASE_URL"),
            },
            fal: ProviderSettings {
                api_key: required(&lookup, "FAL_KEY")?,
                model: optional(&lookup, "FAL_MODEL")
                    .unwrap_or_else(|| "fal-ai/flux/schnell".to_string()),
                base_url: optional(&lookup, "FAL_BASE_URL"),
            },
            request_timeout: Duration::from_secs(timeout_secs),
            pipeline: PipelineSettings {
                image_size,
                max_concurrent_assets,
                asset_retry: RetryPolicy::new(retries, Duration::from_millis(retry_delay_ms)),
                style,
            },
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a valid address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
