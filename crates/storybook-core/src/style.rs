//! Illustration style profiles and the shared style directive.
//!
//! Every image prompt in a request ends with the same directive text, so the
//! cover and all pages read as one book.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

/// Static description of the look every illustration must share.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StyleProfile {
    /// Profile name, used only for logging.
    pub name: String,
    /// Medium and overall look.
    pub medium: Vec<String>,
    /// Colour palette clause.
    pub palette: String,
    /// Line style clause.
    pub line_style: String,
    /// Rule that keeps recurring characters recognizable across images.
    pub character_consistency: String,
    /// Artifacts the image model must avoid.
    pub negative_constraints: Vec<String>,
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self {
            name: "storybook-cartoon".into(),
            medium: vec![
                "cartoon illustration style".into(),
                "children's book art".into(),
                "digital painting".into(),
                "whimsical".into(),
                "colorful".into(),
                "hand-drawn look".into(),
            ],
            palette: "warm, bright, saturated colors with soft pastel backgrounds".into(),
            line_style: "clean rounded outlines with gentle shading".into(),
            character_consistency: "each recurring character keeps the same face, \
                                    proportions, hair, fur and clothing colors in every scene"
                .into(),
            negative_constraints: vec![
                "not realistic".into(),
                "not photographic".into(),
                "no text".into(),
                "no watermarks".into(),
                "no extra limbs or distorted faces".into(),
            ],
        }
    }
}

impl StyleProfile {
    /// Render the profile into the directive appended to every image prompt.
    #[must_use]
    pub fn directive(&self) -> StyleDirective {
        let mut clauses: Vec<String> = Vec::new();
        if !self.medium.is_empty() {
            clauses.push(self.medium.join(", "));
        }
        if !self.palette.trim().is_empty() {
            clauses.push(format!("palette: {}", self.palette.trim()));
        }
        if !self.line_style.trim().is_empty() {
            clauses.push(format!("line style: {}", self.line_style.trim()));
        }
        if !self.character_consistency.trim().is_empty() {
            clauses.push(format!(
                "character consistency: {}",
                self.character_consistency.trim()
            ));
        }
        if !self.negative_constraints.is_empty() {
            clauses.push(self.negative_constraints.join(", "));
        }
        StyleDirective(Arc::from(clauses.join(", ")))
    }
}

/// Immutable style text shared by every image prompt of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDirective(Arc<str>);

impl StyleDirective {
    /// The directive text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append the directive verbatim to a synthesized prompt.
    #[must_use]
    pub fn apply(&self, prompt: &str) -> String {
        format!("{}, {}", prompt.trim().trim_end_matches(['.', ',']), self.0)
    }
}

impl fmt::Display for StyleDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_carries_every_clause() {
        let directive = StyleProfile::default().directive();
        let text = directive.as_str();

        assert!(text.starts_with("cartoon illustration style, children's book art"));
        assert!(text.contains("palette: "));
        assert!(text.contains("line style: "));
        assert!(text.contains("character consistency: "));
        assert!(text.ends_with("no extra limbs or distorted faces"));
    }

    #[test]
    fn test_directive_is_deterministic() {
        let profile = StyleProfile::default();
        assert_eq!(profile.directive(), profile.directive());
    }

    #[test]
    fn test_apply_appends_directive_verbatim() {
        let directive = StyleProfile::default().directive();
        let prompt = directive.apply("A boy hugs a puppy under a streetlamp.");

        assert!(prompt.starts_with("A boy hugs a puppy under a streetlamp, "));
        assert!(prompt.ends_with(directive.as_str()));
    }

    #[test]
    fn test_profile_loads_from_yaml_with_defaults_for_missing_fields() {
        let yaml = "name: watercolor\nmedium: [soft watercolor, storybook art]\n";
        let profile: StyleProfile = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(profile.name, "watercolor");
        assert_eq!(profile.medium, vec!["soft watercolor", "storybook art"]);
        assert_eq!(profile.palette, StyleProfile::default().palette);
        assert!(profile.directive().as_str().starts_with("soft watercolor, storybook art"));
    }
}
