use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The platform an app idea targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Web,
    Mobile,
    Both,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Mobile => "mobile",
            Self::Both => "both",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" => Some(Self::Web),
            "mobile" => Some(Self::Mobile),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejection raised before any generation attempt is made.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("App idea is required")]
    MissingIdea,

    #[error("Target platform is required")]
    MissingPlatform,

    #[error("Unknown platform '{0}', expected web, mobile or both")]
    UnknownPlatform(String),
}

/// A single user submission describing an app idea.
///
/// Built through [`GenerationRequest::new`], which enforces the required
/// fields. Blank optional fields are normalized to `None` so downstream
/// formatting never has to distinguish "empty" from "absent".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    idea_description: String,
    platform: Platform,
    target_audience: Option<String>,
    features: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        idea_description: impl Into<String>,
        platform: Platform,
        target_audience: Option<String>,
        features: Option<String>,
    ) -> Result<Self, InvalidInput> {
        let idea_description = idea_description.into().trim().to_string();
        if idea_description.is_empty() {
            return Err(InvalidInput::MissingIdea);
        }

        Ok(Self {
            idea_description,
            platform,
            target_audience: non_blank(target_audience),
            features: non_blank(features),
        })
    }

    /// Validate loosely-typed input as it arrives from a form or JSON body.
    pub fn parse(
        idea_description: Option<String>,
        platform: Option<&str>,
        target_audience: Option<String>,
        features: Option<String>,
    ) -> Result<Self, InvalidInput> {
        let idea_description = idea_description.unwrap_or_default();
        if idea_description.trim().is_empty() {
            return Err(InvalidInput::MissingIdea);
        }

        let platform = match platform.map(str::trim) {
            None | Some("") => return Err(InvalidInput::MissingPlatform),
            Some(raw) => {
                Platform::from_str(raw).ok_or_else(|| InvalidInput::UnknownPlatform(raw.into()))?
            }
        };

        Self::new(idea_description, platform, target_audience, features)
    }

    pub fn idea_description(&self) -> &str {
        &self.idea_description
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn target_audience(&self) -> Option<&str> {
        self.target_audience.as_deref()
    }

    pub fn features(&self) -> Option<&str> {
        self.features.as_deref()
    }

    /// The parsed feature list, empty when no features were supplied.
    pub fn feature_list(&self) -> Vec<String> {
        self.features.as_deref().map(parse_features).unwrap_or_default()
    }
}

/// Where a blueprint's content came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Ai,
    Fallback,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Fallback => "fallback",
        }
    }
}

/// The outcome of one pass through the generation pipeline.
///
/// `content` is never empty: when no provider succeeds, it holds the
/// fallback document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub content: String,
    pub source_kind: SourceKind,
}

/// Split a free-text feature list on commas and newlines.
///
/// Items are trimmed, leading bullet markers are dropped, and empty items
/// are discarded.
pub fn parse_features(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(|item| {
            item.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .to_string()
        })
        .filter(|item| !item.is_empty())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_features_splits_commas_and_newlines() {
        let features = parse_features("add task, complete task\n- share list\n\n,");
        assert_eq!(features, vec!["add task", "complete task", "share list"]);
    }

    #[test]
    fn request_requires_idea() {
        let err = GenerationRequest::new("   ", Platform::Web, None, None).unwrap_err();
        assert_eq!(err, InvalidInput::MissingIdea);
    }

    #[test]
    fn request_normalizes_blank_optionals() {
        let request =
            GenerationRequest::new("Todo app", Platform::Web, Some("  ".into()), Some("".into()))
                .unwrap();
        assert!(request.target_audience().is_none());
        assert!(request.features().is_none());
        assert!(request.feature_list().is_empty());
    }

    #[test]
    fn parse_rejects_missing_and_unknown_platform() {
        assert_eq!(
            GenerationRequest::parse(Some("Todo app".into()), None, None, None).unwrap_err(),
            InvalidInput::MissingPlatform
        );
        assert_eq!(
            GenerationRequest::parse(Some("Todo app".into()), Some("desktop"), None, None)
                .unwrap_err(),
            InvalidInput::UnknownPlatform("desktop".into())
        );
    }

    #[test]
    fn platform_parsing_is_case_insensitive() {
        assert_eq!(Platform::from_str(" Mobile "), Some(Platform::Mobile));
        assert_eq!(Platform::Both.to_string(), "both");
    }
}
