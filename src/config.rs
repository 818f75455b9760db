//! Process configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Per-attempt ceiling, kept under typical host request limits.
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 50;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_HUGGINGFACE_MODEL: &str = "google/flan-t5-large";
pub const DEFAULT_HUGGINGFACE_API_BASE: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_BRIDGE_MODEL: &str = "claude-3-5-sonnet";

/// A generation backend that can appear in the provider chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Anthropic,
    HuggingFace,
    Bridge,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
            Self::HuggingFace => "huggingface",
            Self::Bridge => "bridge",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "huggingface" | "hf" => Some(Self::HuggingFace),
            "bridge" | "puter" => Some(Self::Bridge),
            _ => None,
        }
    }

    pub fn default_order() -> Vec<Self> {
        vec![Self::Gemini, Self::Anthropic, Self::HuggingFace, Self::Bridge]
    }
}

/// Credentials and endpoint for one HTTP-backed provider.
#[derive(Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Settings for the assistant bridge provider.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub url: String,
    pub model: String,
}

/// Everything the generation chain needs to know.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Providers to try, in order. Unconfigured ones are skipped.
    pub order: Vec<ProviderKind>,
    pub timeout: Duration,
    pub gemini: Option<ProviderSettings>,
    pub anthropic: Option<ProviderSettings>,
    pub huggingface: Option<ProviderSettings>,
    pub bridge: Option<BridgeSettings>,
}

impl GenerationConfig {
    /// No providers at all; every request uses the fallback blueprint.
    pub fn offline() -> Self {
        Self {
            order: ProviderKind::default_order(),
            timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            gemini: None,
            anthropic: None,
            huggingface: None,
            bridge: None,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let order = match var("IDEASTRUCT_PROVIDERS") {
            Some(list) => list
                .split(',')
                .filter_map(|name| {
                    let kind = ProviderKind::from_str(name);
                    if kind.is_none() {
                        tracing::warn!("Ignoring unknown provider in IDEASTRUCT_PROVIDERS: {}", name);
                    }
                    kind
                })
                .collect(),
            None => ProviderKind::default_order(),
        };

        let timeout_secs = var("IDEASTRUCT_GENERATION_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS);

        let settings = |key: Option<String>, model_var: &str, base_var: &str, model: &str, base: &str| {
            key.map(|api_key| ProviderSettings {
                api_key,
                model: var(model_var).unwrap_or_else(|| model.to_string()),
                api_base: var(base_var).unwrap_or_else(|| base.to_string()),
            })
        };

        Self {
            order,
            timeout: Duration::from_secs(timeout_secs),
            gemini: settings(
                var("GEMINI_API_KEY").or_else(|| var("GOOGLE_API_KEY")),
                "GEMINI_MODEL",
                "GEMINI_API_BASE",
                DEFAULT_GEMINI_MODEL,
                DEFAULT_GEMINI_API_BASE,
            ),
            anthropic: settings(
                var("ANTHROPIC_API_KEY"),
                "ANTHROPIC_MODEL",
                "ANTHROPIC_API_BASE",
                DEFAULT_ANTHROPIC_MODEL,
                DEFAULT_ANTHROPIC_API_BASE,
            ),
            huggingface: settings(
                var("HUGGINGFACE_API_KEY"),
                "HUGGINGFACE_MODEL",
                "HUGGINGFACE_API_BASE",
                DEFAULT_HUGGINGFACE_MODEL,
                DEFAULT_HUGGINGFACE_API_BASE,
            ),
            bridge: var("IDEASTRUCT_BRIDGE_URL").map(|url| BridgeSettings {
                url,
                model: var("IDEASTRUCT_BRIDGE_MODEL")
                    .unwrap_or_else(|| DEFAULT_BRIDGE_MODEL.to_string()),
            }),
        }
    }
}

/// HTTP-facing settings (CORS).
#[derive(Debug, Clone, Default)]
pub struct SecurityConfig {
    /// Allowed CORS origins (from IDEASTRUCT_CORS_ORIGINS, comma-separated).
    /// `None` means permissive.
    pub cors_origins: Option<Vec<String>>,
}

impl SecurityConfig {
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("IDEASTRUCT_CORS_ORIGINS").ok().map(|s| {
            s.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });
        Self { cors_origins }
    }

    /// Create a config with specific CORS origins.
    pub fn with_cors_origins(origins: Vec<String>) -> Self {
        Self {
            cors_origins: Some(origins),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Explicit database file, otherwise the platform data directory is used.
    pub db_path: Option<PathBuf>,
    pub generation: GenerationConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var("IDEASTRUCT_DB_PATH").ok().map(PathBuf::from),
            generation: GenerationConfig::from_env(),
            security: SecurityConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_configures_no_providers() {
        let config = GenerationConfig::from_lookup(lookup(&[]));
        assert_eq!(config.order, ProviderKind::default_order());
        assert_eq!(config.timeout, Duration::from_secs(50));
        assert!(config.gemini.is_none());
        assert!(config.anthropic.is_none());
        assert!(config.huggingface.is_none());
        assert!(config.bridge.is_none());
    }

    #[test]
    fn google_key_is_accepted_for_gemini() {
        let config = GenerationConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "g-key")]));
        let gemini = config.gemini.expect("gemini configured");
        assert_eq!(gemini.api_key, "g-key");
        assert_eq!(gemini.model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn provider_order_skips_unknown_names() {
        let config = GenerationConfig::from_lookup(lookup(&[(
            "IDEASTRUCT_PROVIDERS",
            "anthropic, nope ,gemini",
        )]));
        assert_eq!(
            config.order,
            vec![ProviderKind::Anthropic, ProviderKind::Gemini]
        );
    }

    #[test]
    fn invalid_timeout_uses_default() {
        let config = GenerationConfig::from_lookup(lookup(&[(
            "IDEASTRUCT_GENERATION_TIMEOUT_SECS",
            "0",
        )]));
        assert_eq!(config.timeout, Duration::from_secs(50));

        let config = GenerationConfig::from_lookup(lookup(&[(
            "IDEASTRUCT_GENERATION_TIMEOUT_SECS",
            "12",
        )]));
        assert_eq!(config.timeout, Duration::from_secs(12));
    }

    #[test]
    fn blank_key_counts_as_unset() {
        let config = GenerationConfig::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "  ")]));
        assert!(config.anthropic.is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = GenerationConfig::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "secret")]));
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
