//! Generation providers and the ordered chain that tries them.
//!
//! Every backend implements [`GenerationProvider`]. A [`ProviderChain`] tries
//! its providers in order under a per-attempt timeout and returns the first
//! non-empty text. An error, an empty reply, or a timeout moves on to the next
//! provider; there is no backoff and no retry beyond the list.

pub mod anthropic;
pub mod bridge;
pub mod gemini;
pub mod huggingface;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::{GenerationConfig, ProviderKind};

pub use anthropic::AnthropicProvider;
pub use bridge::{AssistantBridge, BridgeProvider, BridgeReply, HttpAssistantBridge};
pub use gemini::GeminiProvider;
pub use huggingface::HuggingFaceProvider;

/// Why a single provider attempt failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Provider returned no content")]
    Empty,

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// A text-generation backend.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short name used in logs and failure reports.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

pub type DynProvider = Arc<dyn GenerationProvider>;

/// One failed attempt inside a chain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: String,
    pub reason: String,
}

/// Every configured provider failed, or none was configured.
#[derive(Debug, Clone)]
pub struct GenerationUnavailable {
    pub failures: Vec<ProviderFailure>,
}

impl std::error::Error for GenerationUnavailable {}

impl fmt::Display for GenerationUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return f.write_str("No generation provider configured");
        }
        write!(f, "All generation providers failed: ")?;
        let parts: Vec<String> = self
            .failures
            .iter()
            .map(|fail| format!("{}: {}", fail.provider, fail.reason))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Text produced by a named provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub provider: String,
    pub text: String,
}

/// Ordered providers with first-success semantics.
#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<DynProvider>,
    timeout: Duration,
}

impl fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("ProviderChain")
            .field("providers", &names)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderChain {
    pub fn new(providers: Vec<DynProvider>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// A chain with no providers. Every run reports [`GenerationUnavailable`].
    pub fn empty() -> Self {
        Self::new(Vec::new(), Duration::from_secs(1))
    }

    /// Build providers for every configured entry in `config.order`.
    ///
    /// The bridge provider is always added when listed; `bridge` overrides
    /// the HTTP bridge derived from config, so an embedding host can inject
    /// its own.
    pub fn from_config(config: &GenerationConfig, bridge: Option<Arc<dyn AssistantBridge>>) -> Self {
        let mut providers: Vec<DynProvider> = Vec::new();

        for kind in &config.order {
            let provider: Option<DynProvider> = match kind {
                ProviderKind::Gemini => config
                    .gemini
                    .clone()
                    .map(|s| Arc::new(GeminiProvider::new(s)) as DynProvider),
                ProviderKind::Anthropic => config
                    .anthropic
                    .clone()
                    .map(|s| Arc::new(AnthropicProvider::new(s)) as DynProvider),
                ProviderKind::HuggingFace => config
                    .huggingface
                    .clone()
                    .map(|s| Arc::new(HuggingFaceProvider::new(s)) as DynProvider),
                ProviderKind::Bridge => {
                    let injected = bridge.clone().or_else(|| {
                        config.bridge.as_ref().map(|s| {
                            Arc::new(HttpAssistantBridge::new(s.url.clone())) as Arc<dyn AssistantBridge>
                        })
                    });
                    let model = config
                        .bridge
                        .as_ref()
                        .map(|s| s.model.clone())
                        .unwrap_or_else(|| crate::config::DEFAULT_BRIDGE_MODEL.to_string());
                    Some(Arc::new(BridgeProvider::new(injected, model)) as DynProvider)
                }
            };

            match provider {
                Some(p) => providers.push(p),
                None => tracing::debug!("Provider {} not configured, skipping", kind.as_str()),
            }
        }

        Self::new(providers, config.timeout)
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Try each provider in order and return the first non-empty text.
    pub async fn generate(&self, prompt: &str) -> Result<Generated, GenerationUnavailable> {
        let mut failures = Vec::new();

        for provider in &self.providers {
            let name = provider.name().to_string();
            tracing::debug!("Requesting blueprint from {}", name);

            let outcome = match tokio::time::timeout(self.timeout, provider.generate(prompt)).await {
                Ok(Ok(text)) if text.trim().is_empty() => Err(ProviderError::Empty),
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.timeout)),
            };

            match outcome {
                Ok(text) => {
                    tracing::info!("Generated blueprint with {}", name);
                    return Ok(Generated { provider: name, text });
                }
                Err(e) => {
                    tracing::warn!("Provider {} failed: {}", name, e);
                    failures.push(ProviderFailure {
                        provider: name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(GenerationUnavailable { failures })
    }
}

/// Return the body of a successful response, or a status error with the body.
pub(crate) async fn success_body(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(ProviderError::Status { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        name: &'static str,
        reply: Result<&'static str, &'static str>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(name: &'static str, text: &'static str) -> Arc<Self> {
            Arc::new(Self { name, reply: Ok(text), delay: None, calls: AtomicUsize::new(0) })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self { name, reply: Err("boom"), delay: None, calls: AtomicUsize::new(0) })
        }

        fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
            Arc::new(Self { name, reply: Ok("late"), delay: Some(delay), calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl GenerationProvider for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply
                .map(String::from)
                .map_err(|e| ProviderError::Unavailable(e.to_string()))
        }
    }

    fn chain(providers: Vec<DynProvider>) -> ProviderChain {
        ProviderChain::new(providers, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn returns_first_success() {
        let first = Scripted::ok("first", "one");
        let second = Scripted::ok("second", "two");
        let result = chain(vec![first.clone(), second.clone()]).generate("p").await.unwrap();

        assert_eq!(result.provider, "first");
        assert_eq!(result.text, "one");
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn moves_past_errors_and_empty_text() {
        let failing = Scripted::failing("failing");
        let blank = Scripted::ok("blank", "   \n");
        let good = Scripted::ok("good", "blueprint");
        let result = chain(vec![failing.clone(), blank, good]).generate("p").await.unwrap();

        assert_eq!(result.provider, "good");
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn timeout_counts_as_failure() {
        let slow = Scripted::slow("slow", Duration::from_secs(5));
        let good = Scripted::ok("good", "fast");
        let result = chain(vec![slow, good]).generate("p").await.unwrap();
        assert_eq!(result.text, "fast");
    }

    #[tokio::test]
    async fn reports_every_failure() {
        let err = chain(vec![Scripted::failing("a"), Scripted::ok("b", "")])
            .generate("p")
            .await
            .unwrap_err();

        assert_eq!(err.failures.len(), 2);
        assert_eq!(err.failures[0].provider, "a");
        assert!(err.failures[0].reason.contains("boom"));
        assert_eq!(err.failures[1].reason, "Provider returned no content");
    }

    #[tokio::test]
    async fn empty_chain_is_unavailable() {
        let err = ProviderChain::empty().generate("p").await.unwrap_err();
        assert!(err.failures.is_empty());
        assert_eq!(err.to_string(), "No generation provider configured");
    }

    #[test]
    fn from_config_skips_unconfigured_providers() {
        let mut config = GenerationConfig::offline();
        config.order = vec![ProviderKind::Gemini, ProviderKind::Anthropic];
        config.anthropic = Some(crate::config::ProviderSettings {
            api_key: "k".into(),
            model: "m".into(),
            api_base: "http://localhost".into(),
        });

        let chain = ProviderChain::from_config(&config, None);
        assert_eq!(chain.provider_names(), vec!["anthropic"]);
    }
}
