//! Assistant bridge provider.
//!
//! A bridge is a chat capability supplied by the host environment rather than
//! an API we call directly. It is injected as an optional dependency; when no
//! bridge is present the provider reports itself unavailable and the chain
//! moves on.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{success_body, GenerationProvider, ProviderError};

/// A reply in the bridge's chat format: message content split into parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeReply {
    pub message: BridgeMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeMessage {
    #[serde(default)]
    pub content: Vec<BridgePart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgePart {
    #[serde(default)]
    pub text: String,
}

impl BridgeReply {
    /// All text parts joined by newlines, trimmed.
    pub fn text(&self) -> String {
        self.message
            .content
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

/// A host-provided chat capability.
#[async_trait]
pub trait AssistantBridge: Send + Sync {
    async fn chat(&self, prompt: &str, model: &str) -> Result<BridgeReply, ProviderError>;
}

/// Bridge reached over HTTP at a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpAssistantBridge {
    url: String,
    client: Client,
}

impl HttpAssistantBridge {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
    options: ChatOptions<'a>,
}

#[derive(Serialize)]
struct ChatOptions<'a> {
    model: &'a str,
    stream: bool,
}

#[async_trait]
impl AssistantBridge for HttpAssistantBridge {
    async fn chat(&self, prompt: &str, model: &str) -> Result<BridgeReply, ProviderError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ChatRequest {
                prompt,
                options: ChatOptions {
                    model,
                    stream: false,
                },
            })
            .send()
            .await?;
        let body = success_body(response).await?;

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("bridge: {}", e)))
    }
}

/// Generation provider backed by an optional [`AssistantBridge`].
pub struct BridgeProvider {
    bridge: Option<Arc<dyn AssistantBridge>>,
    model: String,
}

impl BridgeProvider {
    pub fn new(bridge: Option<Arc<dyn AssistantBridge>>, model: impl Into<String>) -> Self {
        Self {
            bridge,
            model: model.into(),
        }
    }
}

#[async_trait]
impl GenerationProvider for BridgeProvider {
    fn name(&self) -> &str {
        "bridge"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let bridge = self
            .bridge
            .as_ref()
            .ok_or_else(|| ProviderError::Unavailable("assistant bridge not present".into()))?;

        let text = bridge.chat(prompt, &self.model).await?.text();
        if text.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(text)
    }
}
