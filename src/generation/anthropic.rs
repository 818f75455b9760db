use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{success_body, GenerationProvider, ProviderError};
use crate::config::ProviderSettings;

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1500;
const TEMPERATURE: f32 = 0.7;

/// Anthropic Messages API client.
pub struct AnthropicProvider {
    settings: ProviderSettings,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            settings,
            client: Client::new(),
        }
    }
}

#[derive(Serialize)]
struct MsgRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Msg<'a>>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MsgResponse {
    #[serde(default)]
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

#[async_trait]
impl GenerationProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.settings.api_base.trim_end_matches('/'));
        let body = MsgRequest {
            model: &self.settings.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;
        let text = success_body(response).await?;

        let parsed: MsgResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::InvalidResponse(format!("anthropic: {}", e)))?;

        parsed
            .content
            .into_iter()
            .find(|b| b.r#type == "text" && !b.text.trim().is_empty())
            .map(|b| b.text)
            .ok_or(ProviderError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base: String) -> AnthropicProvider {
        AnthropicProvider::new(ProviderSettings {
            api_key: "a-key".into(),
            model: "claude-3-sonnet-20240229".into(),
            api_base: base,
        })
    }

    #[tokio::test]
    async fn returns_first_text_block() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "a-key")
            .match_header("anthropic-version", API_VERSION)
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "claude-3-sonnet-20240229",
                "max_tokens": 1500,
                "messages": [{ "role": "user", "content": "prompt" }]
            })))
            .with_status(200)
            .with_body(r##"{"content":[{"type":"text","text":"# Blueprint"}]}"##)
            .create_async()
            .await;

        let text = provider(server.url()).generate("prompt").await.unwrap();
        assert_eq!(text, "# Blueprint");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = provider(server.url()).generate("prompt").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unauthorized_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body(r#"{"error":"invalid x-api-key"}"#)
            .create_async()
            .await;

        let err = provider(server.url()).generate("prompt").await.unwrap_err();
        assert!(matches!(err, ProviderError::Status { status, .. } if status.as_u16() == 401));
    }
}
