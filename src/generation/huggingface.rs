//! Hugging Face Inference API text-generation client.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{success_body, GenerationProvider, ProviderError};
use crate::config::ProviderSettings;

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

pub struct HuggingFaceProvider {
    settings: ProviderSettings,
    client: Client,
}

impl HuggingFaceProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            settings,
            client: Client::new(),
        }
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: Parameters,
}

#[derive(Serialize)]
struct Parameters {
    max_length: u32,
    temperature: f32,
    top_p: f32,
    do_sample: bool,
    num_return_sequences: u32,
}

#[derive(Deserialize)]
struct Generation {
    #[serde(default)]
    generated_text: String,
}

/// The API answers with a list for most models and a bare object for some.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Many(Vec<Generation>),
    One(Generation),
}

/// Trim and collapse runs of blank lines.
fn clean(text: &str) -> String {
    EXCESS_NEWLINES.replace_all(text.trim(), "\n\n").into_owned()
}

#[async_trait]
impl GenerationProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{}",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.model
        );
        let body = InferenceRequest {
            inputs: prompt,
            parameters: Parameters {
                max_length: 800,
                temperature: 0.7,
                top_p: 0.95,
                do_sample: true,
                num_return_sequences: 1,
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?;
        let text = success_body(response).await?;

        let parsed: InferenceResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::InvalidResponse(format!("huggingface: {}", e)))?;

        let generated = match parsed {
            InferenceResponse::Many(items) => items.into_iter().next().map(|g| g.generated_text),
            InferenceResponse::One(item) => Some(item.generated_text),
        }
        .unwrap_or_default();

        let cleaned = clean(&generated);
        if cleaned.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(cleaned)
    }
}
