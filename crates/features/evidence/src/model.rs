//! The language model seam and its OpenAI-compatible HTTP implementation.

use crate::error::{EvidenceError, EvidenceErrorExt};
use async_trait::async_trait;
use brgy_domain::config::EvidenceConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, instrument};

const SYSTEM_PROMPT: &str =
    "You are a cautious fraud-risk analyst. You only ever answer with a single JSON object.";

/// One completion request. `image_url` selects the vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub prompt: String,
    pub image_url: Option<String>,
}

/// A chat-style model that returns raw completion text.
#[async_trait]
pub trait LanguageModel: Debug + Send + Sync {
    async fn complete(&self, request: &ModelRequest) -> Result<String, EvidenceError>;
}

/// Client for `POST {api_base}/chat/completions` with bearer auth.
#[derive(Debug, Clone)]
pub struct OpenAiCompatible {
    client: Client,
    config: EvidenceConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatible {
    /// Builds the HTTP client with the configured request timeout.
    ///
    /// # Errors
    /// Returns [`EvidenceError::Transport`] if the TLS backend cannot be initialized.
    pub fn new(config: &EvidenceConfig) -> Result<Self, EvidenceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.clamp(1, 10)))
            .build()
            .context("Building LLM HTTP client")?;
        Ok(Self { client, config: config.clone() })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }

    fn body<'a>(&'a self, request: &ModelRequest) -> ChatRequest<'a> {
        let (model, user_content) = match &request.image_url {
            Some(url) => (
                self.config.vision_model.as_str(),
                json!([
                    { "type": "text", "text": request.prompt },
                    { "type": "image_url", "image_url": { "url": url } },
                ]),
            ),
            None => (self.config.text_model.as_str(), json!(request.prompt)),
        };

        ChatRequest {
            model,
            messages: vec![
                json!({ "role": "system", "content": SYSTEM_PROMPT }),
                json!({ "role": "user", "content": user_content }),
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatible {
    #[instrument(skip_all, fields(vision = request.image_url.is_some()))]
    async fn complete(&self, request: &ModelRequest) -> Result<String, EvidenceError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| EvidenceError::NotConfigured {
                message: "No API key configured for the evidence model".into(),
                context: None,
            })?;

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&self.body(request))
            .send()
            .await
            .context("Sending chat completion")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EvidenceError::Status {
                message: format!("{status}").into(),
                context: Some(truncate(&detail, 200).into()),
            });
        }

        let parsed: ChatResponse = response.json().await.context("Decoding chat completion")?;
        let content = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| EvidenceError::Parse {
                message: "Model returned no content".into(),
                context: None,
            })?;

        debug!(chars = content.len(), "Chat completion received");
        Ok(content)
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> OpenAiCompatible {
        let config = EvidenceConfig {
            api_base: "https://llm.example/v1/".into(),
            vision_model: "vision-m".into(),
            text_model: "text-m".into(),
            ..EvidenceConfig::default()
        };
        OpenAiCompatible::new(&config).unwrap()
    }

    #[test]
    fn endpoint_joins_base_without_double_slash() {
        assert_eq!(model().endpoint(), "https://llm.example/v1/chat/completions");
    }

    #[test]
    fn vision_requests_attach_the_image() {
        let model = model();
        let request =
            ModelRequest { prompt: "p".into(), image_url: Some("https://x/a.jpg".into()) };
        let body = serde_json::to_value(model.body(&request)).unwrap();

        assert_eq!(body["model"], "vision-m");
        assert_eq!(body["messages"][1]["content"][0]["type"], "text");
        assert_eq!(body["messages"][1]["content"][1]["image_url"]["url"], "https://x/a.jpg");
    }

    #[test]
    fn text_requests_use_the_text_model() {
        let model = model();
        let body =
            serde_json::to_value(model.body(&ModelRequest { prompt: "p".into(), image_url: None }))
                .unwrap();

        assert_eq!(body["model"], "text-m");
        assert_eq!(body["messages"][1]["content"], "p");
    }

    #[tokio::test]
    async fn missing_api_key_is_not_configured() {
        let err = model()
            .complete(&ModelRequest { prompt: "p".into(), image_url: None })
            .await
            .unwrap_err();
        assert!(matches!(err, EvidenceError::NotConfigured { .. }));
    }
}
