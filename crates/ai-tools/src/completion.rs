//! Chat-completion backends.

use crate::error::{AiError, Result};
use async_trait::async_trait;
use hero_http_tools::response::api_failure;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";

/// A hosted language model that turns a system + user prompt into text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    fn model(&self) -> &str;

    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// OpenAI-compatible `POST /chat/completions`.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatClient {
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid base URL.
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let mut endpoint = Url::parse(base_url).map_err(|e| {
            AiError::Config(format!("Invalid completion base URL '{base_url}': {e}"))
        })?;
        endpoint
            .path_segments_mut()
            .map_err(|()| {
                AiError::Config(format!("Completion base URL '{base_url}' cannot be a base"))
            })?
            .pop_if_empty()
            .extend(["chat", "completions"]);

        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiChatClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        tracing::debug!(model = %self.model, prompt_chars = user.len(), "chat completion request");
        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AiError::Api(api_failure(resp).await));
        }

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::Decode("response contained no message content".to_string()))
    }
}
