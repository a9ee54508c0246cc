//! OpenAI chat completions provider.
//!
//! Calls `POST {base_url}/chat/completions` once per request; there is no
//! retry. Any OpenAI-compatible endpoint works by changing the base URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ChatProvider, LlmError};
use crate::models::chat::Message;

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Connection settings for the OpenAI provider.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key; a missing key is reported when a chat is attempted.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Url,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl OpenAiConfig {
    /// Build a config, validating the base URL.
    pub fn new(api_key: Option<String>, model: &str, base_url: &str) -> Result<Self, LlmError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LlmError::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        Ok(Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.to_string(),
            base_url,
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI chat completions client.
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let resp = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(api_key)
            .json(&CompletionRequest {
                model: &self.config.model,
                messages,
            })
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| LlmError::Request(format!("reading response body: {e}")))?;

        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_reply(&body)
    }
}

/// Extract the first choice's content from a completions response body.
fn parse_reply(body: &str) -> Result<String, LlmError> {
    let data: CompletionResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Decode(e.to_string()))?;
    data.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(LlmError::EmptyReply)
}
