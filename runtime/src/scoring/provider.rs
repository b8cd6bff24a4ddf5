//! Pluggable model providers.
//!
//! A provider turns a prompt into completion text. [`HttpModelProvider`]
//! speaks the OpenAI-compatible chat-completions shape, which most hosted
//! and self-hosted model servers accept.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::ModelConfig;

/// Per-request knobs.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub system: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("model endpoint returned HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("model request timed out")]
    Timeout,
    #[error("model transport error: {0}")]
    Transport(String),
    #[error("malformed model response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Server-side failures and timeouts may succeed on a second attempt.
    /// Client errors (4xx) never do.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Status { code, .. } => *code >= 500,
            ProviderError::Timeout | ProviderError::Transport(_) => true,
            ProviderError::Malformed(_) => false,
        }
    }
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Model name recorded in audit metadata.
    fn name(&self) -> String;
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ProviderError>;
}

/// OpenAI-compatible `POST {base_url}/chat/completions` provider.
pub struct HttpModelProvider {
    client: reqwest::Client,
    config: ModelConfig,
}

impl HttpModelProvider {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ModelProvider for HttpModelProvider {
    fn name(&self) -> String {
        self.config.model.clone()
    }

    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": options.system},
                {"role": "user", "content": prompt},
            ],
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
        });

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .timeout(options.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                code: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::Malformed("no completion content".to_string()))
    }
}
