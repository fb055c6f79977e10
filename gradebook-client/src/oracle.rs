//! Grading oracle transport
//!
//! The oracle is a chat-completion endpoint (OpenAI wire format, OpenRouter by
//! default). It is treated as text in, text out: one user prompt per request,
//! the first choice's message text back.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::OracleError;

/// Result type alias for oracle operations
pub type OracleResult<T> = std::result::Result<T, OracleError>;

/// Default chat-completion endpoint base
pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "mistralai/devstral-2512:free";

/// A text-in/text-out completion service
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    /// Sends one prompt and returns the raw reply text
    async fn complete(&self, prompt: &str) -> OracleResult<String>;
}

/// Chat-completion implementation of [`CompletionOracle`]
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl ChatCompletionClient {
    /// Creates a client for `base_url` using `model`
    ///
    /// A missing key is not an error until a request is attempted.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, model, Client::new())
    }

    /// Creates a client using a preconfigured reqwest client
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl CompletionOracle for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> OracleResult<String> {
        let api_key = self.api_key.as_deref().ok_or(OracleError::MissingCredential)?;
        let url = format!("{}/chat/completions", self.base_url);

        debug!("Sending {} byte prompt to {}", prompt.len(), self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Oracle returned {}: {}", status, message);
            return Err(OracleError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedReply(e.to_string()))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| OracleError::MalformedReply("reply has no message content".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}
