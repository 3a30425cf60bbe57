//! OpenAI chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use chatgate_core::domain::{ChatMessage, CompletionChoice, CompletionRequest, Role};
use chatgate_core::ports::{CompletionError, CompletionProvider};

/// OpenAI client configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// API root, without the trailing `/chat/completions`.
    pub base_url: String,
    pub organization: Option<String>,
    pub connect_timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            organization: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl OpenAiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            organization: std::env::var("OPENAI_ORGANIZATION").ok(),
            connect_timeout: std::env::var("OPENAI_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
        }
    }
}

/// Completion provider backed by the OpenAI `chat/completions` endpoint.
pub struct OpenAiCompletionProvider {
    client: Client,
    endpoint: String,
    config: OpenAiConfig,
}

impl OpenAiCompletionProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        if config.api_key.is_empty() {
            tracing::warn!("OPENAI_API_KEY is not set; completion requests will be rejected upstream");
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionProvider {
    async fn create_chat_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<Vec<CompletionChoice>, CompletionError> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request);

        if let Some(organization) = &self.config.organization {
            builder = builder.header("OpenAI-Organization", organization);
        }

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = builder
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        decode_choices(&body)
    }
}

#[derive(Deserialize)]
struct ChatCompletionBody {
    #[serde(default)]
    choices: Option<Vec<WireChoice>>,
}

#[derive(Deserialize)]
struct WireChoice {
    #[serde(default)]
    index: u32,
    message: Option<WireMessage>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireMessage {
    role: Role,
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl From<WireChoice> for CompletionChoice {
    fn from(choice: WireChoice) -> Self {
        Self {
            index: choice.index,
            message: choice
                .message
                .map(|m| ChatMessage::new(m.role, m.content.unwrap_or_default())),
            finish_reason: choice.finish_reason,
        }
    }
}

fn decode_choices(body: &[u8]) -> Result<Vec<CompletionChoice>, CompletionError> {
    let parsed: ChatCompletionBody =
        serde_json::from_slice(body).map_err(|e| CompletionError::Decode(e.to_string()))?;

    Ok(parsed
        .choices
        .unwrap_or_default()
        .into_iter()
        .map(CompletionChoice::from)
        .collect())
}

/// Best-effort extraction of the provider's error text.
fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}
