//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use chatgate_core::domain::PromptTemplate;
use chatgate_infra::{OpenAiConfig, RateLimitConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Key quotas on `Forwarded` / `X-Forwarded-For` instead of the peer address.
    pub trust_proxy_headers: bool,
    pub completion: CompletionSettings,
    pub quota: QuotaSettings,
    pub openai: OpenAiConfig,
}

/// How caller conversations are turned into provider requests.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub prompt: PromptTemplate,
    /// Upper bound on one provider round trip.
    pub provider_timeout: Duration,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.6,
            prompt: PromptTemplate::new("Answer as Maksym Boytsov: ", ""),
            provider_timeout: Duration::from_secs(30),
        }
    }
}

impl CompletionSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model: env::var("OPENAI_MODEL").unwrap_or(defaults.model),
            temperature: env::var("OPENAI_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.temperature),
            prompt: PromptTemplate::new(
                env::var("PERSONA_INSTRUCTION").unwrap_or(defaults.prompt.persona_instruction),
                env::var("OPENAI_PROMPT").unwrap_or_default(),
            ),
            provider_timeout: env::var("OPENAI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.provider_timeout),
        }
    }
}

/// Quota applied to the completion endpoint.
#[derive(Debug, Clone)]
pub struct QuotaSettings {
    /// Bucket name the completion requests are counted under.
    pub bucket: String,
    /// Requests allowed per client per window.
    pub max_requests: u32,
    pub limiter: RateLimitConfig,
}

impl Default for QuotaSettings {
    fn default() -> Self {
        Self {
            bucket: "COMPLETION".to_string(),
            max_requests: 5,
            limiter: RateLimitConfig::default(),
        }
    }
}

impl QuotaSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bucket: env::var("RATE_LIMIT_BUCKET").unwrap_or(defaults.bucket),
            max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_requests),
            limiter: RateLimitConfig::from_env(),
        }
    }

    /// Human-readable window used in throttling messages.
    pub fn window_label(&self) -> String {
        match self.limiter.window.as_secs() {
            60 if self.limiter.window.subsec_nanos() == 0 => "minute".to_string(),
            1 if self.limiter.window.subsec_nanos() == 0 => "second".to_string(),
            _ => format!("{} seconds", self.limiter.window.as_secs_f64()),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            trust_proxy_headers: env::var("TRUST_PROXY_HEADERS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            completion: CompletionSettings::from_env(),
            quota: QuotaSettings::from_env(),
            openai: OpenAiConfig::from_env(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
