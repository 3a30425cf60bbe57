//! Completion provider port.

use async_trait::async_trait;

use crate::domain::{CompletionChoice, CompletionRequest};

/// Completion provider trait - abstraction over hosted chat models.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send a prepared conversation and return the generated choices.
    async fn create_chat_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<Vec<CompletionChoice>, CompletionError>;
}

/// Completion provider errors.
///
/// These carry provider detail for operators and must not be shown to callers.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("Transport failed: {0}")]
    Transport(String),

    #[error("Provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    Decode(String),

    #[error("Provider did not respond within {0:?}")]
    Timeout(std::time::Duration),
}
