use serde::{Deserialize, Serialize};

use super::message::ChatMessage;

/// A fully prepared request for the completion provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, temperature: f32, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            temperature,
            messages,
        }
    }
}

/// One generated alternative returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: Option<ChatMessage>,
    pub finish_reason: Option<String>,
}
