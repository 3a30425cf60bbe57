//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// A chat message as sent by API callers.
///
/// `role` is kept as free text here; the server decides which roles it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub role: String,
    pub content: String,
}

/// Body of `POST /api/ai/create-chat-completion`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessageDto>>,
}

/// A generated completion alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDto {
    pub index: u32,
    pub message: Option<ChatMessageDto>,
    pub finish_reason: Option<String>,
}

/// Successful completion response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChoiceDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_without_messages_field() {
        let req: ChatCompletionRequest = serde_json::from_str("{}").unwrap();
        assert!(req.messages.is_none());

        let req: ChatCompletionRequest = serde_json::from_str(r#"{"messages": null}"#).unwrap();
        assert!(req.messages.is_none());
    }

    #[test]
    fn test_request_ignores_unknown_fields() {
        let req: ChatCompletionRequest = serde_json::from_str(
            r#"{"model": "ignored", "messages": [{"role": "user", "content": "Hello"}]}"#,
        )
        .unwrap();

        assert_eq!(
            req.messages.unwrap(),
            vec![ChatMessageDto {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }]
        );
    }

    #[test]
    fn test_empty_response_serializes_choices_array() {
        let json = serde_json::to_value(ChatCompletionResponse::default()).unwrap();
        assert_eq!(json, serde_json::json!({"choices": []}));
    }
}
