use chrono::NaiveDate;

use super::message::{ChatMessage, ChatTranscript, Role};

/// Fixed prompt material injected around every caller conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Prefix prepended to the content of every user message.
    pub persona_instruction: String,
    /// Operator-supplied fragment appended to the dated system message.
    pub system_prompt: String,
}

impl PromptTemplate {
    pub fn new(persona_instruction: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            persona_instruction: persona_instruction.into(),
            system_prompt: system_prompt.into(),
        }
    }

    /// The synthesized leading system message for the given calendar date.
    pub fn system_message(&self, today: NaiveDate) -> ChatMessage {
        ChatMessage::system(format!(
            "Today is {}. {}",
            today.format("%Y-%m-%d"),
            self.system_prompt
        ))
    }

    /// Rewrite a transcript into the sequence sent to the completion provider.
    ///
    /// The result always starts with one system message; caller messages keep
    /// their order and only user messages are altered.
    pub fn apply(&self, transcript: ChatTranscript, today: NaiveDate) -> Vec<ChatMessage> {
        let messages = transcript.into_messages();
        let mut augmented = Vec::with_capacity(messages.len() + 1);
        augmented.push(self.system_message(today));
        augmented.extend(messages.into_iter().map(|mut message| {
            if message.role == Role::User {
                message.content = format!("{}{}", self.persona_instruction, message.content);
            }
            message
        }));
        augmented
    }
}
