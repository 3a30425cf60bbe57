//! Domain entities - the core business objects.

mod completion;
mod message;
mod prompt;

pub use completion::{CompletionChoice, CompletionRequest};
pub use message::{ChatMessage, ChatTranscript, Role};
pub use prompt::PromptTemplate;
