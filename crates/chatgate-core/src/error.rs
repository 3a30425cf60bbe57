//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business rule violations in caller-supplied input.
///
/// The display text of each variant is safe to show to API callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Message is required")]
    EmptyTranscript,

    #[error("Unsupported message role: {0}")]
    UnsupportedRole(String),
}
