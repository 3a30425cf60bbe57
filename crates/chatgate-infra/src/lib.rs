//! # Chatgate Infrastructure
//!
//! Concrete implementations of the ports defined in `chatgate-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No adapters compiled in
//! - `rate-limit` - In-memory fixed-window rate limiter (clock via governor)
//! - `openai` - OpenAI chat completions client via reqwest

#[cfg(feature = "openai")]
pub mod completion;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

#[cfg(feature = "openai")]
pub use completion::{OpenAiCompletionProvider, OpenAiConfig};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{FixedWindowRateLimiter, RateLimitConfig};
