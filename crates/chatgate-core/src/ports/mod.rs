//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod completion;
mod rate_limit;

pub use completion::{CompletionError, CompletionProvider};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
