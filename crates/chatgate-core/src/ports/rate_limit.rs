//! Rate limiting port.

use async_trait::async_trait;
use std::time::Duration;

/// Rate limiter trait - abstraction over quota-enforcing backends.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record one request for `token` under `bucket` and decide whether it may
    /// proceed, given at most `limit` requests per window.
    ///
    /// Denied requests are still counted. Empty identifiers and a zero limit
    /// are rejected with [`RateLimitError::InvalidArgument`] without touching
    /// any state.
    async fn check_and_consume(
        &self,
        token: &str,
        bucket: &str,
        limit: u32,
    ) -> Result<RateLimitResult, RateLimitError>;
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

/// Rate limit errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
