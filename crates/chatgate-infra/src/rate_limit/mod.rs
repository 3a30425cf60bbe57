//! Rate limiting implementations.

mod lru;
mod memory;

pub use memory::{FixedWindowRateLimiter, RateLimitConfig};
