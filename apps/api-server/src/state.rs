//! Application state - shared across all handlers.

use std::sync::Arc;

use chatgate_core::ports::{CompletionProvider, RateLimiter};

use crate::config::{CompletionSettings, QuotaSettings};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub completions: Arc<dyn CompletionProvider>,
    pub completion: Arc<CompletionSettings>,
    pub quota: Arc<QuotaSettings>,
}

impl AppState {
    /// Build the application state from already constructed adapters.
    pub fn new(
        rate_limiter: Arc<dyn RateLimiter>,
        completions: Arc<dyn CompletionProvider>,
        completion: CompletionSettings,
        quota: QuotaSettings,
    ) -> Self {
        tracing::info!(
            model = %completion.model,
            bucket = %quota.bucket,
            max_requests = quota.max_requests,
            window_ms = quota.limiter.window.as_millis() as u64,
            "Application state initialized"
        );

        Self {
            rate_limiter,
            completions,
            completion: Arc::new(completion),
            quota: Arc::new(quota),
        }
    }
}
