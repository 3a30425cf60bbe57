//! In-memory fixed-window rate limiter with a bounded, LRU-evicted store.

use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock, Reference};
use tokio::sync::Mutex;

use chatgate_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

use super::lru::LruStore;

/// In-memory rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Length of one counting window.
    pub window: Duration,
    /// Maximum number of (token, bucket) records tracked at once.
    pub max_tracked_tokens: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(60_000),
            max_tracked_tokens: 500,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            window: std::env::var("RATE_LIMIT_WINDOW_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.window),
            max_tracked_tokens: std::env::var("RATE_LIMIT_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_tracked_tokens),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct UsageKey {
    bucket: String,
    token: String,
}

#[derive(Debug, Clone, Copy)]
struct UsageRecord<I> {
    count: u32,
    window_start: I,
}

/// Fixed-window request counter keyed by client token and quota bucket.
///
/// Every check runs inside one critical section, so the read-increment-compare
/// sequence is atomic per call and the LRU index is never observed half
/// updated. A request that is denied is still counted; a run of denied
/// requests therefore never restarts the window.
///
/// Note: counters live in process memory and are not shared between instances.
pub struct FixedWindowRateLimiter<C: Clock = DefaultClock> {
    store: Mutex<LruStore<UsageKey, UsageRecord<C::Instant>>>,
    clock: C,
    config: RateLimitConfig,
}

impl FixedWindowRateLimiter<DefaultClock> {
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        Self::with_clock(config, DefaultClock::default())
    }
}

impl<C: Clock> FixedWindowRateLimiter<C> {
    /// Build a limiter that reads time from `clock`.
    pub fn with_clock(config: RateLimitConfig, clock: C) -> Result<Self, RateLimitError> {
        if config.window.is_zero() {
            return Err(RateLimitError::InvalidArgument(
                "window must be longer than zero".to_string(),
            ));
        }
        if config.max_tracked_tokens == 0 {
            return Err(RateLimitError::InvalidArgument(
                "max_tracked_tokens must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            store: Mutex::new(LruStore::new(config.max_tracked_tokens)),
            clock,
            config,
        })
    }

    /// Number of records currently held.
    pub async fn tracked_keys(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Drop every record whose window has elapsed. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut store = self.store.lock().await;
        store.retain(|_, record| self.elapsed(record.window_start, now) < self.config.window)
    }

    fn elapsed(&self, since: C::Instant, now: C::Instant) -> Duration {
        Duration::from(now.duration_since(since))
    }
}

#[async_trait]
impl<C> RateLimiter for FixedWindowRateLimiter<C>
where
    C: Clock + Send + Sync,
    C::Instant: Send + Sync,
{
    async fn check_and_consume(
        &self,
        token: &str,
        bucket: &str,
        limit: u32,
    ) -> Result<RateLimitResult, RateLimitError> {
        if token.is_empty() {
            return Err(RateLimitError::InvalidArgument(
                "client token must not be empty".to_string(),
            ));
        }
        if bucket.is_empty() {
            return Err(RateLimitError::InvalidArgument(
                "bucket name must not be empty".to_string(),
            ));
        }
        if limit == 0 {
            return Err(RateLimitError::InvalidArgument(
                "limit must be at least 1".to_string(),
            ));
        }

        let key = UsageKey {
            bucket: bucket.to_string(),
            token: token.to_string(),
        };
        let fresh = |now: C::Instant| UsageRecord {
            count: 1,
            window_start: now,
        };

        let mut store = self.store.lock().await;
        let now = self.clock.now();

        let record = match store.get_mut(&key) {
            Some(record) if self.elapsed(record.window_start, now) < self.config.window => {
                record.count = record.count.saturating_add(1);
                *record
            }
            Some(record) => {
                *record = fresh(now);
                *record
            }
            None => {
                if let Some((evicted, _)) = store.insert(key, fresh(now)) {
                    tracing::debug!(
                        token = %evicted.token,
                        bucket = %evicted.bucket,
                        "Evicted least recently used rate limit record"
                    );
                }
                fresh(now)
            }
        };
        drop(store);

        let allowed = record.count <= limit;
        Ok(RateLimitResult {
            allowed,
            limit,
            remaining: limit.saturating_sub(record.count),
            reset_after: self
                .config
                .window
                .saturating_sub(self.elapsed(record.window_start, now)),
        })
    }
}
