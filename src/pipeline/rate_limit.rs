//! Pacing between external calls
//!
//! The pipeline acquires a permit before each article. Strategies are
//! interchangeable behind [`RateLimiter`]: a fixed minimum interval, a token
//! bucket that allows short bursts, or no limit at all.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, sleep_until, Instant};

/// Waits until the next unit of work may start
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn acquire(&self);
}

/// Which limiter to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitStrategy {
    /// At least `delay_ms` between permits
    #[default]
    Fixed,
    /// Bursts of up to `burst` permits, refilled one per `delay_ms`
    TokenBucket,
    /// No pacing
    None,
}

/// Rate limit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub strategy: RateLimitStrategy,
    pub delay_ms: u64,
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            strategy: RateLimitStrategy::Fixed,
            delay_ms: 2000,
            burst: 1,
        }
    }
}

impl RateLimitConfig {
    pub fn build(&self) -> Arc<dyn RateLimiter> {
        let interval = Duration::from_millis(self.delay_ms);
        match self.strategy {
            RateLimitStrategy::Fixed => Arc::new(FixedDelay::new(interval)),
            RateLimitStrategy::TokenBucket => Arc::new(TokenBucket::new(self.burst, interval)),
            RateLimitStrategy::None => Arc::new(Unlimited),
        }
    }
}

/// Never waits
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

#[async_trait]
impl RateLimiter for Unlimited {
    async fn acquire(&self) {}
}

/// Minimum interval between consecutive permits; the first is immediate
#[derive(Debug)]
pub struct FixedDelay {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl FixedDelay {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }
}

#[async_trait]
impl RateLimiter for FixedDelay {
    async fn acquire(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            sleep_until(previous + self.interval).await;
        }
        *last = Some(Instant::now());
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    updated: Instant,
}

/// Token bucket: holds up to `capacity` permits, one refilled per `refill`
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill: Duration,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// A zero capacity is treated as one
    pub fn new(capacity: u32, refill: Duration) -> Self {
        let capacity = f64::from(capacity.max(1));
        Self {
            capacity,
            refill,
            state: Mutex::new(BucketState {
                tokens: capacity,
                updated: Instant::now(),
            }),
        }
    }
}

#[async_trait]
impl RateLimiter for TokenBucket {
    async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();

                if self.refill.is_zero() {
                    state.tokens = self.capacity;
                } else {
                    let gained = now.duration_since(state.updated).as_secs_f64()
                        / self.refill.as_secs_f64();
                    state.tokens = (state.tokens + gained).min(self.capacity);
                }
                state.updated = now;

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                self.refill.mul_f64(1.0 - state.tokens)
            };
            sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_spaces_permits() {
        let limiter = FixedDelay::new(Duration::from_secs(2));
        let start = Instant::now();

        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(2));

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_does_not_wait_after_idle() {
        let limiter = FixedDelay::new(Duration::from_secs(2));
        limiter.acquire().await;

        sleep(Duration::from_secs(5)).await;
        let before = Instant::now();
        limiter.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_bucket_allows_burst() {
        let limiter = TokenBucket::new(2, Duration::from_secs(1));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(1));

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlimited_never_waits() {
        let start = Instant::now();
        for _ in 0..10 {
            Unlimited.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_config_builds_strategy() {
        let config = RateLimitConfig {
            strategy: RateLimitStrategy::None,
            ..RateLimitConfig::default()
        };
        let limiter = config.build();

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
