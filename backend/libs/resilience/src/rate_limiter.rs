/// Token bucket rate limiter for outbound calls
///
/// The bucket starts full. Tokens refill continuously at `rate_per_second`
/// up to `burst`. Refill and consume happen under one lock so every clone
/// of the limiter observes a single consistent bucket.
use crate::metrics;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Shortest pause between attempts while waiting for tokens
const MIN_WAIT: Duration = Duration::from_millis(100);
/// Longest pause between attempts while waiting for tokens
const MAX_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Tokens added per second
    pub rate_per_second: f64,
    /// Bucket capacity (how many calls can be made at once)
    pub burst: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            rate_per_second: 1.0,
            burst: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RateLimiterStats {
    pub allowed: u64,
    pub limited: u64,
    pub total: u64,
    pub current_tokens: f64,
    pub rate: f64,
    pub burst: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimiterError {
    #[error("Requested {requested} tokens but bucket capacity is {burst}")]
    ExceedsBurst { requested: u32, burst: u32 },
}

#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    bucket: Arc<Mutex<Bucket>>,
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
    allowed: u64,
    limited: u64,
}

impl Bucket {
    fn refill(&mut self, rate: f64, capacity: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(capacity);
        self.last_refill = now;
    }
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: config.burst as f64,
                last_refill: Instant::now(),
                allowed: 0,
                limited: 0,
            })),
            config,
        }
    }

    /// Take `n` tokens if available. Never blocks.
    pub fn acquire(&self, n: u32) -> bool {
        self.try_acquire(n).is_ok()
    }

    /// Refill then consume; on shortage returns the missing token count.
    fn try_acquire(&self, n: u32) -> Result<(), f64> {
        let mut bucket = self.bucket.lock();
        bucket.refill(self.config.rate_per_second, self.config.burst as f64);

        let wanted = n as f64;
        if bucket.tokens >= wanted {
            bucket.tokens -= wanted;
            bucket.allowed += 1;
            metrics::limiter_decision(true);
            Ok(())
        } else {
            bucket.limited += 1;
            metrics::limiter_decision(false);
            Err(wanted - bucket.tokens)
        }
    }

    /// Suspend until `n` tokens are available, returning how long we waited.
    ///
    /// There is no upper bound on the wait; callers that need one wrap this
    /// in their own timeout.
    pub async fn wait_for_token(&self, n: u32) -> Result<Duration, RateLimiterError> {
        if n > self.config.burst {
            return Err(RateLimiterError::ExceedsBurst {
                requested: n,
                burst: self.config.burst,
            });
        }

        let mut waited = Duration::ZERO;
        loop {
            match self.try_acquire(n) {
                Ok(()) => {
                    metrics::limiter_wait(waited);
                    return Ok(waited);
                }
                Err(deficit) => {
                    let delay = pause_for(deficit, self.config.rate_per_second);
                    debug!(deficit, delay_ms = delay.as_millis() as u64, "Rate limited, waiting for tokens");
                    tokio::time::sleep(delay).await;
                    waited += delay;
                }
            }
        }
    }

    pub fn stats(&self) -> RateLimiterStats {
        let mut bucket = self.bucket.lock();
        bucket.refill(self.config.rate_per_second, self.config.burst as f64);
        RateLimiterStats {
            allowed: bucket.allowed,
            limited: bucket.limited,
            total: bucket.allowed + bucket.limited,
            current_tokens: bucket.tokens,
            rate: self.config.rate_per_second,
            burst: self.config.burst,
        }
    }
}

fn pause_for(deficit: f64, rate: f64) -> Duration {
    let secs = deficit / rate;
    if !secs.is_finite() {
        return MAX_WAIT;
    }
    Duration::from_secs_f64(secs.clamp(MIN_WAIT.as_secs_f64(), MAX_WAIT.as_secs_f64()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_config_default() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.rate_per_second, 1.0);
        assert_eq!(config.burst, 3);
    }

    #[test]
    fn test_burst_then_limited() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            rate_per_second: 0.01,
            burst: 4,
        });

        let granted = (0..10).filter(|_| limiter.acquire(1)).count();
        assert_eq!(granted, 4);

        let stats = limiter.stats();
        assert_eq!(stats.allowed, 4);
        assert_eq!(stats.limited, 6);
        assert_eq!(stats.total, 10);
        assert!(stats.current_tokens >= 0.0);
        assert!(stats.current_tokens < 1.0);
    }

    #[test]
    fn test_tokens_never_exceed_burst() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            rate_per_second: 1_000.0,
            burst: 2,
        });
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.stats().current_tokens <= 2.0);
    }

    #[test]
    fn test_pause_is_clamped() {
        assert_eq!(pause_for(0.001, 100.0), MIN_WAIT);
        assert_eq!(pause_for(100.0, 1.0), MAX_WAIT);
        assert_eq!(pause_for(1.0, 0.0), MAX_WAIT);
        assert_eq!(pause_for(1.0, 2.0), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_wait_for_token_waits_for_refill() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            rate_per_second: 10.0,
            burst: 1,
        });

        let first = limiter.wait_for_token(1).await.unwrap();
        assert_eq!(first, Duration::ZERO);

        let start = Instant::now();
        let second = limiter.wait_for_token(1).await.unwrap();
        assert!(second >= MIN_WAIT);
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[tokio::test]
    async fn test_wait_for_more_than_burst_is_an_error() {
        let limiter = RateLimiter::new(RateLimiterConfig::default());
        let result = limiter.wait_for_token(10).await;
        assert!(matches!(
            result,
            Err(RateLimiterError::ExceedsBurst { requested: 10, burst: 3 })
        ));
    }
}
