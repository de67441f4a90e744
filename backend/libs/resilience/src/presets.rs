/// Preset configurations for common kinds of external lookups
use crate::circuit_breaker::CircuitBreakerConfig;
use crate::rate_limiter::RateLimiterConfig;
use crate::retry::RetryConfig;
use crate::timeout::TimeoutConfig;
use std::time::Duration;

/// Configuration bundle for one protected dependency
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub timeout: TimeoutConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub rate_limiter: RateLimiterConfig,
    /// Retry policy for re-establishing the dependency's session
    pub retry: RetryConfig,
}

/// Browser-driven scraping of a public website
///
/// - Timeout: 15s per page (slow renders, heavy JS)
/// - Circuit breaker: 5 failures, 60s cooldown
/// - Rate limit: 1 call/s, burst 3 (stay under anti-bot thresholds)
/// - Retry: 3 attempts, 2s → 10s backoff (browser relaunch is slow)
pub fn scraper_config() -> ServiceConfig {
    ServiceConfig {
        timeout: TimeoutConfig {
            duration: Duration::from_secs(15),
        },
        circuit_breaker: CircuitBreakerConfig {
            failure_threshold: 5,
            cooling_period: Duration::from_secs(60),
        },
        rate_limiter: RateLimiterConfig {
            rate_per_second: 1.0,
            burst: 3,
        },
        retry: RetryConfig {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scraper_config() {
        let config = scraper_config();
        assert_eq!(config.timeout.duration, Duration::from_secs(15));
        assert_eq!(config.circuit_breaker.failure_threshold, 5);
        assert_eq!(config.rate_limiter.burst, 3);
        assert!(!config.retry.jitter);
    }
}
