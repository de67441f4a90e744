/// Resilience patterns for calls to slow or unreliable external lookups
///
/// This library provides:
/// - **Circuit Breaker**: Fails fast once consecutive failures reach a threshold, then probes for recovery
/// - **Rate Limiter**: Token bucket pacing shared by every clone of the limiter
/// - **Timeout**: Bounds how long we wait on any single external call
/// - **Retry**: Exponential backoff for transient failures, with a retryable-error predicate
/// - **Preset Configurations**: Pre-tuned settings for scrapers and search APIs
///
/// # Example: Guarded lookup
///
/// ```rust,no_run
/// use resilience::{presets, CircuitBreaker, RateLimiter};
///
/// #[tokio::main]
/// async fn main() {
///     let config = presets::scraper_config();
///     let breaker = CircuitBreaker::new(config.circuit_breaker);
///     let limiter = RateLimiter::new(config.rate_limiter);
///
///     if breaker.can_execute() {
///         limiter.wait_for_token(1).await.ok();
///         // Your external call here, then record_success / record_failure
///         breaker.record_success();
///     }
/// }
/// ```
///
/// # Example: Retrying a session restart
///
/// ```rust,no_run
/// use resilience::{presets, retry::with_retry};
///
/// #[tokio::main]
/// async fn main() {
///     let config = presets::scraper_config();
///
///     let result = with_retry(config.retry, || async {
///         // Relaunch the session
///         Ok::<_, String>(())
///     })
///     .await;
/// }
/// ```

pub mod circuit_breaker;
mod metrics;
pub mod presets;
pub mod rate_limiter;
pub mod retry;
pub mod timeout;

// Re-export main types for convenience
pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats, CircuitState,
};
pub use presets::{scraper_config, ServiceConfig};
pub use rate_limiter::{RateLimiter, RateLimiterConfig, RateLimiterError, RateLimiterStats};
pub use retry::{with_retry, with_retry_if, RetryConfig};
pub use timeout::{with_timeout, with_timeout_result, TimeoutConfig, TimeoutError};
