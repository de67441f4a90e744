/// Timeout wrappers for async operations
///
/// When the deadline passes the wrapped future is dropped. Whether the work
/// behind it actually stops is up to that future; we only stop waiting.
use crate::metrics;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    pub duration: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimeoutError<E> {
    #[error("Operation timed out after {0:?}")]
    Elapsed(Duration),
    #[error("Operation failed: {0}")]
    Failed(E),
}

impl<E> TimeoutError<E> {
    pub fn is_elapsed(&self) -> bool {
        matches!(self, TimeoutError::Elapsed(_))
    }
}

/// Execute a future with timeout
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T, TimeoutError<std::convert::Infallible>>
where
    F: Future<Output = T>,
{
    match timeout(duration, future).await {
        Ok(value) => {
            metrics::timeout_outcome("completed");
            Ok(value)
        }
        Err(_) => {
            metrics::timeout_outcome("elapsed");
            Err(TimeoutError::Elapsed(duration))
        }
    }
}

/// Execute a fallible future with timeout, keeping the operation's own error type
pub async fn with_timeout_result<F, T, E>(duration: Duration, future: F) -> Result<T, TimeoutError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    match timeout(duration, future).await {
        Ok(Ok(result)) => {
            metrics::timeout_outcome("completed");
            Ok(result)
        }
        Ok(Err(e)) => {
            metrics::timeout_outcome("failed");
            Err(TimeoutError::Failed(e))
        }
        Err(_) => {
            metrics::timeout_outcome("elapsed");
            Err(TimeoutError::Elapsed(duration))
        }
    }
}
