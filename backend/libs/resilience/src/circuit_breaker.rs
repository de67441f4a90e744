/// Circuit Breaker guarding a single external dependency
///
/// State transitions:
/// - Closed → Open: when consecutive failures reach the threshold
/// - Open → HalfOpen: on the first gate check after the cooling period
/// - HalfOpen: a probe left unresolved for a full cooling period is
///   abandoned and the next gate check claims a fresh one
/// - HalfOpen → Closed: when the probe succeeds
/// - HalfOpen → Open: when the probe fails
use crate::metrics;
use parking_lot::Mutex;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CircuitState {
    /// Normal operation, requests pass through
    Closed,
    /// Circuit is open, requests fail fast
    Open,
    /// Testing if the dependency recovered, a single probe is allowed
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failure count to trigger circuit open
    pub failure_threshold: u32,
    /// Time the circuit stays open before a probe is admitted
    pub cooling_period: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooling_period: Duration::from_secs(60),
        }
    }
}

/// Point-in-time view of a breaker, for dashboards
#[derive(Debug, Clone, Serialize)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub total_calls: u64,
    pub rejected_calls: u64,
    pub opened_count: u64,
}

/// Cloning shares the underlying state, so clones belong to one throttling domain.
#[derive(Clone)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Arc<Mutex<CircuitBreakerState>>,
}

struct CircuitBreakerState {
    current: CircuitState,
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
    /// When the outstanding HalfOpen probe was admitted
    probe_claimed_at: Option<Instant>,
    total_calls: u64,
    rejected_calls: u64,
    opened_count: u64,
}

impl CircuitBreakerState {
    /// Entering HalfOpen claims the probe; leaving it releases the probe.
    fn transition(&mut self, to: CircuitState) {
        metrics::circuit_transition(self.current, to);
        self.probe_claimed_at = (to == CircuitState::HalfOpen).then(Instant::now);
        if to == CircuitState::Open {
            self.opened_count += 1;
        }
        self.current = to;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError {
    #[error("Circuit breaker is open - failing fast")]
    Open,
    #[error("Call failed: {0}")]
    CallFailed(String),
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(CircuitBreakerState {
                current: CircuitState::Closed,
                consecutive_failures: 0,
                last_failure_at: None,
                probe_claimed_at: None,
                total_calls: 0,
                rejected_calls: 0,
                opened_count: 0,
            })),
            config,
        }
    }

    /// Execute a future with circuit breaker protection
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, CircuitBreakerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        if !self.can_execute() {
            return Err(CircuitBreakerError::Open);
        }

        match f().await {
            Ok(result) => {
                self.record_success();
                Ok(result)
            }
            Err(e) => {
                self.record_failure();
                Err(CircuitBreakerError::CallFailed(e.to_string()))
            }
        }
    }

    /// Gate check performed before touching the protected dependency.
    ///
    /// The whole check-and-transition happens under one lock, so concurrent
    /// callers racing past the cooling period see exactly one probe admitted.
    pub fn can_execute(&self) -> bool {
        let mut state = self.state.lock();
        state.total_calls += 1;

        let allowed = match state.current {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let cooled = state
                    .last_failure_at
                    .map(|at| at.elapsed() >= self.config.cooling_period)
                    .unwrap_or(true);

                if cooled {
                    info!("Circuit breaker: Open → HalfOpen");
                    state.transition(CircuitState::HalfOpen);
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                // A caller dropped mid-probe never resolves it
                let abandoned = state
                    .probe_claimed_at
                    .map(|at| at.elapsed() >= self.config.cooling_period)
                    .unwrap_or(true);

                if abandoned {
                    if state.probe_claimed_at.is_some() {
                        warn!("Circuit breaker: HalfOpen probe never resolved, admitting a new one");
                    }
                    state.probe_claimed_at = Some(Instant::now());
                    true
                } else {
                    false
                }
            }
        };

        if !allowed {
            state.rejected_calls += 1;
            debug!(
                state = state.current.as_str(),
                rejected = state.rejected_calls,
                "Circuit breaker rejected call"
            );
        }
        metrics::circuit_gate(state.current, allowed);

        allowed
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();

        state.consecutive_failures = 0;
        if state.current == CircuitState::HalfOpen {
            info!("Circuit breaker: HalfOpen → Closed");
            state.transition(CircuitState::Closed);
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock();

        state.consecutive_failures += 1;
        state.last_failure_at = Some(Instant::now());

        match state.current {
            CircuitState::Closed => {
                if state.consecutive_failures >= self.config.failure_threshold {
                    warn!(
                        "Circuit breaker: Closed → Open (consecutive failures: {})",
                        state.consecutive_failures
                    );
                    state.transition(CircuitState::Open);
                }
            }
            CircuitState::HalfOpen => {
                warn!("Circuit breaker: HalfOpen → Open (probe failed)");
                state.transition(CircuitState::Open);
            }
            CircuitState::Open => {
                // Already open; the refreshed failure time extends the cooling period
            }
        }
    }

    /// Get current circuit state (for monitoring)
    pub fn state(&self) -> CircuitState {
        self.state.lock().current
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state.lock().consecutive_failures
    }

    pub fn stats(&self) -> CircuitBreakerStats {
        let state = self.state.lock();
        CircuitBreakerStats {
            state: state.current,
            consecutive_failures: state.consecutive_failures,
            total_calls: state.total_calls,
            rejected_calls: state.rejected_calls,
            opened_count: state.opened_count,
        }
    }
}
