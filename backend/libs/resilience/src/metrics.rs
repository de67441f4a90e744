//! Prometheus instrumentation for the guards in this crate
//!
//! Every recorder is a plain function so call sites stay one line. Without
//! the `metrics` feature they compile to nothing.

use crate::circuit_breaker::CircuitState;
use std::time::Duration;

#[cfg(feature = "metrics")]
mod collectors {
    use once_cell::sync::Lazy;
    use prometheus::{
        register_histogram, register_histogram_vec, register_int_counter_vec, Histogram,
        HistogramVec, IntCounterVec,
    };

    pub static CIRCUIT_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
        register_int_counter_vec!(
            "resilience_circuit_breaker_state_transitions_total",
            "Circuit breaker state changes",
            &["from", "to"]
        )
        .expect("Failed to register circuit breaker transitions metric")
    });

    pub static CIRCUIT_GATE: Lazy<IntCounterVec> = Lazy::new(|| {
        register_int_counter_vec!(
            "resilience_circuit_breaker_gate_total",
            "Circuit breaker admission checks by state and decision",
            &["state", "decision"]
        )
        .expect("Failed to register circuit breaker gate metric")
    });

    pub static LIMITER_DECISIONS: Lazy<IntCounterVec> = Lazy::new(|| {
        register_int_counter_vec!(
            "resilience_rate_limiter_decisions_total",
            "Token bucket acquire outcomes",
            &["decision"]
        )
        .expect("Failed to register rate limiter decisions metric")
    });

    pub static LIMITER_WAIT: Lazy<Histogram> = Lazy::new(|| {
        register_histogram!(
            "resilience_rate_limiter_wait_seconds",
            "Time spent waiting for a token",
            vec![0.0, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
        )
        .expect("Failed to register rate limiter wait metric")
    });

    pub static TIMEOUTS: Lazy<IntCounterVec> = Lazy::new(|| {
        register_int_counter_vec!(
            "resilience_timeout_operations_total",
            "Time-bounded operations by outcome",
            &["outcome"]
        )
        .expect("Failed to register timeout metric")
    });

    pub static RETRY_ATTEMPTS: Lazy<HistogramVec> = Lazy::new(|| {
        register_histogram_vec!(
            "resilience_retry_attempts",
            "Attempts made before success or giving up",
            &["outcome"],
            vec![1.0, 2.0, 3.0, 5.0, 8.0]
        )
        .expect("Failed to register retry attempts metric")
    });
}

pub(crate) fn circuit_transition(from: CircuitState, to: CircuitState) {
    #[cfg(feature = "metrics")]
    collectors::CIRCUIT_TRANSITIONS
        .with_label_values(&[from.as_str(), to.as_str()])
        .inc();
    #[cfg(not(feature = "metrics"))]
    let _ = (from, to);
}

pub(crate) fn circuit_gate(state: CircuitState, admitted: bool) {
    #[cfg(feature = "metrics")]
    collectors::CIRCUIT_GATE
        .with_label_values(&[state.as_str(), decision(admitted)])
        .inc();
    #[cfg(not(feature = "metrics"))]
    let _ = (state, admitted);
}

pub(crate) fn limiter_decision(admitted: bool) {
    #[cfg(feature = "metrics")]
    collectors::LIMITER_DECISIONS
        .with_label_values(&[decision(admitted)])
        .inc();
    #[cfg(not(feature = "metrics"))]
    let _ = admitted;
}

pub(crate) fn limiter_wait(waited: Duration) {
    #[cfg(feature = "metrics")]
    collectors::LIMITER_WAIT.observe(waited.as_secs_f64());
    #[cfg(not(feature = "metrics"))]
    let _ = waited;
}

/// `outcome` is one of "completed", "failed", "elapsed"
pub(crate) fn timeout_outcome(outcome: &'static str) {
    #[cfg(feature = "metrics")]
    collectors::TIMEOUTS.with_label_values(&[outcome]).inc();
    #[cfg(not(feature = "metrics"))]
    let _ = outcome;
}

/// `outcome` is one of "success", "non_retryable", "exhausted"
pub(crate) fn retry_finished(outcome: &'static str, attempts: u32) {
    #[cfg(feature = "metrics")]
    collectors::RETRY_ATTEMPTS
        .with_label_values(&[outcome])
        .observe(attempts as f64);
    #[cfg(not(feature = "metrics"))]
    let _ = (outcome, attempts);
}

#[cfg(feature = "metrics")]
fn decision(admitted: bool) -> &'static str {
    if admitted {
        "admitted"
    } else {
        "rejected"
    }
}
