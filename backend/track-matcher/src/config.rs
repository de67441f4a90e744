//! Matcher configuration
//!
//! Every threshold and weight is tunable; the defaults are a reasonable
//! baseline, not a verified optimum. Guard settings default to
//! [`resilience::presets::scraper_config`].

use crate::error::MatchError;
use crate::similarity::ScoringWeights;
use resilience::{presets, CircuitBreakerConfig, RateLimiterConfig, RetryConfig};
use std::str::FromStr;
use std::time::Duration;

/// Score cut-offs used by the search loop
#[derive(Debug, Clone)]
pub struct MatchThresholds {
    /// Return immediately when any candidate scores above this
    pub excellent: f64,
    /// Stop issuing queries when the running best is above this
    pub acceptable: f64,
    /// Run the coarse second pass when the best is not above this
    pub rescue: f64,
    /// Minimum score for a confident match
    pub accept: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.9,
            acceptable: 0.8,
            rescue: 0.6,
            accept: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// How long to wait for a single query before moving on
    pub query_timeout: Duration,
    /// Candidates requested per query
    pub max_candidates: usize,
    /// Issue one `track + artist` query per credited artist, not only the first
    pub artist_variant_queries: bool,
    pub thresholds: MatchThresholds,
    pub weights: ScoringWeights,
    pub circuit_breaker: CircuitBreakerConfig,
    pub rate_limiter: RateLimiterConfig,
    /// Retry policy for resetting the candidate source session
    pub reset_retry: RetryConfig,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        let preset = presets::scraper_config();
        Self {
            query_timeout: preset.timeout.duration,
            max_candidates: 5,
            artist_variant_queries: false,
            thresholds: MatchThresholds::default(),
            weights: ScoringWeights::default(),
            circuit_breaker: preset.circuit_breaker,
            rate_limiter: preset.rate_limiter,
            reset_retry: preset.retry,
        }
    }
}

impl MatcherConfig {
    /// Build from `MATCHER_*` environment variables, falling back to defaults
    /// for anything unset or unparsable. Call [`validate`](Self::validate)
    /// on the result.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            query_timeout: env_secs("MATCHER_QUERY_TIMEOUT_SECS", defaults.query_timeout),
            max_candidates: env_or("MATCHER_MAX_CANDIDATES", defaults.max_candidates),
            artist_variant_queries: env_or(
                "MATCHER_ARTIST_VARIANT_QUERIES",
                defaults.artist_variant_queries,
            ),
            thresholds: MatchThresholds {
                excellent: env_or("MATCHER_EXCELLENT_SCORE", defaults.thresholds.excellent),
                acceptable: env_or("MATCHER_ACCEPTABLE_SCORE", defaults.thresholds.acceptable),
                rescue: env_or("MATCHER_RESCUE_SCORE", defaults.thresholds.rescue),
                accept: env_or("MATCHER_ACCEPT_SCORE", defaults.thresholds.accept),
            },
            weights: ScoringWeights {
                title: env_or("MATCHER_TITLE_WEIGHT", defaults.weights.title),
                artist: env_or("MATCHER_ARTIST_WEIGHT", defaults.weights.artist),
                ..defaults.weights
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: env_or(
                    "MATCHER_CB_FAILURE_THRESHOLD",
                    defaults.circuit_breaker.failure_threshold,
                ),
                cooling_period: Duration::from_secs(env_or(
                    "MATCHER_CB_COOLING_SECS",
                    defaults.circuit_breaker.cooling_period.as_secs(),
                )),
            },
            rate_limiter: RateLimiterConfig {
                rate_per_second: env_or(
                    "MATCHER_RATE_PER_SECOND",
                    defaults.rate_limiter.rate_per_second,
                ),
                burst: env_or("MATCHER_RATE_BURST", defaults.rate_limiter.burst),
            },
            reset_retry: RetryConfig {
                max_attempts: env_or(
                    "MATCHER_RESET_MAX_ATTEMPTS",
                    defaults.reset_retry.max_attempts,
                ),
                ..defaults.reset_retry
            },
        }
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.query_timeout.is_zero() {
            return Err(MatchError::Config("query_timeout must be > 0".into()));
        }
        if self.max_candidates == 0 {
            return Err(MatchError::Config("max_candidates must be > 0".into()));
        }
        if self.circuit_breaker.failure_threshold == 0 {
            return Err(MatchError::Config("failure_threshold must be > 0".into()));
        }
        if self.rate_limiter.burst == 0 || self.rate_limiter.rate_per_second <= 0.0 {
            return Err(MatchError::Config(
                "rate limiter needs a positive rate and burst".into(),
            ));
        }

        let t = &self.thresholds;
        let w = &self.weights;
        let unit = [
            ("excellent", t.excellent),
            ("acceptable", t.acceptable),
            ("rescue", t.rescue),
            ("accept", t.accept),
            ("title weight", w.title),
            ("artist weight", w.artist),
            ("containment boost", w.containment_boost),
            ("overlap boost", w.overlap_boost),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(MatchError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Fractional seconds; negative or non-finite values keep the default.
fn env_secs(key: &str, default: Duration) -> Duration {
    let secs: f64 = env_or(key, default.as_secs_f64());
    if secs.is_finite() && secs >= 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        default
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
