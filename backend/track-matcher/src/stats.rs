//! Search statistics owned by one coordinator

use resilience::{CircuitBreakerStats, RateLimiterStats};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for `find_best_match` calls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub total_searches: u64,
    /// Searches that returned a match, low-confidence fallbacks included
    pub successful: u64,
    /// Subset of `successful` that were low-confidence fallbacks
    pub low_confidence: u64,
    pub failed: u64,
    /// Individual queries abandoned after the per-query timeout
    pub timed_out: u64,
    pub circuit_rejected: u64,
    /// Searches that had to wait for a rate limiter token
    pub rate_limited: u64,
}

/// Everything a dashboard needs about one coordinator
#[derive(Debug, Clone, Serialize)]
pub struct CoordinatorStats {
    pub circuit_breaker: CircuitBreakerStats,
    pub rate_limiter: RateLimiterStats,
    pub search: SearchStats,
}

/// Thread-safe statistics collector
#[derive(Clone, Default)]
pub struct SearchStatsCollector {
    total_searches: Arc<AtomicU64>,
    successful: Arc<AtomicU64>,
    low_confidence: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
    timed_out: Arc<AtomicU64>,
    circuit_rejected: Arc<AtomicU64>,
    rate_limited: Arc<AtomicU64>,
}

impl SearchStatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self, low_confidence: bool) {
        self.successful.fetch_add(1, Ordering::Relaxed);
        if low_confidence {
            self.low_confidence.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_circuit_rejected(&self) {
        self.circuit_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self) -> SearchStats {
        SearchStats {
            total_searches: self.total_searches.load(Ordering::Relaxed),
            successful: self.successful.load(Ordering::Relaxed),
            low_confidence: self.low_confidence.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            circuit_rejected: self.circuit_rejected.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_starts_empty() {
        assert_eq!(SearchStatsCollector::new().snapshot(), SearchStats::default());
    }

    #[test]
    fn test_collector_counts() {
        let collector = SearchStatsCollector::new();
        collector.record_search();
        collector.record_search();
        collector.record_success(false);
        collector.record_success(true);
        collector.record_timeout();
        collector.record_rate_limited();

        let stats = collector.snapshot();
        assert_eq!(stats.total_searches, 2);
        assert_eq!(stats.successful, 2);
        assert_eq!(stats.low_confidence, 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.timed_out, 1);
        assert_eq!(stats.rate_limited, 1);
    }

    #[test]
    fn test_collector_clone_shares_counters() {
        let collector = SearchStatsCollector::new();
        let other = collector.clone();
        other.record_circuit_rejected();
        other.record_failure();

        let stats = collector.snapshot();
        assert_eq!(stats.circuit_rejected, 1);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn test_stats_serialization() {
        let stats = SearchStats {
            total_searches: 10,
            successful: 7,
            low_confidence: 2,
            failed: 2,
            timed_out: 3,
            circuit_rejected: 1,
            rate_limited: 4,
        };

        let json = serde_json::to_string(&stats).unwrap();
        let deserialized: SearchStats = serde_json::from_str(&json).unwrap();
        assert_eq!(stats, deserialized);
    }
}
