//! Best-match search over an unreliable, rate-limited candidate source
//!
//! One search runs as follows:
//!
//! ```text
//! circuit breaker gate ──closed──▶ rate limiter token ──▶ for each query string:
//!        │                                                 fetch (per-query timeout)
//!        └─open──▶ Rejected                                drop blacklisted / seen urls
//!                                                          score, keep running best
//!                                                          > excellent: return now
//!                                                          > acceptable: stop querying
//! best ≤ rescue ──▶ coarse second pass over everything collected
//! best > accept ──▶ match │ anything collected ──▶ low-confidence fallback │ NotFound
//! ```
//!
//! A failed or timed-out query never fails the search; it is recorded against
//! the circuit breaker, flags the session for reset, and the next query runs.

use crate::candidate::{Candidate, CandidateSource};
use crate::config::MatcherConfig;
use crate::error::{MatchError, SourceError};
use crate::query::Query;
use crate::similarity::{combined_similarity, rescue_similarity};
use crate::stats::{CoordinatorStats, SearchStatsCollector};
use resilience::{with_retry_if, with_timeout_result, CircuitBreaker, RateLimiter, TimeoutError};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub candidate: Candidate,
    /// Similarity in `[0, 1]`
    pub score: f64,
    /// Nothing cleared the accept threshold; this is the first candidate seen
    pub low_confidence: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched(MatchResult),
    NotFound,
    /// The circuit breaker is open; the source was not contacted
    Rejected,
}

impl MatchOutcome {
    pub fn as_match(&self) -> Option<&MatchResult> {
        match self {
            MatchOutcome::Matched(result) => Some(result),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub search_id: Uuid,
    pub outcome: MatchOutcome,
    /// The source misbehaved during this search; reset it before the next one
    pub needs_reset: bool,
    pub queries_issued: usize,
    pub candidates_seen: usize,
    pub elapsed_ms: u64,
}

struct Scored {
    candidate: Candidate,
    score: f64,
}

#[derive(Default)]
struct SearchProgress {
    /// Every usable candidate in first-seen order
    collected: Vec<Scored>,
    seen_urls: HashSet<String>,
    /// Index into `collected` and the score it won with
    best: Option<(usize, f64)>,
    needs_reset: bool,
    queries_issued: usize,
}

impl SearchProgress {
    fn best_score(&self) -> f64 {
        self.best.map(|(_, score)| score).unwrap_or(0.0)
    }

    fn offer(&mut self, candidate: Candidate, score: f64) {
        self.seen_urls.insert(candidate.url.clone());
        self.collected.push(Scored { candidate, score });
        if score > self.best_score() {
            self.best = Some((self.collected.len() - 1, score));
        }
    }

    fn into_report(self, search_id: Uuid, outcome: MatchOutcome, started: Instant) -> SearchReport {
        SearchReport {
            search_id,
            outcome,
            needs_reset: self.needs_reset,
            queries_issued: self.queries_issued,
            candidates_seen: self.collected.len(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Orchestrates searches against one candidate source.
///
/// The source sits behind a mutex, so concurrent searches through the same
/// coordinator take turns on it. The breaker and limiter may be shared with
/// other coordinators via [`with_guards`](Self::with_guards).
pub struct SearchCoordinator<S> {
    config: MatcherConfig,
    circuit_breaker: CircuitBreaker,
    rate_limiter: RateLimiter,
    source: Arc<Mutex<S>>,
    stats: SearchStatsCollector,
}

impl<S: CandidateSource> SearchCoordinator<S> {
    pub fn new(source: S, config: MatcherConfig) -> Result<Self, MatchError> {
        let circuit_breaker = CircuitBreaker::new(config.circuit_breaker.clone());
        let rate_limiter = RateLimiter::new(config.rate_limiter.clone());
        Self::with_guards(source, config, circuit_breaker, rate_limiter)
    }

    /// Build a coordinator whose breaker and limiter are shared with others
    /// in the same throttling domain.
    pub fn with_guards(
        source: S,
        config: MatcherConfig,
        circuit_breaker: CircuitBreaker,
        rate_limiter: RateLimiter,
    ) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self {
            config,
            circuit_breaker,
            rate_limiter,
            source: Arc::new(Mutex::new(source)),
            stats: SearchStatsCollector::new(),
        })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn stats(&self) -> CoordinatorStats {
        CoordinatorStats {
            circuit_breaker: self.circuit_breaker.stats(),
            rate_limiter: self.rate_limiter.stats(),
            search: self.stats.snapshot(),
        }
    }

    /// Find the best candidate for a track, never returning a blacklisted url.
    pub async fn find_best_match(
        &self,
        track_name: &str,
        artist_name: Option<&str>,
        blacklisted_urls: &HashSet<String>,
    ) -> SearchReport {
        let search_id = Uuid::new_v4();
        let span = info_span!(
            "find_best_match",
            %search_id,
            track = track_name,
            artist = artist_name.unwrap_or_default()
        );

        self.search(search_id, track_name, artist_name, blacklisted_urls)
            .instrument(span)
            .await
    }

    /// Tear down and re-establish the source session, retrying transient
    /// failures. The source lock is released between attempts.
    pub async fn reset_source(&self) -> Result<(), MatchError> {
        info!("Resetting candidate source session");
        let source = Arc::clone(&self.source);

        with_retry_if(self.config.reset_retry.clone(), SourceError::is_transient, || {
            let source = Arc::clone(&source);
            async move {
                let mut guard = source.lock().await;
                guard.reset().await
            }
        })
        .await?;

        info!("Candidate source session reset");
        Ok(())
    }

    async fn search(
        &self,
        search_id: Uuid,
        track_name: &str,
        artist_name: Option<&str>,
        blacklisted_urls: &HashSet<String>,
    ) -> SearchReport {
        let started = Instant::now();
        self.stats.record_search();

        let query = Query::new(track_name, artist_name);
        let queries = query.search_strings(self.config.artist_variant_queries);

        if !self.circuit_breaker.can_execute() {
            warn!(state = ?self.circuit_breaker.state(), "Circuit breaker open, rejecting search");
            self.stats.record_circuit_rejected();
            return SearchProgress::default().into_report(search_id, MatchOutcome::Rejected, started);
        }

        if queries.is_empty() {
            warn!("Track name is blank after normalization, nothing to search for");
            self.circuit_breaker.record_failure();
            self.stats.record_failure();
            return SearchProgress::default().into_report(search_id, MatchOutcome::NotFound, started);
        }

        match self.rate_limiter.wait_for_token(1).await {
            Ok(waited) if !waited.is_zero() => {
                debug!(waited_ms = waited.as_millis() as u64, "Waited for rate limiter");
                self.stats.record_rate_limited();
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Rate limiter refused token request, continuing unpaced"),
        }

        let mut progress = SearchProgress::default();
        let excellent = self
            .run_queries(&query, &queries, blacklisted_urls, &mut progress)
            .await;

        if !excellent
            && progress.best_score() <= self.config.thresholds.rescue
            && !progress.collected.is_empty()
        {
            self.rescue_pass(&query, &mut progress);
        }

        let outcome = self.decide(&progress);
        match &outcome {
            MatchOutcome::Matched(result) => {
                self.circuit_breaker.record_success();
                self.stats.record_success(result.low_confidence);
                info!(
                    title = %result.candidate.title,
                    artist = %result.candidate.artist_name,
                    score = result.score,
                    low_confidence = result.low_confidence,
                    queries = progress.queries_issued,
                    candidates = progress.collected.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Search completed with match"
                );
            }
            MatchOutcome::NotFound => {
                self.circuit_breaker.record_failure();
                self.stats.record_failure();
                warn!(
                    queries = progress.queries_issued,
                    candidates = progress.collected.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "No candidates found"
                );
            }
            MatchOutcome::Rejected => {}
        }

        if progress.needs_reset {
            warn!("Candidate source reported failures, session reset requested");
        }

        progress.into_report(search_id, outcome, started)
    }

    /// Issue queries in order until one yields an excellent or acceptable
    /// match. Returns true on an excellent match.
    async fn run_queries(
        &self,
        query: &Query,
        queries: &[String],
        blacklisted_urls: &HashSet<String>,
        progress: &mut SearchProgress,
    ) -> bool {
        let limit = self.config.max_candidates;
        let thresholds = &self.config.thresholds;
        let mut source = self.source.lock().await;

        for query_string in queries {
            progress.queries_issued += 1;
            debug!(query = %query_string, "Issuing query");

            let fetched =
                with_timeout_result(self.config.query_timeout, source.fetch(query_string, limit))
                    .await;

            let batch = match fetched {
                Ok(batch) => batch,
                Err(TimeoutError::Elapsed(after)) => {
                    warn!(
                        query = %query_string,
                        timeout_ms = after.as_millis() as u64,
                        "Query timed out, trying next query"
                    );
                    self.stats.record_timeout();
                    self.circuit_breaker.record_failure();
                    progress.needs_reset = true;
                    continue;
                }
                Err(TimeoutError::Failed(e)) => {
                    warn!(query = %query_string, error = %e, "Query failed");
                    if e == SourceError::Timeout {
                        self.stats.record_timeout();
                    }
                    self.circuit_breaker.record_failure();
                    progress.needs_reset = true;
                    if e.is_transient() {
                        continue;
                    }
                    // Session is dead; the remaining queries would fail too
                    break;
                }
            };

            for candidate in batch.into_iter().take(limit) {
                if blacklisted_urls.contains(&candidate.url) {
                    debug!(url = %candidate.url, "Skipping blacklisted candidate");
                    continue;
                }
                if progress.seen_urls.contains(&candidate.url) {
                    continue;
                }

                let score = combined_similarity(
                    query.normalized_track(),
                    query.artist_variants(),
                    &candidate,
                    &self.config.weights,
                );
                debug!(
                    title = %candidate.title,
                    artist = %candidate.artist_name,
                    score,
                    "Scored candidate"
                );
                progress.offer(candidate, score);

                if score > thresholds.excellent {
                    info!(score, "Excellent match, stopping search");
                    return true;
                }
            }

            if progress.best_score() > thresholds.acceptable {
                debug!(best = progress.best_score(), "Acceptable match, skipping remaining queries");
                break;
            }
        }

        false
    }

    /// Re-score everything collected with token overlap only, to rescue true
    /// matches whose titles carry extra phrasing.
    fn rescue_pass(&self, query: &Query, progress: &mut SearchProgress) {
        let mut best = progress.best;

        for (idx, entry) in progress.collected.iter().enumerate() {
            let rescued = rescue_similarity(
                query.normalized_track(),
                query.artist_variants(),
                &entry.candidate,
                &self.config.weights,
            );
            if rescued > best.map(|(_, score)| score).unwrap_or(0.0) {
                best = Some((idx, rescued));
            }
        }

        if best != progress.best {
            debug!(
                before = progress.best_score(),
                after = best.map(|(_, score)| score).unwrap_or(0.0),
                "Second pass improved best score"
            );
            progress.best = best;
        }
    }

    fn decide(&self, progress: &SearchProgress) -> MatchOutcome {
        if let Some((idx, score)) = progress.best {
            if score > self.config.thresholds.accept {
                return MatchOutcome::Matched(MatchResult {
                    candidate: progress.collected[idx].candidate.clone(),
                    score,
                    low_confidence: false,
                });
            }
        }

        // Some answer beats none; callers must treat this as low confidence
        match progress.collected.first() {
            Some(first) => MatchOutcome::Matched(MatchResult {
                candidate: first.candidate.clone(),
                score: first.score,
                low_confidence: true,
            }),
            None => MatchOutcome::NotFound,
        }
    }
}
