//! Track matching against an unreliable music-search source
//!
//! Given a track name and an optional artist string, [`SearchCoordinator`]
//! issues a short sequence of queries to a [`CandidateSource`], scores what
//! comes back, and returns the best candidate. Every call goes through a
//! circuit breaker, a shared rate limiter and a per-query timeout from the
//! `resilience` crate.
//!
//! ```rust,no_run
//! use std::collections::HashSet;
//! use track_matcher::{CatalogSource, MatcherConfig, SearchCoordinator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), track_matcher::MatchError> {
//!     let source = CatalogSource::from_json_file("catalog.json")?;
//!     let coordinator = SearchCoordinator::new(source, MatcherConfig::from_env())?;
//!
//!     let report = coordinator
//!         .find_best_match("Levitating", Some("Dua Lipa"), &HashSet::new())
//!         .await;
//!     println!("{:?}", report.outcome);
//!     Ok(())
//! }
//! ```

pub mod candidate;
pub mod catalog;
pub mod config;
pub mod converter;
pub mod coordinator;
pub mod error;
pub mod normalize;
pub mod query;
pub mod similarity;
pub mod stats;

pub use candidate::{Candidate, CandidateSource};
pub use catalog::CatalogSource;
pub use config::{MatchThresholds, MatcherConfig};
pub use converter::{
    ConversionReport, ConvertedTrack, Playlist, PlaylistConverter, SourceTrack, TrackStatus,
};
pub use coordinator::{MatchOutcome, MatchResult, SearchCoordinator, SearchReport};
pub use error::{MatchError, SourceError};
pub use similarity::ScoringWeights;
pub use stats::{CoordinatorStats, SearchStats};
