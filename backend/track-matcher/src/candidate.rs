//! Candidate records and the lookup that produces them

use crate::error::SourceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One search result from the destination platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub artist_name: String,
    /// Display duration as shown by the platform, e.g. "3:24"
    #[serde(default)]
    pub duration: Option<String>,
}

/// Where candidates come from: a browser session, a scraper, an API client.
///
/// Implementations are stateful and not safe for concurrent use, hence
/// `&mut self`. The coordinator serializes access to a single instance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateSource: Send {
    /// Return up to `limit` candidates for a free-text query.
    async fn fetch(&mut self, query: &str, limit: usize) -> Result<Vec<Candidate>, SourceError>;

    /// Tear down and re-establish the underlying session.
    async fn reset(&mut self) -> Result<(), SourceError>;
}
