//! In-memory candidate source backed by a fixed catalog
//!
//! Used by the command-line runner and for offline matching against an
//! exported catalog. Lookup is a plain token-overlap filter; ranking is left
//! to the coordinator.

use crate::candidate::{Candidate, CandidateSource};
use crate::error::{MatchError, SourceError};
use crate::normalize::normalize;
use crate::similarity::tokenize;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    entries: Vec<CatalogEntry>,
    resets: u64,
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    candidate: Candidate,
    tokens: HashSet<String>,
}

impl CatalogSource {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        let entries = candidates
            .into_iter()
            .map(|candidate| {
                let text = format!(
                    "{} {}",
                    normalize(&candidate.title),
                    normalize(&candidate.artist_name)
                );
                let tokens = tokenize(&text).into_iter().map(str::to_string).collect();
                CatalogEntry { candidate, tokens }
            })
            .collect();

        Self { entries, resets: 0 }
    }

    /// Load a JSON array of candidates.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MatchError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let candidates: Vec<Candidate> = serde_json::from_str(&raw)?;
        info!(path = %path.display(), entries = candidates.len(), "Loaded candidate catalog");
        Ok(Self::new(candidates))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resets(&self) -> u64 {
        self.resets
    }
}

#[async_trait]
impl CandidateSource for CatalogSource {
    async fn fetch(&mut self, query: &str, limit: usize) -> Result<Vec<Candidate>, SourceError> {
        let normalized = normalize(query);
        let wanted: HashSet<&str> = tokenize(&normalized).into_iter().collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<Candidate> = self
            .entries
            .iter()
            .filter(|entry| wanted.iter().any(|token| entry.tokens.contains(*token)))
            .take(limit)
            .map(|entry| entry.candidate.clone())
            .collect();

        debug!(query, found = found.len(), "Catalog lookup");
        Ok(found)
    }

    async fn reset(&mut self) -> Result<(), SourceError> {
        // Nothing to tear down
        self.resets += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn catalog() -> CatalogSource {
        CatalogSource::new(vec![
            Candidate {
                title: "Levitating".into(),
                url: "https://music.example/levitating".into(),
                artist_name: "Dua Lipa".into(),
                duration: Some("3:23".into()),
            },
            Candidate {
                title: "Blinding Lights".into(),
                url: "https://music.example/blinding-lights".into(),
                artist_name: "The Weeknd".into(),
                duration: None,
            },
            Candidate {
                title: "Don't Start Now".into(),
                url: "https://music.example/dont-start-now".into(),
                artist_name: "Dua Lipa".into(),
                duration: None,
            },
        ])
    }

    #[tokio::test]
    async fn test_fetch_matches_any_token_in_catalog_order() {
        let mut source = catalog();
        let found = source.fetch("levitating dua lipa", 10).await.unwrap();
        let urls: Vec<&str> = found.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://music.example/levitating",
                "https://music.example/dont-start-now"
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_respects_limit() {
        let mut source = catalog();
        let found = source.fetch("dua lipa", 1).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Levitating");
    }

    #[tokio::test]
    async fn test_fetch_no_overlap() {
        let mut source = catalog();
        assert!(source.fetch("bohemian rhapsody", 5).await.unwrap().is_empty());
        assert!(source.fetch("   ", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_is_counted() {
        let mut source = catalog();
        source.reset().await.unwrap();
        assert_eq!(source.resets(), 1);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "Levitating", "url": "https://music.example/1", "artist_name": "Dua Lipa"}}]"#
        )
        .unwrap();

        let source = CatalogSource::from_json_file(file.path()).unwrap();
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = CatalogSource::from_json_file("/nonexistent/catalog.json").unwrap_err();
        assert!(matches!(err, MatchError::Io(_)));
    }
}
