//! Error types for track matching

use thiserror::Error;

/// Failures reported by a [`CandidateSource`](crate::candidate::CandidateSource)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The lookup did not answer in time
    #[error("Lookup timed out")]
    Timeout,

    /// The lookup failed but may succeed if asked again
    #[error("Transient lookup failure: {0}")]
    Transient(String),

    /// The session behind the lookup is unusable until reset
    #[error("Fatal lookup failure: {0}")]
    Fatal(String),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, SourceError::Fatal(_))
    }
}

/// Track matching errors
#[derive(Error, Debug)]
pub enum MatchError {
    /// Invalid matcher configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller input that cannot be processed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Candidate source failed outside a search (e.g. during reset)
    #[error("Candidate source error: {0}")]
    Source(#[from] SourceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MatchError::Config("max_candidates must be > 0".to_string());
        assert_eq!(err.to_string(), "Configuration error: max_candidates must be > 0");

        let err: MatchError = SourceError::Transient("503".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Candidate source error: Transient lookup failure: 503"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(SourceError::Timeout.is_transient());
        assert!(SourceError::Transient("reset by peer".into()).is_transient());
        assert!(!SourceError::Fatal("browser crashed".into()).is_transient());
    }

    #[test]
    fn test_error_from_serde() {
        let json_err = serde_json::from_str::<String>("invalid json");
        let err: MatchError = json_err.unwrap_err().into();
        assert!(matches!(err, MatchError::Serialization(_)));
    }
}
