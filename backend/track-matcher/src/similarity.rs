//! Weighted text similarity between a query and a candidate
//!
//! Scores are always in `[0.0, 1.0]`:
//! - exact (case-insensitive) equality scores 1.0
//! - containment scores `0.7 + 0.3 × len(shorter)/len(longer)`
//! - otherwise `0.6 × token Jaccard + 0.4 × LCS sequence ratio`
//!
//! Token overlap tolerates word reordering, the sequence ratio tolerates
//! small spelling differences, and the containment rule rewards suffixed
//! variants like "(remix)".

use crate::candidate::Candidate;
use crate::normalize::normalize;
use std::collections::HashSet;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Weights applied when combining title and artist scores
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub title: f64,
    pub artist: f64,
    /// Added to the combined score for each field (title, artist) that
    /// contains the query text verbatim
    pub containment_boost: f64,
    /// Maximum boost from raw word overlap in the second pass
    pub overlap_boost: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title: 0.7,
            artist: 0.3,
            containment_boost: 0.1,
            overlap_boost: 0.2,
        }
    }
}

/// Similarity of two strings in `[0.0, 1.0]`. Empty input scores 0.0.
pub fn score(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    let (shorter, longer, short_len, long_len) = if a_len <= b_len {
        (&a, &b, a_len, b_len)
    } else {
        (&b, &a, b_len, a_len)
    };
    if longer.contains(shorter.as_str()) {
        return 0.7 + 0.3 * (short_len as f64 / long_len as f64);
    }

    (0.6 * token_similarity(&a, &b) + 0.4 * sequence_ratio(&a, &b)).clamp(0.0, 1.0)
}

/// Jaccard index over stop-word-filtered word tokens.
///
/// When filtering would leave both sides empty (titles like "The The"), the
/// unfiltered tokens are compared instead.
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let mut a_tokens = content_tokens(&a_lower);
    let mut b_tokens = content_tokens(&b_lower);

    if a_tokens.is_empty() && b_tokens.is_empty() {
        a_tokens = tokenize(&a_lower).into_iter().collect();
        b_tokens = tokenize(&b_lower).into_iter().collect();
    }

    let union = a_tokens.union(&b_tokens).count();
    if union == 0 {
        return 0.0;
    }
    a_tokens.intersection(&b_tokens).count() as f64 / union as f64
}

/// `2 × LCS / (len(a) + len(b))` over characters.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }

    // Two-row dynamic programming table
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    2.0 * prev[b.len()] as f64 / total as f64
}

/// Split into alphanumeric word tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

fn content_tokens(text: &str) -> HashSet<&str> {
    tokenize(text)
        .into_iter()
        .filter(|t| !STOP_WORDS.contains(t))
        .collect()
}

/// Score a candidate against a normalized track name and artist variants.
///
/// An empty artist list means the caller gave no artist; the artist part then
/// counts as a full match instead of penalizing every candidate.
pub fn combined_similarity(
    track: &str,
    artists: &[String],
    candidate: &Candidate,
    weights: &ScoringWeights,
) -> f64 {
    let title = normalize(&candidate.title);
    let artist_name = normalize(&candidate.artist_name);

    let title_score = score(track, &title);
    let artist_score = if artists.is_empty() {
        1.0
    } else {
        artists
            .iter()
            .map(|variant| score(variant, &artist_name))
            .fold(0.0, f64::max)
    };

    let mut combined = title_score * weights.title + artist_score * weights.artist;
    if contains(&title, track) {
        combined += weights.containment_boost;
    }
    if artists.iter().any(|variant| contains(&artist_name, variant)) {
        combined += weights.containment_boost;
    }

    combined.clamp(0.0, 1.0)
}

/// Coarse second-pass score: token overlap only, plus a boost for the share
/// of raw query words found anywhere in the candidate.
pub fn rescue_similarity(
    track: &str,
    artists: &[String],
    candidate: &Candidate,
    weights: &ScoringWeights,
) -> f64 {
    let title = normalize(&candidate.title);
    let artist_name = normalize(&candidate.artist_name);

    let title_score = token_similarity(track, &title);
    let artist_score = if artists.is_empty() {
        1.0
    } else {
        artists
            .iter()
            .map(|variant| token_similarity(variant, &artist_name))
            .fold(0.0, f64::max)
    };

    let query_words: HashSet<&str> = tokenize(track).into_iter().collect();
    let overlap = if query_words.is_empty() {
        0.0
    } else {
        let haystack: HashSet<&str> = tokenize(&title)
            .into_iter()
            .chain(tokenize(&artist_name))
            .collect();
        query_words.intersection(&haystack).count() as f64 / query_words.len() as f64
    };

    (title_score * weights.title + artist_score * weights.artist + overlap * weights.overlap_boost)
        .clamp(0.0, 1.0)
}

fn contains(field: &str, query: &str) -> bool {
    !query.is_empty() && field.contains(query)
}
