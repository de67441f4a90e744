//! Per-call search query: normalized track name, artist variants, and the
//! ordered list of strings sent to the candidate source.

use crate::normalize::{normalize, strip_punctuation};

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    raw_track: String,
    raw_artist: Option<String>,
    normalized_track: String,
    /// Number of leading variants that came from splitting the artist string
    split_count: usize,
    artist_variants: Vec<String>,
}

impl Query {
    pub fn new(track_name: &str, artist_name: Option<&str>) -> Self {
        let raw_artist = artist_name
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        let (split_count, artist_variants) = match &raw_artist {
            Some(artist) => artist_variants(artist),
            None => (0, Vec::new()),
        };

        Self {
            raw_track: track_name.trim().to_string(),
            normalized_track: normalize(track_name),
            raw_artist,
            split_count,
            artist_variants,
        }
    }

    pub fn raw_track(&self) -> &str {
        &self.raw_track
    }

    pub fn raw_artist(&self) -> Option<&str> {
        self.raw_artist.as_deref()
    }

    pub fn normalized_track(&self) -> &str {
        &self.normalized_track
    }

    /// Ordered, de-duplicated artist variants; empty when no artist was given
    pub fn artist_variants(&self) -> &[String] {
        &self.artist_variants
    }

    pub fn primary_artist(&self) -> Option<&str> {
        self.artist_variants.first().map(String::as_str)
    }

    /// Query strings to try, most reliable first.
    ///
    /// Always `track + primary artist` then `track` alone. With
    /// `per_artist_variant`, every other individually credited artist gets
    /// its own `track + artist` query in between.
    pub fn search_strings(&self, per_artist_variant: bool) -> Vec<String> {
        let mut queries = Vec::new();
        if self.normalized_track.is_empty() {
            return queries;
        }

        let credited = if per_artist_variant {
            &self.artist_variants[..self.split_count]
        } else {
            &self.artist_variants[..self.split_count.min(1)]
        };
        for artist in credited {
            push_unique(&mut queries, format!("{} {}", self.normalized_track, artist));
        }
        push_unique(&mut queries, self.normalized_track.clone());

        queries
    }
}

/// Split "A, B & C / D" into individual artists, then add the whole string
/// and punctuation-stripped forms. Returns how many leading entries are
/// individual artists.
fn artist_variants(artist: &str) -> (usize, Vec<String>) {
    let mut variants = Vec::new();

    for part in artist.split([',', '&', '/']) {
        push_unique(&mut variants, normalize(part));
    }
    let split_count = variants.len();

    let whole = normalize(artist);
    let stripped: Vec<String> = variants
        .iter()
        .chain(std::iter::once(&whole))
        .map(|v| strip_punctuation(v))
        .collect();

    push_unique(&mut variants, whole);
    for form in stripped {
        push_unique(&mut variants, form);
    }

    (split_count, variants)
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_artist() {
        let query = Query::new("Levitating", Some("Dua Lipa"));
        assert_eq!(query.normalized_track(), "levitating");
        assert_eq!(query.artist_variants(), &["dua lipa".to_string()]);
        assert_eq!(
            query.search_strings(false),
            vec!["levitating dua lipa".to_string(), "levitating".to_string()]
        );
    }

    #[test]
    fn test_no_artist() {
        let query = Query::new("Levitating", None);
        assert!(query.artist_variants().is_empty());
        assert_eq!(query.primary_artist(), None);
        assert_eq!(query.search_strings(true), vec!["levitating".to_string()]);

        let blank = Query::new("Levitating", Some("   "));
        assert_eq!(blank.raw_artist(), None);
    }

    #[test]
    fn test_artist_split_and_variants() {
        let query = Query::new("Levitating", Some("Dua Lipa, DaBaby & AC/DC"));
        assert_eq!(
            query.artist_variants(),
            &[
                "dua lipa".to_string(),
                "dababy".to_string(),
                "ac".to_string(),
                "dc".to_string(),
                "dua lipa, dababy & ac/dc".to_string(),
                "dua lipa dababy ac dc".to_string(),
            ]
        );
        assert_eq!(query.primary_artist(), Some("dua lipa"));
    }

    #[test]
    fn test_punctuation_stripped_variant() {
        let query = Query::new("Thunderstruck", Some("Guns N' Roses"));
        assert_eq!(
            query.artist_variants(),
            &["guns n' roses".to_string(), "guns n roses".to_string()]
        );
    }

    #[test]
    fn test_per_artist_variant_queries() {
        let query = Query::new("Levitating", Some("Dua Lipa, DaBaby"));
        assert_eq!(
            query.search_strings(true),
            vec![
                "levitating dua lipa".to_string(),
                "levitating dababy".to_string(),
                "levitating".to_string(),
            ]
        );
        assert_eq!(query.search_strings(false).len(), 2);
    }

    #[test]
    fn test_blank_track_has_no_queries() {
        let query = Query::new("  ", Some("Dua Lipa"));
        assert!(query.search_strings(true).is_empty());
    }
}
