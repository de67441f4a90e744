//! Text canonicalization for track and artist strings
//!
//! Everything here is pure and total: any input, including the empty string,
//! produces a (possibly empty) output.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Marketing noise that platforms append to titles. Version markers such as
/// "remix" or "live" are left alone; containment scoring handles those.
static FILLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        [(\[]\s*(?:
            official\s+(?:music\s+)?(?:audio|video|visualizer)
            | (?:official\s+)?lyrics?(?:\s+video)?
            | explicit(?:\s+version)?
            | clean(?:\s+version)?
            | audio
            | hq | hd
        )\s*[)\]]
        | \bofficial\s+(?:music\s+)?(?:audio|video|visualizer)\b
        | \blyric\s+video\b
        | \bexplicit\b
        | \b(?:feat|ft)\b\.?
        | \bfeaturing\b
        ",
    )
    .expect("filler pattern is valid")
});

/// Canonicalize free text for comparison.
///
/// Lowercases, folds accented characters to ASCII, removes filler tokens,
/// collapses whitespace and trims punctuation from both ends. Text written
/// entirely in a non-Latin script would fold to nothing, so for such input
/// the lowercase original is kept instead of the ASCII fold.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let folded = fold_to_ascii(&lowered);
    let base = if has_alphanumeric(&folded) || !has_alphanumeric(&lowered) {
        folded
    } else {
        lowered
    };

    let without_filler = FILLER.replace_all(&base, " ");
    let collapsed = collapse_whitespace(&without_filler);
    trim_punctuation(&collapsed).to_string()
}

/// Replace every character that is not alphanumeric or whitespace with a
/// space, then collapse. Used to derive "AC/DC" → "ac dc" style variants.
pub fn strip_punctuation(text: &str) -> String {
    let spaced: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    collapse_whitespace(&spaced)
}

fn fold_to_ascii(text: &str) -> String {
    text.nfkd().filter(char::is_ascii).collect()
}

fn has_alphanumeric(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Brackets are kept so a trailing "(remix)" survives intact.
fn trim_punctuation(text: &str) -> &str {
    text.trim_matches(|c: char| {
        c.is_whitespace() || (c.is_ascii_punctuation() && !matches!(c, '(' | ')' | '[' | ']'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(strip_punctuation(""), "");
    }

    #[test]
    fn test_lowercase_and_whitespace() {
        assert_eq!(normalize("  Blinding   LIGHTS "), "blinding lights");
    }

    #[test]
    fn test_diacritics_folded() {
        assert_eq!(normalize("Beyoncé"), "beyonce");
        assert_eq!(normalize("Sigur Rós"), "sigur ros");
        assert_eq!(normalize("Motörhead"), "motorhead");
    }

    #[test]
    fn test_filler_removed() {
        assert_eq!(normalize("Levitating (Official Audio)"), "levitating");
        assert_eq!(normalize("Bad Guy [Official Music Video]"), "bad guy");
        assert_eq!(normalize("WAP - Explicit"), "wap");
        assert_eq!(normalize("Stay (Lyrics)"), "stay");
    }

    #[test]
    fn test_featuring_marker_removed_but_artist_kept() {
        assert_eq!(normalize("Levitating feat. DaBaby"), "levitating dababy");
        assert_eq!(normalize("Levitating ft DaBaby"), "levitating dababy");
        assert_eq!(normalize("Levitating featuring DaBaby"), "levitating dababy");
    }

    #[test]
    fn test_remix_kept() {
        assert_eq!(normalize("Levitating (Remix)"), "levitating (remix)");
    }

    #[test]
    fn test_edge_punctuation_trimmed() {
        assert_eq!(normalize("--Hello!!"), "hello");
        assert_eq!(normalize("\"Quoted\""), "quoted");
    }

    #[test]
    fn test_non_latin_script_kept() {
        assert_eq!(normalize("夜に駆ける"), "夜に駆ける");
    }

    #[test]
    fn test_deterministic() {
        let input = "Café del Mar (Official Video) feat. Someone";
        assert_eq!(normalize(input), normalize(input));
    }

    #[test]
    fn test_strip_punctuation() {
        assert_eq!(strip_punctuation("ac/dc"), "ac dc");
        assert_eq!(strip_punctuation("guns n' roses"), "guns n roses");
        assert_eq!(strip_punctuation("p!nk"), "p nk");
    }
}
