//! Name normalization and fuzzy comparison for catalog matching.
//!
//! Normalized names are only ever used for comparison, never written back
//! into a record.

use any_ascii::any_ascii;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Minimum similarity for a candidate album to count as the local album.
pub const ALBUM_MATCH_THRESHOLD: f64 = 0.80;

/// Minimum similarity for a catalog track title to count as the local title.
pub const TITLE_MATCH_THRESHOLD: f64 = 0.90;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Anything that is not a lowercase ASCII letter, digit or whitespace.
pub static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]+").unwrap());

/// A well-formed roman numeral (1..=3999), lowercase.
pub static ROMAN_NUMERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^m{0,3}(?:cm|cd|d?c{0,3})(?:xc|xl|l?x{0,3})(?:ix|iv|v?i{0,3})$").unwrap()
});

/// Leading articles dropped before comparison.
const LEADING_ARTICLES: [&str; 3] = ["the ", "a ", "an "];

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Check if a character is a Unicode combining mark (diacritical mark).
pub fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0xFE20..=0xFE2F)
}

/// Fold Unicode text to lowercase ASCII: NFKD, drop combining marks, transliterate the rest.
/// e.g., "Motörhead" → "motorhead"
pub fn fold_to_ascii(s: &str) -> String {
    let stripped: String = s.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    any_ascii(&stripped).to_lowercase()
}

/// Straighten curly quotes and spell out ampersands so "Rock & Roll" meets "Rock and Roll".
pub fn normalize_punctuation(s: &str) -> String {
    s.replace(['\u{2018}', '\u{2019}', '\u{00B4}', '\u{0060}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace('&', " and ")
}

/// Decimal value of a lowercase roman numeral token, if it is one.
pub fn roman_to_decimal(token: &str) -> Option<u32> {
    if token.is_empty() || !ROMAN_NUMERAL.is_match(token) {
        return None;
    }

    let digit = |c: char| match c {
        'i' => 1,
        'v' => 5,
        'x' => 10,
        'l' => 50,
        'c' => 100,
        'd' => 500,
        'm' => 1000,
        _ => 0,
    };

    let values: Vec<u32> = token.chars().map(digit).collect();
    let mut total = 0;
    for (i, &value) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(&next) if next > value => total -= value as i64,
            _ => total += value as i64,
        }
    }
    u32::try_from(total).ok()
}

fn strip_leading_articles(mut s: &str) -> &str {
    'strip: loop {
        for article in LEADING_ARTICLES {
            if let Some(rest) = s.strip_prefix(article) {
                s = rest;
                continue 'strip;
            }
        }
        return s;
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Canonicalize a name for comparison.
///
/// Folds to lowercase ASCII, drops punctuation, collapses whitespace, strips
/// leading articles and rewrites standalone roman numerals as decimals:
/// "The Godfather, Part II" → "godfather part 2".
///
/// Articles are stripped after punctuation cleanup so that the result is a
/// fixed point: `normalize_name(&normalize_name(s)) == normalize_name(s)`.
pub fn normalize_name(name: &str) -> String {
    let folded = fold_to_ascii(&normalize_punctuation(name));
    let cleaned = PUNCTUATION.replace_all(&folded, "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    strip_leading_articles(&collapsed)
        .split(' ')
        .map(|token| match roman_to_decimal(token) {
            Some(n) => n.to_string(),
            None => token.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// FUZZY MATCHING
// ============================================================================

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Similarity of two already-normalized names (0.0 to 1.0).
/// Best of the plain edit-distance ratio and the ratio over sorted tokens,
/// so reordered words still score high.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let direct = strsim::normalized_levenshtein(a, b);
    let reordered = strsim::normalized_levenshtein(&sorted_tokens(a), &sorted_tokens(b));
    direct.max(reordered)
}

/// Similarity of two raw names after normalization.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_similarity(&normalize_name(a), &normalize_name(b))
}

/// True when the names are at least `threshold` similar.
pub fn fuzzy_matches(a: &str, b: &str, threshold: f64) -> bool {
    similarity(a, b) >= threshold
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_basic() {
        assert_eq!(normalize_name("The Wall"), "wall");
        assert_eq!(normalize_name("A Night at the Opera"), "night at the opera");
        assert_eq!(normalize_name("  Don't   Stop  Me Now! "), "dont stop me now");
        assert_eq!(normalize_name("Rock & Roll"), "rock and roll");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_normalize_name_roman_numerals() {
        assert_eq!(normalize_name("Led Zeppelin IV"), "led zeppelin 4");
        assert_eq!(normalize_name("The Godfather, Part II"), "godfather part 2");
        assert_eq!(normalize_name("Chapter XLII"), "chapter 42");
        // Not a well-formed numeral, left alone
        assert_eq!(normalize_name("Part IIII"), "part iiii");
    }

    #[test]
    fn test_normalize_name_folds_accents() {
        assert_eq!(normalize_name("Motörhead"), "motorhead");
        assert_eq!(normalize_name("Björk – Début"), "bjork debut");
    }

    #[test]
    fn test_normalize_name_is_idempotent() {
        for input in [
            "The Wall",
            "the the band",
            "An -The Test",
            "A a a",
            "Symphony No. IX (Live)",
            "Sgt. Pepper's Lonely Hearts Club Band",
            "Ⅻ Śpiewy",
            "",
        ] {
            let once = normalize_name(input);
            assert_eq!(normalize_name(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_roman_to_decimal() {
        assert_eq!(roman_to_decimal("i"), Some(1));
        assert_eq!(roman_to_decimal("iv"), Some(4));
        assert_eq!(roman_to_decimal("mcmxcix"), Some(1999));
        assert_eq!(roman_to_decimal("mmmcmxcix"), Some(3999));
        assert_eq!(roman_to_decimal("ic"), None);
        assert_eq!(roman_to_decimal("queen"), None);
        assert_eq!(roman_to_decimal(""), None);
    }

    #[test]
    fn test_similarity_identical_is_one() {
        assert_eq!(similarity("Bohemian Rhapsody", "Bohemian Rhapsody"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        for threshold in [0.0, 0.5, 0.9, 1.0] {
            assert!(fuzzy_matches("Innuendo", "Innuendo", threshold));
        }
    }

    #[test]
    fn test_fuzzy_matches_thresholds() {
        assert!(fuzzy_matches("The Wall", "Wall", ALBUM_MATCH_THRESHOLD));
        assert!(fuzzy_matches("Bohemian Rhapsody", "Bohemian Rapsody", TITLE_MATCH_THRESHOLD));
        assert!(!fuzzy_matches("Bohemian Rhapsody", "Love of My Life", TITLE_MATCH_THRESHOLD));
        assert!(!fuzzy_matches("Anything", "", ALBUM_MATCH_THRESHOLD));
    }

    #[test]
    fn test_similarity_ignores_word_order() {
        assert_eq!(similarity("Live Killers", "Killers Live"), 1.0);
    }
}
