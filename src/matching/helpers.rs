use std::sync::LazyLock;

use regex::Regex;

/// Separators between symptom keywords: whitespace, comma, semicolon.
static RE_TOKEN_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s,;]+").unwrap());

/// Keywords of this many characters or fewer carry no signal.
const MIN_KEYWORD_CHARS: usize = 2;

/// Lowercase form used for all symptom comparisons.
pub fn normalize_symptom(symptom: &str) -> String {
    symptom.to_lowercase()
}

/// Split a normalized symptom into comparable keywords.
pub fn keywords(normalized: &str) -> Vec<&str> {
    RE_TOKEN_SEPARATOR
        .split(normalized)
        .filter(|w| w.chars().count() > MIN_KEYWORD_CHARS)
        .collect()
}

/// Case-insensitive full equality on pre-normalized strings.
pub fn is_exact_match(selected: &str, canonical: &str) -> bool {
    selected == canonical
}

/// Weaker similarity between two normalized symptoms.
///
/// Tried in order: substring containment either way, then keyword overlap,
/// then a shared anatomical keyword inside a token pair.
pub fn is_partial_match(selected: &str, canonical: &str, anatomical_keywords: &[String]) -> bool {
    if selected.contains(canonical) || canonical.contains(selected) {
        return true;
    }

    let selected_words = keywords(selected);
    let canonical_words = keywords(canonical);

    selected_words.iter().any(|sw| {
        canonical_words.iter().any(|cw| {
            sw.contains(cw) || cw.contains(sw) || shares_anatomical_keyword(sw, cw, anatomical_keywords)
        })
    })
}

/// True when both tokens mention the same anatomical keyword.
pub fn shares_anatomical_keyword(a: &str, b: &str, anatomical_keywords: &[String]) -> bool {
    anatomical_keywords
        .iter()
        .any(|kw| a.contains(kw.as_str()) && b.contains(kw.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::reference::MatchingTables;

    fn anatomy() -> Vec<String> {
        MatchingTables::default().anatomical_keywords
    }

    #[test]
    fn keywords_drop_short_tokens() {
        assert_eq!(keywords("spots on skin, fins; tail"), vec!["spots", "skin", "fins", "tail"]);
    }

    #[test]
    fn keywords_ignore_leading_separators() {
        assert_eq!(keywords(" , gasping"), vec!["gasping"]);
    }

    #[test]
    fn keywords_count_characters_not_bytes() {
        assert_eq!(keywords("ক্ষ"), vec!["ক্ষ"]);
        // two characters, six bytes
        assert!(keywords("লা").is_empty());
    }

    #[test]
    fn exact_requires_full_equality() {
        assert!(is_exact_match("scale loss", "scale loss"));
        assert!(!is_exact_match("scale loss", "scale loss (severe)"));
    }

    #[test]
    fn substring_is_partial() {
        assert!(is_partial_match("gasping", "gasping at surface", &anatomy()));
        assert!(is_partial_match("gasping at surface", "gasping", &anatomy()));
    }

    #[test]
    fn keyword_overlap_is_partial() {
        assert!(is_partial_match("ulcers/wounds", "ulcers with red edges", &anatomy()));
    }

    #[test]
    fn anatomical_keyword_catches_differing_tokens() {
        assert!(is_partial_match("swollen gills", "gill-rot lesions", &anatomy()));
        assert!(!is_partial_match("swollen gills", "gill-rot lesions", &[]));
    }

    #[test]
    fn short_tokens_never_match() {
        assert!(!is_partial_match("ox rot", "ox fin", &anatomy()));
    }

    #[test]
    fn unrelated_symptoms_do_not_match() {
        assert!(!is_partial_match("foul odor", "torn gills", &anatomy()));
    }
}
