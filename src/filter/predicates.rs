//! Client-side filter predicates applied after raw→public conversion for
//! fields the file source cannot push down (§4.4).
//!
//! These are free functions rather than the teacher's one-struct-per-filter
//! design because they're shared across four different public record types;
//! each façade calls the ones relevant to its dataset over the fields it
//! extracts from its own record type.

/// Exact match after case-insensitive normalization (e.g. actor country,
/// event code, language).
pub fn matches_exact_ci(value: &str, expected: &str) -> bool {
    value.eq_ignore_ascii_case(expected)
}

/// Case-insensitive substring containment (persons/organizations/ngram
/// text).
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// OR logic across provided terms: true if haystack contains any one of
/// them, case-insensitively. An empty term list matches everything (no
/// filter specified).
pub fn contains_any_ci(haystack: &str, terms: &[String]) -> bool {
    terms.is_empty() || terms.iter().any(|term| contains_ci(haystack, term))
}

/// Case-insensitive set intersection: true if any of the record's themes
/// equals any of the wanted themes.
pub fn themes_intersect_ci(record_themes: &[String], wanted: &[String]) -> bool {
    wanted.is_empty()
        || record_themes.iter().any(|rt| {
            wanted
                .iter()
                .any(|w| rt.eq_ignore_ascii_case(w))
        })
}

/// Case-insensitive theme-code prefix match against any of the record's
/// themes.
pub fn theme_prefix_match(record_themes: &[String], prefix: &str) -> bool {
    let prefix_lower = prefix.to_lowercase();
    record_themes
        .iter()
        .any(|t| t.to_lowercase().starts_with(&prefix_lower))
}

/// Numeric tone range; `None` bounds are open.
pub fn tone_in_range(tone: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.is_none_or(|m| tone >= m) && max.is_none_or(|m| tone <= m)
}

/// Article-position decile range (0..90), per §3.1's "positional fields".
pub fn position_in_range(position: u8, min: Option<u8>, max: Option<u8>) -> bool {
    min.is_none_or(|m| position >= m) && max.is_none_or(|m| position <= m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_case_insensitive() {
        assert!(matches_exact_ci("US", "us"));
        assert!(!matches_exact_ci("US", "UK"));
    }

    #[test]
    fn contains_ci_finds_substring_regardless_of_case() {
        assert!(contains_ci("Barack Obama", "obama"));
        assert!(!contains_ci("Barack Obama", "biden"));
    }

    #[test]
    fn contains_any_ci_is_or_logic_and_matches_everything_when_empty() {
        let terms = vec!["obama".to_string(), "biden".to_string()];
        assert!(contains_any_ci("Barack Obama;Joe Biden", &terms));
        assert!(contains_any_ci("anything", &[]));
    }

    #[test]
    fn themes_intersect_ci_matches_case_insensitively() {
        let record = vec!["TAX_POLICY".to_string(), "CLIMATE_CHANGE".to_string()];
        let wanted = vec!["climate_change".to_string()];
        assert!(themes_intersect_ci(&record, &wanted));
        assert!(!themes_intersect_ci(&record, &["TERROR".to_string()]));
    }

    #[test]
    fn theme_prefix_match_checks_all_themes() {
        let record = vec!["TAX_FNCACT_PRESIDENT".to_string()];
        assert!(theme_prefix_match(&record, "tax_fncact"));
        assert!(!theme_prefix_match(&record, "terror"));
    }

    #[test]
    fn tone_in_range_respects_open_bounds() {
        assert!(tone_in_range(0.0, Some(-5.0), Some(5.0)));
        assert!(!tone_in_range(10.0, Some(-5.0), Some(5.0)));
        assert!(tone_in_range(100.0, None, None));
    }

    #[test]
    fn position_in_range_respects_decile_bounds() {
        assert!(position_in_range(10, Some(0), Some(20)));
        assert!(!position_in_range(30, Some(0), Some(20)));
    }
}
