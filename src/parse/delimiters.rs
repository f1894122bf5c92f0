//! Low-level tokenizing helpers shared by the GKG sub-parsers, adapted
//! directly from the teacher's `parse::delimiters`. These default rather
//! than fail on malformed numeric fields, matching §4.8's "invalid numeric
//! fields default".

/// Splits a field on `#`, the GKG convention for multi-part structured
/// cells (e.g. `CountV1` blocks).
pub fn split_blocks(field: &str) -> Vec<&str> {
    field.split('#').collect()
}

/// Splits a semicolon-delimited list field (themes, persons, organizations,
/// quotations), dropping empty segments.
pub fn split_semicolon_list(field: &str) -> Vec<&str> {
    field
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// `Some(s)` unless `s` is empty after trimming.
pub fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Retrieves one `#`-delimited field by index, or `None` if the block is
/// too short.
pub fn hash_field<'a>(blocks: &[&'a str], index: usize) -> Option<&'a str> {
    blocks.get(index).copied().and_then(non_empty)
}

pub fn parse_f64(s: &str) -> f64 {
    s.trim().parse().unwrap_or(0.0)
}

pub fn parse_i64(s: &str) -> i64 {
    s.trim().parse().unwrap_or(0)
}

pub fn parse_i32(s: &str) -> i32 {
    s.trim().parse().unwrap_or(0)
}

pub fn parse_f64_opt(s: &str) -> Option<f64> {
    non_empty(s).and_then(|s| s.parse().ok())
}

pub fn parse_i32_opt(s: &str) -> Option<i32> {
    non_empty(s).and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_blocks_splits_on_hash() {
        assert_eq!(split_blocks("a#b#c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn split_semicolon_list_drops_empty_segments() {
        assert_eq!(
            split_semicolon_list("Obama;;Biden; "),
            vec!["Obama", "Biden"]
        );
    }

    #[test]
    fn non_empty_trims_and_filters_blank() {
        assert_eq!(non_empty("  "), None);
        assert_eq!(non_empty("  x  "), Some("x"));
    }

    #[test]
    fn hash_field_returns_none_past_end() {
        let blocks = vec!["a", "b"];
        assert_eq!(hash_field(&blocks, 5), None);
    }

    #[test]
    fn parse_f64_defaults_on_garbage() {
        assert_eq!(parse_f64("not a number"), 0.0);
        assert_eq!(parse_f64("3.5"), 3.5);
    }

    #[test]
    fn parse_i64_defaults_on_garbage() {
        assert_eq!(parse_i64("abc"), 0);
        assert_eq!(parse_i64("42"), 42);
    }

    #[test]
    fn parse_opt_variants_distinguish_absent_from_invalid() {
        assert_eq!(parse_f64_opt(""), None);
        assert_eq!(parse_f64_opt("oops"), None);
        assert_eq!(parse_f64_opt("1.5"), Some(1.5));
    }
}
