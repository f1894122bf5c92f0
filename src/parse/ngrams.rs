//! NGrams JSON-lines parsing. One object per line; empty lines are
//! skipped; malformed lines are the caller's `parse_error`, governed by
//! `error_policy` (§4.3).

use serde_json::Value;

use crate::error::GdeltError;
use crate::model::raw::RawNGram;

pub fn parse_raw_line(line: &str, line_number: usize) -> Result<RawNGram, GdeltError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(GdeltError::Parse {
            line: line_number,
            message: "empty line".to_string(),
        });
    }
    let value: Value = serde_json::from_str(trimmed).map_err(|e| GdeltError::Parse {
        line: line_number,
        message: format!("invalid JSON: {e}"),
    })?;
    let obj = value.as_object().ok_or_else(|| GdeltError::Parse {
        line: line_number,
        message: "expected a JSON object".to_string(),
    })?;

    let known = ["date", "url", "lang", "pos", "pre", "ngram", "post"];
    let mut unknown_fields = obj.clone();
    for key in known {
        unknown_fields.remove(key);
    }

    Ok(RawNGram {
        date: field_str(obj, "date"),
        url: field_str(obj, "url"),
        lang: field_str(obj, "lang"),
        pos: field_str(obj, "pos"),
        pre: field_str(obj, "pre"),
        ngram: field_str(obj, "ngram"),
        post: field_str(obj, "post"),
        unknown_fields,
    })
}

fn field_str(obj: &serde_json::Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_raw_line_maps_known_fields() {
        let line = r#"{"date":"20240101","url":"http://x","lang":"en","pos":40,"pre":"a","ngram":"climate","post":"b"}"#;
        let raw = parse_raw_line(line, 1).unwrap();
        assert_eq!(raw.ngram, "climate");
        assert_eq!(raw.pos, "40");
        assert!(raw.unknown_fields.is_empty());
    }

    #[test]
    fn parse_raw_line_preserves_unknown_fields() {
        let line = r#"{"date":"20240101","url":"u","lang":"en","pos":0,"pre":"","ngram":"x","post":"","extra_field":true}"#;
        let raw = parse_raw_line(line, 1).unwrap();
        assert!(raw.unknown_fields.contains_key("extra_field"));
    }

    #[test]
    fn parse_raw_line_rejects_empty_line() {
        assert!(parse_raw_line("", 1).is_err());
    }

    #[test]
    fn parse_raw_line_rejects_malformed_json() {
        assert!(parse_raw_line("{not json", 1).is_err());
    }
}
