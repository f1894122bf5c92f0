//! Mentions v2 raw-line tokenizing (16 tab-delimited columns, §6).

use crate::error::GdeltError;
use crate::model::raw::RawMention;

const EXPECTED_COLUMNS: usize = 16;

pub fn parse_raw_line(line: &str, line_number: usize) -> Result<RawMention, GdeltError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 5 {
        return Err(GdeltError::Parse {
            line: line_number,
            message: format!("expected at least 5 tab-delimited fields, got {}", fields.len()),
        });
    }
    let get = |i: usize| fields.get(i).copied().unwrap_or("").to_string();

    Ok(RawMention {
        global_event_id: get(0),
        event_time_date: get(1),
        mention_time_date: get(2),
        mention_type: get(3),
        mention_source_name: get(4),
        mention_identifier: get(5),
        sentence_id: get(6),
        actor1_char_offset: get(7),
        actor2_char_offset: get(8),
        action_char_offset: get(9),
        in_raw_text: get(10),
        confidence: get(11),
        mention_doc_len: get(12),
        mention_doc_tone: get(13),
        mention_doc_translation_info: get(14),
        extras: if fields.len() > EXPECTED_COLUMNS {
            fields[EXPECTED_COLUMNS..].iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line() -> String {
        (0..16).map(|i| format!("f{i}")).collect::<Vec<_>>().join("\t")
    }

    #[test]
    fn parse_raw_line_maps_all_16_fields() {
        let raw = parse_raw_line(&sample_line(), 1).unwrap();
        assert_eq!(raw.global_event_id, "f0");
        assert_eq!(raw.mention_doc_translation_info, "f14");
    }

    #[test]
    fn parse_raw_line_rejects_too_few_fields() {
        assert!(parse_raw_line("a", 1).is_err());
    }
}
