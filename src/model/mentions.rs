//! Typed `Mention` record and its raw→public conversion (§4.8, §3.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::raw::RawMention;
use crate::parse::dates;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mention {
    pub global_event_id: String,
    pub event_time_date: Option<DateTime<Utc>>,
    pub mention_time_date: Option<DateTime<Utc>>,
    pub mention_type: String,
    pub mention_source_name: String,
    pub mention_identifier: String,
    pub sentence_id: i32,
    pub actor1_char_offset: i32,
    pub actor2_char_offset: i32,
    pub action_char_offset: i32,
    pub in_raw_text: bool,
    pub confidence: i32,
    pub mention_doc_len: i32,
    pub mention_doc_tone: f64,
    pub mention_doc_translation_info: Option<String>,
}

impl Mention {
    pub fn from_raw(raw: &RawMention) -> Self {
        Mention {
            global_event_id: raw.global_event_id.clone(),
            event_time_date: dates::parse_lenient(&raw.event_time_date),
            mention_time_date: dates::parse_lenient(&raw.mention_time_date),
            mention_type: raw.mention_type.clone(),
            mention_source_name: raw.mention_source_name.clone(),
            mention_identifier: raw.mention_identifier.clone(),
            sentence_id: raw.sentence_id.trim().parse().unwrap_or(0),
            actor1_char_offset: raw.actor1_char_offset.trim().parse().unwrap_or(-1),
            actor2_char_offset: raw.actor2_char_offset.trim().parse().unwrap_or(-1),
            action_char_offset: raw.action_char_offset.trim().parse().unwrap_or(-1),
            in_raw_text: raw.in_raw_text.trim() == "1",
            confidence: raw.confidence.trim().parse().unwrap_or(0),
            mention_doc_len: raw.mention_doc_len.trim().parse().unwrap_or(0),
            mention_doc_tone: raw.mention_doc_tone.trim().parse().unwrap_or(0.0),
            mention_doc_translation_info: if raw.mention_doc_translation_info.trim().is_empty() {
                None
            } else {
                Some(raw.mention_doc_translation_info.clone())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_parses_confidence_and_offsets() {
        let raw = RawMention {
            confidence: "85".to_string(),
            actor1_char_offset: "120".to_string(),
            ..Default::default()
        };
        let mention = Mention::from_raw(&raw);
        assert_eq!(mention.confidence, 85);
        assert_eq!(mention.actor1_char_offset, 120);
    }

    #[test]
    fn from_raw_defaults_garbage_offset_to_negative_one() {
        let raw = RawMention {
            actor2_char_offset: "n/a".to_string(),
            ..Default::default()
        };
        let mention = Mention::from_raw(&raw);
        assert_eq!(mention.actor2_char_offset, -1);
    }
}
