//! Flat raw records mirroring on-disk field order (§3.1 `RawRecord`).
//!
//! Each carries an `extras`/`unknown_fields` side channel so that schema
//! evolution never loses data: unknown trailing columns are preserved
//! rather than dropped (§3.2's schema-tolerance invariant).

use serde_json::Map as JsonMap;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct RawEvent {
    pub global_event_id: String,
    pub day: String,
    pub month_year: String,
    pub year: String,
    pub fraction_date: String,
    pub actor1_code: String,
    pub actor1_name: String,
    pub actor1_country_code: String,
    pub actor1_known_group_code: String,
    pub actor1_ethnic_code: String,
    pub actor1_religion1_code: String,
    pub actor1_religion2_code: String,
    pub actor1_type1_code: String,
    pub actor1_type2_code: String,
    pub actor1_type3_code: String,
    pub actor2_code: String,
    pub actor2_name: String,
    pub actor2_country_code: String,
    pub actor2_known_group_code: String,
    pub actor2_ethnic_code: String,
    pub actor2_religion1_code: String,
    pub actor2_religion2_code: String,
    pub actor2_type1_code: String,
    pub actor2_type2_code: String,
    pub actor2_type3_code: String,
    pub is_root_event: String,
    pub event_code: String,
    pub event_base_code: String,
    pub event_root_code: String,
    pub quad_class: String,
    pub goldstein_scale: String,
    pub num_mentions: String,
    pub num_sources: String,
    pub num_articles: String,
    pub avg_tone: String,
    pub actor1_geo_type: String,
    pub actor1_geo_full_name: String,
    pub actor1_geo_country_code: String,
    pub actor1_geo_adm1_code: String,
    pub actor1_geo_adm2_code: String,
    pub actor1_geo_lat: String,
    pub actor1_geo_long: String,
    pub actor1_geo_feature_id: String,
    pub actor2_geo_type: String,
    pub actor2_geo_full_name: String,
    pub actor2_geo_country_code: String,
    pub actor2_geo_adm1_code: String,
    pub actor2_geo_adm2_code: String,
    pub actor2_geo_lat: String,
    pub actor2_geo_long: String,
    pub actor2_geo_feature_id: String,
    pub action_geo_type: String,
    pub action_geo_full_name: String,
    pub action_geo_country_code: String,
    pub action_geo_adm1_code: String,
    pub action_geo_adm2_code: String,
    pub action_geo_lat: String,
    pub action_geo_long: String,
    pub action_geo_feature_id: String,
    pub date_added: String,
    pub source_url: String,
    pub extras: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RawMention {
    pub global_event_id: String,
    pub event_time_date: String,
    pub mention_time_date: String,
    pub mention_type: String,
    pub mention_source_name: String,
    pub mention_identifier: String,
    pub sentence_id: String,
    pub actor1_char_offset: String,
    pub actor2_char_offset: String,
    pub action_char_offset: String,
    pub in_raw_text: String,
    pub confidence: String,
    pub mention_doc_len: String,
    pub mention_doc_tone: String,
    pub mention_doc_translation_info: String,
    pub extras: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RawGkg {
    pub gkg_record_id: String,
    pub date: String,
    pub source_collection_id: String,
    pub source_common_name: String,
    pub document_identifier: String,
    pub v1_counts: String,
    pub v21_counts: String,
    pub v1_themes: String,
    pub v2_enhanced_themes: String,
    pub v1_locations: String,
    pub v2_enhanced_locations: String,
    pub v1_persons: String,
    pub v2_enhanced_persons: String,
    pub v1_organizations: String,
    pub v2_enhanced_organizations: String,
    pub tone: String,
    pub v21_enhanced_dates: String,
    pub gcam: String,
    pub sharing_image: String,
    pub related_images: String,
    pub social_image_embeds: String,
    pub social_video_embeds: String,
    pub quotations: String,
    pub all_names: String,
    pub amounts: String,
    pub translation_info: String,
    pub extras_xml: String,
    pub extras: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RawNGram {
    pub date: String,
    pub url: String,
    pub lang: String,
    pub pos: String,
    pub pre: String,
    pub ngram: String,
    pub post: String,
    pub unknown_fields: JsonMap<String, Value>,
}

/// Getters dedup keys are built from, generalizing the teacher's
/// duck-typed "has dedup fields" object into a trait (§9 REDESIGN FLAGS).
pub trait Dedupable {
    fn source_url(&self) -> &str;
    fn date(&self) -> &str;
    fn primary_location_id(&self) -> Option<&str> {
        None
    }
    fn actor1_code(&self) -> Option<&str> {
        None
    }
    fn actor2_code(&self) -> Option<&str> {
        None
    }
    fn identity_key(&self) -> String {
        format!(
            "{}|{}|{:?}|{:?}|{:?}",
            self.source_url(),
            self.date(),
            self.primary_location_id(),
            self.actor1_code(),
            self.actor2_code()
        )
    }
}

impl Dedupable for RawEvent {
    fn source_url(&self) -> &str {
        &self.source_url
    }
    fn date(&self) -> &str {
        &self.date_added
    }
    fn primary_location_id(&self) -> Option<&str> {
        if self.action_geo_feature_id.is_empty() {
            None
        } else {
            Some(&self.action_geo_feature_id)
        }
    }
    fn actor1_code(&self) -> Option<&str> {
        if self.actor1_code.is_empty() {
            None
        } else {
            Some(&self.actor1_code)
        }
    }
    fn actor2_code(&self) -> Option<&str> {
        if self.actor2_code.is_empty() {
            None
        } else {
            Some(&self.actor2_code)
        }
    }
}

impl Dedupable for RawGkg {
    fn source_url(&self) -> &str {
        &self.document_identifier
    }
    fn date(&self) -> &str {
        &self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_event_identity_key_includes_actor_pair() {
        let mut event = RawEvent::default();
        event.source_url = "http://example.com".into();
        event.date_added = "20240115".into();
        event.actor1_code = "USAGOV".into();
        event.actor2_code = "RUSMIL".into();
        let key = event.identity_key();
        assert!(key.contains("USAGOV"));
        assert!(key.contains("RUSMIL"));
    }

    #[test]
    fn raw_gkg_dedup_fields_default_to_none() {
        let gkg = RawGkg::default();
        assert_eq!(gkg.primary_location_id(), None);
        assert_eq!(gkg.actor1_code(), None);
    }
}
