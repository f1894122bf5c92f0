//! GKG v2.1 public record (ported from the teacher's `model::gkg`, kept at
//! its original 27-field shape per `SPEC_FULL.md` §3).

pub mod quotation;
pub mod tone;
pub mod types;

use serde::{Deserialize, Serialize};

use crate::model::raw::RawGkg;
use crate::parse::dates;
use crate::parse::gkg as gkg_parse;
use quotation::Quotation;
use tone::Tone;
use types::{
    AmountEntry, CountV1, CountV21, EnhancedDate, EnhancedEntity, EnhancedLocation, EnhancedTheme,
    GcamEntry, LocationV1, NameEntry, SourceCollectionId, TranslationInfo,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GkgRecord {
    pub gkg_record_id: String,
    pub date: chrono::DateTime<chrono::Utc>,
    pub source_collection_id: SourceCollectionId,
    pub source_common_name: String,
    pub document_identifier: String,
    pub v1_counts: Vec<CountV1>,
    pub v21_counts: Vec<CountV21>,
    pub v1_themes: Vec<String>,
    pub v2_enhanced_themes: Vec<EnhancedTheme>,
    pub v1_locations: Vec<LocationV1>,
    pub v2_enhanced_locations: Vec<EnhancedLocation>,
    pub v1_persons: Vec<String>,
    pub v2_enhanced_persons: Vec<EnhancedEntity>,
    pub v1_organizations: Vec<String>,
    pub v2_enhanced_organizations: Vec<EnhancedEntity>,
    pub tone: Option<Tone>,
    pub v21_enhanced_dates: Vec<EnhancedDate>,
    pub gcam: Vec<GcamEntry>,
    pub sharing_image: Option<String>,
    pub related_images: Vec<String>,
    pub social_image_embeds: Vec<String>,
    pub social_video_embeds: Vec<String>,
    pub quotations: Vec<Quotation>,
    pub all_names: Vec<NameEntry>,
    pub amounts: Vec<AmountEntry>,
    pub translation_info: Option<TranslationInfo>,
    pub extras_xml: Option<String>,
}

impl GkgRecord {
    /// `GKGRecord.from_raw` splits semicolon-delimited compound strings,
    /// parses offset-tagged entity mentions, and constructs quotations
    /// (§4.8).
    pub fn from_raw(raw: &RawGkg) -> Self {
        GkgRecord {
            gkg_record_id: raw.gkg_record_id.clone(),
            date: dates::parse_lenient(&raw.date).unwrap_or_default(),
            source_collection_id: SourceCollectionId::from(
                raw.source_collection_id.trim().parse::<i32>().unwrap_or(0),
            ),
            source_common_name: raw.source_common_name.clone(),
            document_identifier: raw.document_identifier.clone(),
            v1_counts: gkg_parse::parse_counts_v1(&raw.v1_counts),
            v21_counts: gkg_parse::parse_counts_v21(&raw.v21_counts),
            v1_themes: gkg_parse::parse_semicolon_string_list(&raw.v1_themes),
            v2_enhanced_themes: gkg_parse::parse_themes_v2(&raw.v2_enhanced_themes),
            v1_locations: gkg_parse::parse_locations_v1(&raw.v1_locations),
            v2_enhanced_locations: gkg_parse::parse_locations_v2(&raw.v2_enhanced_locations),
            v1_persons: gkg_parse::parse_semicolon_string_list(&raw.v1_persons),
            v2_enhanced_persons: gkg_parse::parse_entities_v2(&raw.v2_enhanced_persons),
            v1_organizations: gkg_parse::parse_semicolon_string_list(&raw.v1_organizations),
            v2_enhanced_organizations: gkg_parse::parse_entities_v2(&raw.v2_enhanced_organizations),
            tone: gkg_parse::parse_tone(&raw.tone),
            v21_enhanced_dates: gkg_parse::parse_enhanced_dates(&raw.v21_enhanced_dates),
            gcam: gkg_parse::parse_gcam(&raw.gcam),
            sharing_image: non_empty(&raw.sharing_image),
            related_images: gkg_parse::parse_semicolon_string_list(&raw.related_images),
            social_image_embeds: gkg_parse::parse_semicolon_string_list(&raw.social_image_embeds),
            social_video_embeds: gkg_parse::parse_semicolon_string_list(&raw.social_video_embeds),
            quotations: gkg_parse::parse_quotations(&raw.quotations),
            all_names: gkg_parse::parse_names(&raw.all_names),
            amounts: gkg_parse::parse_amounts(&raw.amounts),
            translation_info: gkg_parse::parse_translation(&raw.translation_info),
            extras_xml: non_empty(&raw.extras_xml),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raw() -> RawGkg {
        RawGkg {
            gkg_record_id: "20240115120000-1".to_string(),
            date: "20240115120000".to_string(),
            source_collection_id: "1".to_string(),
            source_common_name: "bbc.com".to_string(),
            document_identifier: "http://bbc.com/a".to_string(),
            v1_themes: "TAX_POLICY;CLIMATE_CHANGE".to_string(),
            v1_persons: "Barack Obama;Michelle Obama;Joe Biden".to_string(),
            tone: "-2.5,1.1,3.6,4.7,0.5,0.2,350".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn from_raw_splits_semicolon_themes() {
        let record = GkgRecord::from_raw(&sample_raw());
        assert_eq!(record.v1_themes, vec!["TAX_POLICY", "CLIMATE_CHANGE"]);
    }

    #[test]
    fn from_raw_splits_semicolon_persons_scenario_from_spec() {
        let record = GkgRecord::from_raw(&sample_raw());
        assert_eq!(record.v1_persons.len(), 3);
        assert!(record
            .v1_persons
            .iter()
            .any(|p| p.to_lowercase().contains("obama")));
    }

    #[test]
    fn from_raw_parses_tone() {
        let record = GkgRecord::from_raw(&sample_raw());
        assert_eq!(record.tone.unwrap().tone, -2.5);
    }

    #[test]
    fn from_raw_parses_record_id_and_source() {
        let record = GkgRecord::from_raw(&sample_raw());
        assert_eq!(record.gkg_record_id, "20240115120000-1");
        assert_eq!(record.source_common_name, "bbc.com");
    }
}
