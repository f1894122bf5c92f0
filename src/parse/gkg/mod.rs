//! GKG v2.1 raw-line tokenizing and compound-field parsing (ported and
//! expanded from the teacher's `parse::mod` + `parse::{counts,themes,...}`).

use crate::error::GdeltError;
use crate::model::gkg::types::{
    AmountEntry, CountV1, CountV21, EnhancedDate, EnhancedEntity, EnhancedLocation, EnhancedTheme,
    GcamEntry, LocationV1, NameEntry, TranslationInfo,
};
use crate::model::gkg::quotation::Quotation;
use crate::model::gkg::tone::Tone;
use crate::model::raw::RawGkg;
use crate::parse::delimiters::{hash_field, non_empty, parse_f64, parse_i32, parse_i64, split_blocks, split_semicolon_list};

const EXPECTED_COLUMNS: usize = 27;

/// Tab-splits a GKG line into the 27 on-disk fields, tolerating extra
/// trailing columns (kept as `extras`) and missing trailing columns
/// (defaulted to empty strings), per §4.3's schema-tolerance rule.
pub fn parse_raw_line(line: &str, line_number: usize) -> Result<RawGkg, GdeltError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 5 {
        return Err(GdeltError::Parse {
            line: line_number,
            message: format!("expected at least 5 tab-delimited fields, got {}", fields.len()),
        });
    }

    let get = |i: usize| fields.get(i).copied().unwrap_or("").to_string();

    Ok(RawGkg {
        gkg_record_id: get(0),
        date: get(1),
        source_collection_id: get(2),
        source_common_name: get(3),
        document_identifier: get(4),
        v1_counts: get(5),
        v21_counts: get(6),
        v1_themes: get(7),
        v2_enhanced_themes: get(8),
        v1_locations: get(9),
        v2_enhanced_locations: get(10),
        v1_persons: get(11),
        v2_enhanced_persons: get(12),
        v1_organizations: get(13),
        v2_enhanced_organizations: get(14),
        tone: get(15),
        v21_enhanced_dates: get(16),
        gcam: get(17),
        sharing_image: get(18),
        related_images: get(19),
        social_image_embeds: get(20),
        social_video_embeds: get(21),
        quotations: get(22),
        all_names: get(23),
        amounts: get(24),
        translation_info: get(25),
        extras_xml: get(26),
        extras: if fields.len() > EXPECTED_COLUMNS {
            fields[EXPECTED_COLUMNS..].iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        },
    })
}

pub fn parse_semicolon_string_list(field: &str) -> Vec<String> {
    split_semicolon_list(field).into_iter().map(str::to_string).collect()
}

pub fn parse_counts_v1(field: &str) -> Vec<CountV1> {
    split_semicolon_list(field)
        .into_iter()
        .filter_map(parse_count_v1_block)
        .collect()
}

fn parse_count_v1_block(block: &str) -> Option<CountV1> {
    let parts = split_blocks(block);
    Some(CountV1 {
        count_type: hash_field(&parts, 0)?.to_string(),
        count: hash_field(&parts, 1).map(parse_i64).unwrap_or(0),
        object_type: hash_field(&parts, 2).unwrap_or_default().to_string(),
        location_type: hash_field(&parts, 3).map(parse_i32).unwrap_or(0),
        location_name: hash_field(&parts, 4).unwrap_or_default().to_string(),
        location_country_code: hash_field(&parts, 5).unwrap_or_default().to_string(),
        location_adm1_code: hash_field(&parts, 6).unwrap_or_default().to_string(),
        location_lat: hash_field(&parts, 7).map(parse_f64).unwrap_or(0.0),
        location_long: hash_field(&parts, 8).map(parse_f64).unwrap_or(0.0),
        location_feature_id: hash_field(&parts, 9).unwrap_or_default().to_string(),
    })
}

pub fn parse_counts_v21(field: &str) -> Vec<CountV21> {
    split_semicolon_list(field)
        .into_iter()
        .filter_map(|block| {
            let base = parse_count_v1_block(block)?;
            let parts = split_blocks(block);
            Some(CountV21 {
                base,
                location_adm2_code: hash_field(&parts, 10).unwrap_or_default().to_string(),
                char_offset: hash_field(&parts, 11).map(parse_i32).unwrap_or(-1),
            })
        })
        .collect()
}

pub fn parse_themes_v2(field: &str) -> Vec<EnhancedTheme> {
    split_semicolon_list(field)
        .into_iter()
        .filter_map(|entry| {
            let mut parts = entry.splitn(2, ',');
            let theme = non_empty(parts.next()?)?.to_string();
            let char_offset = parts.next().map(parse_i32).unwrap_or(-1);
            Some(EnhancedTheme { theme, char_offset })
        })
        .collect()
}

pub fn parse_locations_v1(field: &str) -> Vec<LocationV1> {
    split_semicolon_list(field)
        .into_iter()
        .filter_map(|block| {
            let parts = split_blocks(block);
            Some(LocationV1 {
                location_type: hash_field(&parts, 0).map(parse_i32).unwrap_or(0),
                location_name: hash_field(&parts, 1).unwrap_or_default().to_string(),
                country_code: hash_field(&parts, 2).unwrap_or_default().to_string(),
                adm1_code: hash_field(&parts, 3).unwrap_or_default().to_string(),
                lat: hash_field(&parts, 4).map(parse_f64).unwrap_or(0.0),
                lon: hash_field(&parts, 5).map(parse_f64).unwrap_or(0.0),
                feature_id: hash_field(&parts, 6).unwrap_or_default().to_string(),
            })
        })
        .collect()
}

pub fn parse_locations_v2(field: &str) -> Vec<EnhancedLocation> {
    split_semicolon_list(field)
        .into_iter()
        .filter_map(|block| {
            let parts = split_blocks(block);
            Some(EnhancedLocation {
                location_type: hash_field(&parts, 0).map(parse_i32).unwrap_or(0),
                location_name: hash_field(&parts, 1).unwrap_or_default().to_string(),
                country_code: hash_field(&parts, 2).unwrap_or_default().to_string(),
                adm1_code: hash_field(&parts, 3).unwrap_or_default().to_string(),
                adm2_code: hash_field(&parts, 4).unwrap_or_default().to_string(),
                lat: hash_field(&parts, 5).map(parse_f64).unwrap_or(0.0),
                lon: hash_field(&parts, 6).map(parse_f64).unwrap_or(0.0),
                feature_id: hash_field(&parts, 7).unwrap_or_default().to_string(),
                char_offset: hash_field(&parts, 8).map(parse_i32).unwrap_or(-1),
            })
        })
        .collect()
}

pub fn parse_entities_v2(field: &str) -> Vec<EnhancedEntity> {
    split_semicolon_list(field)
        .into_iter()
        .filter_map(|entry| {
            let mut parts = entry.splitn(2, ',');
            let name = non_empty(parts.next()?)?.to_string();
            let char_offset = parts.next().map(parse_i32).unwrap_or(-1);
            Some(EnhancedEntity { name, char_offset })
        })
        .collect()
}

pub fn parse_tone(field: &str) -> Option<Tone> {
    let parts: Vec<&str> = field.split(',').collect();
    if parts.first().is_none_or(|s| s.trim().is_empty()) {
        return None;
    }
    Some(Tone {
        tone: parts.first().map(|s| parse_f64(s)).unwrap_or(0.0),
        positive_score: parts.get(1).map(|s| parse_f64(s)).unwrap_or(0.0),
        negative_score: parts.get(2).map(|s| parse_f64(s)).unwrap_or(0.0),
        polarity: parts.get(3).map(|s| parse_f64(s)).unwrap_or(0.0),
        activity_ref_density: parts.get(4).map(|s| parse_f64(s)).unwrap_or(0.0),
        self_group_ref_density: parts.get(5).map(|s| parse_f64(s)).unwrap_or(0.0),
        word_count: parts.get(6).map(|s| parse_i64(s)).unwrap_or(0),
    })
}

pub fn parse_enhanced_dates(field: &str) -> Vec<EnhancedDate> {
    split_semicolon_list(field)
        .into_iter()
        .filter_map(|block| {
            let parts = split_blocks(block);
            Some(EnhancedDate {
                date_resolution: hash_field(&parts, 0).map(parse_i32).unwrap_or(0),
                month: hash_field(&parts, 1).map(parse_i32).unwrap_or(0),
                day: hash_field(&parts, 2).map(parse_i32).unwrap_or(0),
                year: hash_field(&parts, 3).map(parse_i32).unwrap_or(0),
                char_offset: hash_field(&parts, 4).map(parse_i32).unwrap_or(-1),
            })
        })
        .collect()
}

pub fn parse_gcam(field: &str) -> Vec<GcamEntry> {
    field
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.splitn(2, ':');
            let dimension = non_empty(parts.next()?)?.to_string();
            let value = parts.next().map(parse_f64).unwrap_or(0.0);
            Some(GcamEntry { dimension, value })
        })
        .collect()
}

pub fn parse_quotations(field: &str) -> Vec<Quotation> {
    field
        .split('#')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|block| {
            let parts: Vec<&str> = block.split('|').collect();
            Some(Quotation {
                offset: parts.first().map(|s| parse_i32(s)).unwrap_or(-1),
                length: parts.get(1).map(|s| parse_i32(s)).unwrap_or(0),
                verb: parts.get(2).unwrap_or(&"").to_string(),
                text: parts.get(3).unwrap_or(&"").to_string(),
            })
        })
        .collect()
}

pub fn parse_names(field: &str) -> Vec<NameEntry> {
    split_semicolon_list(field)
        .into_iter()
        .filter_map(|entry| {
            let mut parts = entry.splitn(2, ',');
            let name = non_empty(parts.next()?)?.to_string();
            let char_offset = parts.next().map(parse_i32).unwrap_or(-1);
            Some(NameEntry { name, char_offset })
        })
        .collect()
}

pub fn parse_amounts(field: &str) -> Vec<AmountEntry> {
    split_semicolon_list(field)
        .into_iter()
        .filter_map(|entry| {
            let parts: Vec<&str> = entry.splitn(3, ',').collect();
            Some(AmountEntry {
                amount: parts.first().map(|s| parse_f64(s)).unwrap_or(0.0),
                object: parts.get(1).unwrap_or(&"").to_string(),
                char_offset: parts.get(2).map(|s| parse_i32(s)).unwrap_or(-1),
            })
        })
        .collect()
}

pub fn parse_translation(field: &str) -> Option<TranslationInfo> {
    if field.trim().is_empty() {
        return None;
    }
    let mut source_language = String::new();
    let mut engine = String::new();
    for entry in field.split(';') {
        let mut parts = entry.splitn(2, ':');
        match (parts.next(), parts.next()) {
            (Some("srclc"), Some(v)) => source_language = v.to_string(),
            (Some("eng"), Some(v)) => engine = v.to_string(),
            _ => {}
        }
    }
    if source_language.is_empty() && engine.is_empty() {
        None
    } else {
        Some(TranslationInfo {
            source_language,
            engine,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line() -> String {
        let fields: Vec<String> = (0..27).map(|i| format!("f{i}")).collect();
        fields.join("\t")
    }

    #[test]
    fn parse_raw_line_maps_all_27_fields_in_order() {
        let raw = parse_raw_line(&sample_line(), 1).unwrap();
        assert_eq!(raw.gkg_record_id, "f0");
        assert_eq!(raw.extras_xml, "f26");
        assert!(raw.extras.is_empty());
    }

    #[test]
    fn parse_raw_line_preserves_extra_trailing_columns() {
        let line = format!("{}\tbonus1\tbonus2", sample_line());
        let raw = parse_raw_line(&line, 1).unwrap();
        assert_eq!(raw.extras, vec!["bonus1", "bonus2"]);
    }

    #[test]
    fn parse_raw_line_rejects_too_few_fields() {
        assert!(parse_raw_line("a\tb", 1).is_err());
    }

    #[test]
    fn parse_counts_v1_reads_hash_delimited_block() {
        let field = "PROTEST#5#person#1#Washington#US#USDC#38.9#-77.0#feat1";
        let counts = parse_counts_v1(field);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].count_type, "PROTEST");
        assert_eq!(counts[0].count, 5);
    }

    #[test]
    fn parse_themes_v2_splits_theme_and_offset() {
        let field = "TAX_POLICY,120;CLIMATE_CHANGE,340";
        let themes = parse_themes_v2(field);
        assert_eq!(themes.len(), 2);
        assert_eq!(themes[0].theme, "TAX_POLICY");
        assert_eq!(themes[0].char_offset, 120);
    }

    #[test]
    fn parse_tone_reads_seven_comma_fields() {
        let tone = parse_tone("-2.5,1.1,3.6,4.7,0.5,0.2,350").unwrap();
        assert_eq!(tone.tone, -2.5);
        assert_eq!(tone.word_count, 350);
    }

    #[test]
    fn parse_tone_empty_field_is_none() {
        assert!(parse_tone("").is_none());
    }

    #[test]
    fn parse_gcam_splits_dimension_value_pairs() {
        let entries = parse_gcam("wc:350,c1.1:42,v1.1:0.5");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].dimension, "wc");
        assert_eq!(entries[0].value, 350.0);
    }

    #[test]
    fn parse_quotations_reads_pipe_delimited_blocks() {
        let field = "10|42|said|This is a quote#60|20|according to|Another quote";
        let quotes = parse_quotations(field);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].offset, 10);
        assert_eq!(quotes[0].verb, "said");
        assert_eq!(quotes[0].text, "This is a quote");
    }

    #[test]
    fn parse_translation_reads_srclc_and_engine() {
        let info = parse_translation("srclc:fra;eng:GT").unwrap();
        assert_eq!(info.source_language, "fra");
        assert_eq!(info.engine, "GT");
    }

    #[test]
    fn parse_translation_empty_field_is_none() {
        assert!(parse_translation("").is_none());
    }

    #[test]
    fn parse_amounts_reads_amount_object_offset() {
        let entries = parse_amounts("500000,dollars,88;12,people,140");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].amount, 500000.0);
        assert_eq!(entries[0].object, "dollars");
        assert_eq!(entries[1].char_offset, 140);
    }
}
