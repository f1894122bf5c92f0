//! Events v2 raw-line tokenizing (61 tab-delimited columns, §6).

use crate::error::GdeltError;
use crate::model::raw::RawEvent;

const EXPECTED_COLUMNS: usize = 61;

pub fn parse_raw_line(line: &str, line_number: usize) -> Result<RawEvent, GdeltError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 10 {
        return Err(GdeltError::Parse {
            line: line_number,
            message: format!("expected at least 10 tab-delimited fields, got {}", fields.len()),
        });
    }
    let get = |i: usize| fields.get(i).copied().unwrap_or("").to_string();

    Ok(RawEvent {
        global_event_id: get(0),
        day: get(1),
        month_year: get(2),
        year: get(3),
        fraction_date: get(4),
        actor1_code: get(5),
        actor1_name: get(6),
        actor1_country_code: get(7),
        actor1_known_group_code: get(8),
        actor1_ethnic_code: get(9),
        actor1_religion1_code: get(10),
        actor1_religion2_code: get(11),
        actor1_type1_code: get(12),
        actor1_type2_code: get(13),
        actor1_type3_code: get(14),
        actor2_code: get(15),
        actor2_name: get(16),
        actor2_country_code: get(17),
        actor2_known_group_code: get(18),
        actor2_ethnic_code: get(19),
        actor2_religion1_code: get(20),
        actor2_religion2_code: get(21),
        actor2_type1_code: get(22),
        actor2_type2_code: get(23),
        actor2_type3_code: get(24),
        is_root_event: get(25),
        event_code: get(26),
        event_base_code: get(27),
        event_root_code: get(28),
        quad_class: get(29),
        goldstein_scale: get(30),
        num_mentions: get(31),
        num_sources: get(32),
        num_articles: get(33),
        avg_tone: get(34),
        actor1_geo_type: get(35),
        actor1_geo_full_name: get(36),
        actor1_geo_country_code: get(37),
        actor1_geo_adm1_code: get(38),
        actor1_geo_adm2_code: get(39),
        actor1_geo_lat: get(40),
        actor1_geo_long: get(41),
        actor1_geo_feature_id: get(42),
        actor2_geo_type: get(43),
        actor2_geo_full_name: get(44),
        actor2_geo_country_code: get(45),
        actor2_geo_adm1_code: get(46),
        actor2_geo_adm2_code: get(47),
        actor2_geo_lat: get(48),
        actor2_geo_long: get(49),
        actor2_geo_feature_id: get(50),
        action_geo_type: get(51),
        action_geo_full_name: get(52),
        action_geo_country_code: get(53),
        action_geo_adm1_code: get(54),
        action_geo_adm2_code: get(55),
        action_geo_lat: get(56),
        action_geo_long: get(57),
        action_geo_feature_id: get(58),
        date_added: get(59),
        source_url: get(60),
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
        let fields: Vec<String> = (0..61).map(|i| format!("f{i}")).collect();
        fields.join("\t")
    }

    #[test]
    fn parse_raw_line_maps_first_and_last_fields() {
        let raw = parse_raw_line(&sample_line(), 1).unwrap();
        assert_eq!(raw.global_event_id, "f0");
        assert_eq!(raw.source_url, "f60");
    }

    #[test]
    fn parse_raw_line_defaults_missing_trailing_columns() {
        let short_line = (0..15).map(|i| format!("f{i}")).collect::<Vec<_>>().join("\t");
        let raw = parse_raw_line(&short_line, 1).unwrap();
        assert_eq!(raw.global_event_id, "f0");
        assert_eq!(raw.source_url, "");
    }

    #[test]
    fn parse_raw_line_rejects_too_few_fields() {
        assert!(parse_raw_line("a\tb", 1).is_err());
    }
}
