//! Typed `Event` record and its raw→public conversion (§4.8, §3.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::CountryCode;
use crate::model::common::{Actor, Location};
use crate::model::raw::RawEvent;
use crate::parse::dates;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub global_event_id: String,
    pub event_date: Option<DateTime<Utc>>,
    pub date_added: Option<DateTime<Utc>>,
    pub actor1: Actor,
    pub actor2: Actor,
    pub action_location: Location,
    pub event_code: String,
    pub event_base_code: String,
    pub event_root_code: String,
    pub quad_class: i32,
    pub is_root_event: bool,
    pub goldstein_scale: f64,
    pub num_mentions: i32,
    pub num_sources: i32,
    pub num_articles: i32,
    pub avg_tone: f64,
    pub source_url: String,
}

impl Event {
    /// Conversion is total (§4.8): invalid numeric fields default rather
    /// than failing the whole record.
    pub fn from_raw(raw: &RawEvent) -> Self {
        Event {
            global_event_id: raw.global_event_id.clone(),
            event_date: dates::parse_lenient(&raw.day),
            date_added: dates::parse_lenient(&raw.date_added),
            actor1: actor_from_raw(
                &raw.actor1_code,
                &raw.actor1_name,
                &raw.actor1_country_code,
                &raw.actor1_known_group_code,
                &raw.actor1_ethnic_code,
                &raw.actor1_religion1_code,
                &raw.actor1_religion2_code,
                &raw.actor1_type1_code,
                &raw.actor1_type2_code,
                &raw.actor1_type3_code,
            ),
            actor2: actor_from_raw(
                &raw.actor2_code,
                &raw.actor2_name,
                &raw.actor2_country_code,
                &raw.actor2_known_group_code,
                &raw.actor2_ethnic_code,
                &raw.actor2_religion1_code,
                &raw.actor2_religion2_code,
                &raw.actor2_type1_code,
                &raw.actor2_type2_code,
                &raw.actor2_type3_code,
            ),
            action_location: Location {
                location_type: raw.action_geo_type.trim().parse().unwrap_or(0),
                name: non_empty(&raw.action_geo_full_name),
                country_code: non_empty(&raw.action_geo_country_code),
                admin1_code: non_empty(&raw.action_geo_adm1_code),
                admin2_code: non_empty(&raw.action_geo_adm2_code),
                lat: raw.action_geo_lat.trim().parse().ok(),
                lon: raw.action_geo_long.trim().parse().ok(),
                feature_id: non_empty(&raw.action_geo_feature_id),
            },
            event_code: raw.event_code.clone(),
            event_base_code: raw.event_base_code.clone(),
            event_root_code: raw.event_root_code.clone(),
            quad_class: raw.quad_class.trim().parse().unwrap_or(0),
            is_root_event: raw.is_root_event.trim() == "1",
            goldstein_scale: raw.goldstein_scale.trim().parse().unwrap_or(0.0),
            num_mentions: raw.num_mentions.trim().parse().unwrap_or(0),
            num_sources: raw.num_sources.trim().parse().unwrap_or(0),
            num_articles: raw.num_articles.trim().parse().unwrap_or(0),
            avg_tone: raw.avg_tone.trim().parse().unwrap_or(0.0),
            source_url: raw.source_url.clone(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn actor_from_raw(
    code: &str,
    name: &str,
    country_code: &str,
    group: &str,
    ethnic: &str,
    religion1: &str,
    religion2: &str,
    type1: &str,
    type2: &str,
    type3: &str,
) -> Actor {
    Actor {
        code: non_empty(code),
        name: non_empty(name),
        country_code: non_empty(country_code).map(|c| CountryCode::normalize(c).as_str().to_string()),
        group: non_empty(group),
        ethnic: non_empty(ethnic),
        religion1: non_empty(religion1),
        religion2: non_empty(religion2),
        type1: non_empty(type1),
        type2: non_empty(type2),
        type3: non_empty(type3),
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

    #[test]
    fn from_raw_normalizes_actor_country_code_to_fips() {
        let mut raw = RawEvent::default();
        raw.actor1_country_code = "USA".to_string();
        raw.global_event_id = "123".to_string();
        let event = Event::from_raw(&raw);
        assert_eq!(event.actor1.country_code.as_deref(), Some("US"));
    }

    #[test]
    fn from_raw_defaults_invalid_numeric_fields() {
        let mut raw = RawEvent::default();
        raw.goldstein_scale = "not-a-number".to_string();
        raw.quad_class = "".to_string();
        let event = Event::from_raw(&raw);
        assert_eq!(event.goldstein_scale, 0.0);
        assert_eq!(event.quad_class, 0);
    }

    #[test]
    fn from_raw_preserves_source_url_and_event_codes() {
        let mut raw = RawEvent::default();
        raw.source_url = "http://example.com/a".to_string();
        raw.event_code = "042".to_string();
        let event = Event::from_raw(&raw);
        assert_eq!(event.source_url, "http://example.com/a");
        assert_eq!(event.event_code, "042");
    }
}
