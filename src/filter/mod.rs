//! Filter value objects and their validation (component G, §3.1, §4.4).

pub mod predicates;
pub mod resolver;

use chrono::NaiveDate;

use crate::dataset::Dataset;
use crate::error::GdeltError;

/// `{start, end?}`, end inclusive, from §3.1. `end` defaults to `start` when
/// absent (a single-day query).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn single_day(date: NaiveDate) -> Self {
        DateRange {
            start: date,
            end: Some(date),
        }
    }

    pub fn end_or_start(&self) -> NaiveDate {
        self.end.unwrap_or(self.start)
    }

    /// Validates `end >= start` and `span <= dataset.max_span_days()`
    /// (§4.4).
    pub fn validate(&self, dataset: Dataset) -> Result<(), GdeltError> {
        let end = self.end_or_start();
        if end < self.start {
            return Err(GdeltError::Validation(
                "date range end precedes start".to_string(),
            ));
        }
        let span = (end - self.start).num_days();
        if span > dataset.max_span_days() {
            return Err(GdeltError::Validation(format!(
                "date range spans {} days, exceeding the {}-day cap for {:?}",
                span,
                dataset.max_span_days(),
                dataset
            )));
        }
        Ok(())
    }
}

/// FIPS/ISO3 country code, normalized to FIPS at construction (§3.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCode(String);

impl CountryCode {
    /// Accepts either FIPS or ISO3 input and stores the FIPS form. Only a
    /// small, illustrative mapping is carried in-crate; lookup tables proper
    /// are explicitly out of scope (§1's Non-goals).
    pub fn normalize(input: &str) -> Self {
        let upper = input.trim().to_uppercase();
        let fips = iso3_to_fips(&upper).unwrap_or(upper);
        CountryCode(fips)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn iso3_to_fips(code: &str) -> Option<String> {
    let mapped = match code {
        "USA" => "US",
        "GBR" => "UK",
        "FRA" => "FR",
        "DEU" => "GM",
        "CHN" => "CH",
        "RUS" => "RS",
        "JPN" => "JA",
        _ => return None,
    };
    Some(mapped.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub date_range: Option<DateRange>,
    pub actor1_country: Option<CountryCode>,
    pub actor2_country: Option<CountryCode>,
    pub event_code: Option<String>,
    pub min_tone: Option<f64>,
    pub max_tone: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct MentionFilter {
    pub date_range: Option<DateRange>,
    pub source_name: Option<String>,
    pub min_confidence: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct GkgFilter {
    pub date_range: Option<DateRange>,
    pub themes: Vec<String>,
    pub theme_prefix: Option<String>,
    pub persons: Vec<String>,
    pub organizations: Vec<String>,
    pub actor1_country: Option<CountryCode>,
    pub location_country: Option<CountryCode>,
    pub min_tone: Option<f64>,
    pub max_tone: Option<f64>,
    pub include_translated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NGramsFilter {
    pub date_range: Option<DateRange>,
    pub ngram: Option<String>,
    pub language: Option<String>,
    pub min_position: Option<u8>,
    pub max_position: Option<u8>,
}

/// Common surface every per-dataset filter exposes to the resolver and the
/// fetcher orchestrator.
pub trait Filter {
    fn dataset(&self) -> Dataset;
    fn date_range(&self) -> Result<DateRange, GdeltError>;

    fn validate(&self) -> Result<(), GdeltError> {
        self.date_range()?.validate(self.dataset())
    }
}

impl Filter for EventFilter {
    fn dataset(&self) -> Dataset {
        Dataset::Events
    }
    fn date_range(&self) -> Result<DateRange, GdeltError> {
        self.date_range
            .ok_or_else(|| GdeltError::Validation("date_range is required".to_string()))
    }
}

impl Filter for MentionFilter {
    fn dataset(&self) -> Dataset {
        Dataset::Mentions
    }
    fn date_range(&self) -> Result<DateRange, GdeltError> {
        self.date_range
            .ok_or_else(|| GdeltError::Validation("date_range is required".to_string()))
    }
}

impl Filter for GkgFilter {
    fn dataset(&self) -> Dataset {
        Dataset::Gkg
    }
    fn date_range(&self) -> Result<DateRange, GdeltError> {
        self.date_range
            .ok_or_else(|| GdeltError::Validation("date_range is required".to_string()))
    }
}

impl Filter for NGramsFilter {
    fn dataset(&self) -> Dataset {
        Dataset::NGrams
    }
    fn date_range(&self) -> Result<DateRange, GdeltError> {
        self.date_range
            .ok_or_else(|| GdeltError::Validation("date_range is required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn country_code_normalizes_iso3_to_fips() {
        assert_eq!(CountryCode::normalize("USA").as_str(), "US");
        assert_eq!(CountryCode::normalize("us").as_str(), "US");
    }

    #[test]
    fn date_range_within_cap_validates() {
        let range = DateRange::single_day(date(2024, 1, 15));
        assert!(range.validate(Dataset::Gkg).is_ok());
    }

    #[test]
    fn date_range_exceeding_cap_is_rejected() {
        let range = DateRange {
            start: date(2024, 1, 1),
            end: Some(date(2024, 1, 9)),
        };
        assert!(matches!(
            range.validate(Dataset::NGrams),
            Err(GdeltError::Validation(_))
        ));
    }

    #[test]
    fn date_range_with_end_before_start_is_rejected() {
        let range = DateRange {
            start: date(2024, 1, 15),
            end: Some(date(2024, 1, 1)),
        };
        assert!(range.validate(Dataset::Gkg).is_err());
    }

    #[test]
    fn event_filter_without_date_range_fails_validation() {
        let filter = EventFilter::default();
        assert!(filter.validate().is_err());
    }

    #[test]
    fn gkg_filter_dataset_is_gkg() {
        let filter = GkgFilter::default();
        assert_eq!(filter.dataset(), Dataset::Gkg);
    }
}
