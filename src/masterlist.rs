//! Master file list cache and temporal resolver (component D, §4.1).

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use tracing::warn;
use url::Url;

use crate::dataset::Dataset;
use crate::error::GdeltError;
use crate::filter::DateRange;
use crate::transport::Transport;

const ENGLISH_MASTERLIST_URL: &str = "http://data.gdeltproject.org/gdeltv2/masterfilelist.txt";
const TRANSLATED_MASTERLIST_URL: &str =
    "http://data.gdeltproject.org/gdeltv2/masterfilelist-translation.txt";

/// Hosts and path prefixes every yielded URL must match, per §4.1's
/// "Security" paragraph and the REDESIGN FLAGS decision to check host +
/// scheme + path prefix together.
const ALLOWED_HOST: &str = "data.gdeltproject.org";
const ALLOWED_PATH_PREFIX: &str = "/gdeltv2/";

/// Fraction of malformed inventory lines above which `resolve` fails
/// outright rather than skipping bad lines (§4.1's "Failure semantics").
const MAX_BAD_LINE_FRACTION: f64 = 0.05;

/// `{url, dataset, bucket_timestamp, size?, checksum?}` from §3.1.
#[derive(Debug, Clone)]
pub struct MasterFileEntry {
    pub url: String,
    pub dataset: Dataset,
    pub bucket_timestamp: NaiveDateTime,
    pub size: Option<u64>,
    pub checksum: Option<String>,
}

struct Index {
    entries: HashMap<(Dataset, NaiveDateTime), MasterFileEntry>,
    fetched_at: Instant,
}

/// Process-wide, TTL-refreshed inventory index (§3.3: "process-wide
/// lifetime; refreshed lazily once its cached entry exceeds its TTL").
pub struct MasterFileList {
    ttl: Duration,
    bucket_pattern: Regex,
    english: RwLock<Option<Index>>,
    translated: RwLock<Option<Index>>,
}

impl MasterFileList {
    pub fn new(ttl: Duration) -> Self {
        MasterFileList {
            ttl,
            bucket_pattern: Regex::new(r"(\d{14})\.").expect("valid regex literal"),
            english: RwLock::new(None),
            translated: RwLock::new(None),
        }
    }

    /// `resolve(dataset, date_range) -> ordered sequence of URLs` (§4.1).
    pub async fn resolve(
        &self,
        transport: &Transport,
        dataset: Dataset,
        range: &DateRange,
        include_translated: bool,
    ) -> Result<Vec<String>, GdeltError> {
        self.ensure_fresh(transport, &self.english, ENGLISH_MASTERLIST_URL)
            .await?;
        if include_translated {
            self.ensure_fresh(transport, &self.translated, TRANSLATED_MASTERLIST_URL)
                .await?;
        }

        let buckets = expand_buckets(range);
        let mut urls = Vec::new();

        {
            let guard = self.english.read().expect("lock not poisoned");
            let index = guard.as_ref().expect("just ensured fresh");
            for bucket in &buckets {
                if let Some(entry) = index.entries.get(&(dataset, *bucket)) {
                    urls.push(entry.url.clone());
                }
            }
        }

        if include_translated {
            let guard = self.translated.read().expect("lock not poisoned");
            if let Some(index) = guard.as_ref() {
                for bucket in &buckets {
                    if let Some(entry) = index.entries.get(&(dataset, *bucket)) {
                        urls.push(entry.url.clone());
                    }
                }
            }
        }

        urls.sort();
        urls.dedup();
        Ok(urls)
    }

    async fn ensure_fresh(
        &self,
        transport: &Transport,
        slot: &RwLock<Option<Index>>,
        url: &str,
    ) -> Result<(), GdeltError> {
        let needs_refresh = {
            let guard = slot.read().expect("lock not poisoned");
            match guard.as_ref() {
                Some(index) => index.fetched_at.elapsed() >= self.ttl,
                None => true,
            }
        };
        if !needs_refresh {
            return Ok(());
        }

        match transport.get_text(url).await {
            Ok(text) => {
                let entries = self.parse_inventory(&text)?;
                let mut guard = slot.write().expect("lock not poisoned");
                *guard = Some(Index {
                    entries,
                    fetched_at: Instant::now(),
                });
                Ok(())
            }
            Err(err) => {
                let guard = slot.read().expect("lock not poisoned");
                if guard.is_some() {
                    warn!(url, error = %err, "master file list refresh failed, serving stale index");
                    Ok(())
                } else {
                    Err(GdeltError::Unavailable(format!(
                        "master file list unreachable: {err}"
                    )))
                }
            }
        }
    }

    fn parse_inventory(
        &self,
        text: &str,
    ) -> Result<HashMap<(Dataset, NaiveDateTime), MasterFileEntry>, GdeltError> {
        let mut entries = HashMap::new();
        let mut total = 0usize;
        let mut bad = 0usize;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            total += 1;
            match self.parse_inventory_line(line) {
                Some(entry) => {
                    if validate_url(&entry.url).is_ok() {
                        entries.insert((entry.dataset, entry.bucket_timestamp), entry);
                    } else {
                        warn!(url = entry.url, "inventory URL failed whitelist check, dropping");
                    }
                }
                None => {
                    bad += 1;
                    warn!(line, "unparseable master file list line, skipping");
                }
            }
        }

        if total > 0 && (bad as f64 / total as f64) > MAX_BAD_LINE_FRACTION {
            return Err(GdeltError::Unavailable(format!(
                "too many malformed master file list lines: {bad}/{total}"
            )));
        }

        Ok(entries)
    }

    fn parse_inventory_line(&self, line: &str) -> Option<MasterFileEntry> {
        let mut parts = line.split_whitespace();
        let size = parts.next()?.parse::<u64>().ok();
        let checksum = parts.next().map(|s| s.to_string());
        let url = parts.next()?.to_string();

        let filename = url.rsplit('/').next()?;
        let captures = self.bucket_pattern.captures(filename)?;
        let stamp = captures.get(1)?.as_str();
        let bucket_timestamp = NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S").ok()?;

        let dataset = dataset_from_filename(filename)?;

        Some(MasterFileEntry {
            url,
            dataset,
            bucket_timestamp,
            size,
            checksum,
        })
    }
}

fn dataset_from_filename(filename: &str) -> Option<Dataset> {
    if filename.ends_with(".export.CSV.zip") {
        Some(Dataset::Events)
    } else if filename.ends_with(".mentions.CSV.zip") {
        Some(Dataset::Mentions)
    } else if filename.ends_with(".gkg.csv.zip") {
        Some(Dataset::Gkg)
    } else if filename.ends_with(".webngrams.json.gz") {
        Some(Dataset::NGrams)
    } else {
        None
    }
}

/// Host + scheme + path-prefix whitelist check (§4.1, REDESIGN FLAGS #2).
fn validate_url(raw: &str) -> Result<(), GdeltError> {
    let parsed = Url::parse(raw).map_err(|e| GdeltError::Security(e.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(GdeltError::Security(format!(
            "unexpected scheme: {}",
            parsed.scheme()
        )));
    }
    if parsed.host_str() != Some(ALLOWED_HOST) {
        return Err(GdeltError::Security(format!(
            "unexpected host: {:?}",
            parsed.host_str()
        )));
    }
    if !parsed.path().starts_with(ALLOWED_PATH_PREFIX) {
        return Err(GdeltError::Security(format!(
            "unexpected path: {}",
            parsed.path()
        )));
    }
    Ok(())
}

/// Expands a date range into the set of 15-minute buckets within it
/// (§4.1's "Algorithm" and "Tie-breaks & edge cases").
fn expand_buckets(range: &DateRange) -> Vec<NaiveDateTime> {
    let start = start_of_day(range.start);
    let end = end_of_day(range.end.unwrap_or(range.start));
    let mut buckets = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        buckets.push(cursor);
        cursor += chrono::Duration::minutes(15);
    }
    buckets
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).expect("valid time")
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 45, 0).expect("valid time")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_day_expands_to_96_buckets() {
        let range = DateRange {
            start: date(2024, 1, 15),
            end: Some(date(2024, 1, 15)),
        };
        let buckets = expand_buckets(&range);
        assert_eq!(buckets.len(), 96);
        assert_eq!(buckets[0].hour(), 0);
        assert_eq!(buckets[0].minute(), 0);
        assert_eq!(buckets.last().unwrap().hour(), 23);
        assert_eq!(buckets.last().unwrap().minute(), 45);
    }

    #[test]
    fn multi_day_range_expands_minute_by_minute() {
        let range = DateRange {
            start: date(2024, 1, 1),
            end: Some(date(2024, 1, 2)),
        };
        let buckets = expand_buckets(&range);
        assert_eq!(buckets.len(), 192);
    }

    #[test]
    fn validate_url_accepts_expected_host_and_path() {
        assert!(validate_url(
            "http://data.gdeltproject.org/gdeltv2/20240115120000.export.CSV.zip"
        )
        .is_ok());
    }

    #[test]
    fn validate_url_rejects_unexpected_host() {
        assert!(validate_url("http://evil.example.com/gdeltv2/x.zip").is_err());
    }

    #[test]
    fn validate_url_rejects_unexpected_path() {
        assert!(validate_url("http://data.gdeltproject.org/other/x.zip").is_err());
    }

    #[test]
    fn dataset_from_filename_recognizes_all_four() {
        assert_eq!(
            dataset_from_filename("20240115120000.export.CSV.zip"),
            Some(Dataset::Events)
        );
        assert_eq!(
            dataset_from_filename("20240115120000.mentions.CSV.zip"),
            Some(Dataset::Mentions)
        );
        assert_eq!(
            dataset_from_filename("20240115120000.gkg.csv.zip"),
            Some(Dataset::Gkg)
        );
        assert_eq!(
            dataset_from_filename("20240115120000.webngrams.json.gz"),
            Some(Dataset::NGrams)
        );
        assert_eq!(dataset_from_filename("20240115120000.graph.zip"), None);
    }

    #[test]
    fn parse_inventory_line_extracts_size_checksum_url_and_bucket() {
        let list = MasterFileList::new(Duration::from_secs(300));
        let entry = list
            .parse_inventory_line(
                "1234 deadbeef http://data.gdeltproject.org/gdeltv2/20240115120000.gkg.csv.zip",
            )
            .unwrap();
        assert_eq!(entry.size, Some(1234));
        assert_eq!(entry.checksum.as_deref(), Some("deadbeef"));
        assert_eq!(entry.dataset, Dataset::Gkg);
        assert_eq!(entry.bucket_timestamp.year(), 2024);
        assert_eq!(entry.bucket_timestamp.hour(), 12);
    }

    #[test]
    fn parse_inventory_line_rejects_malformed_line() {
        let list = MasterFileList::new(Duration::from_secs(300));
        assert!(list.parse_inventory_line("garbage").is_none());
    }

    #[test]
    fn parse_inventory_skips_bad_lines_under_threshold() {
        let list = MasterFileList::new(Duration::from_secs(300));
        let text = "1234 deadbeef http://data.gdeltproject.org/gdeltv2/20240115120000.gkg.csv.zip\n\
                    garbage-line-that-does-not-parse\n";
        let entries = list.parse_inventory(text).unwrap();
        assert_eq!(entries.len(), 1);
    }
}
