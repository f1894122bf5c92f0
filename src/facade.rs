//! Per-dataset `query`/`stream` adapters over the fetcher orchestrator and
//! the dedup/conversion layer (component L, §4.9).

use std::sync::Arc;

use async_stream::try_stream;
use futures::stream::{BoxStream, StreamExt};

use crate::error::GdeltError;
use crate::fetch::{FetchOptions, FetchResult, Fetcher};
use crate::filter::predicates::{contains_any_ci, matches_exact_ci, theme_prefix_match, themes_intersect_ci, tone_in_range, position_in_range};
use crate::filter::{EventFilter, GkgFilter, MentionFilter, NGramsFilter};
use crate::model::dedup::{DedupStrategy, Deduplicator};
use crate::model::raw::{RawEvent, RawGkg};
use crate::model::{Event, GkgRecord, Mention, NGram};
use crate::parse::AnyRawRecord;
use crate::source::{RawItem, RawRecordStream};

/// Optional dedup strategy a façade applies over raw records before
/// conversion (§4.8); `None` disables deduplication.
pub type DedupOption = Option<DedupStrategy>;

pub type EventStream = BoxStream<'static, Result<Event, GdeltError>>;
pub type MentionStream = BoxStream<'static, Result<Mention, GdeltError>>;
pub type GkgStream = BoxStream<'static, Result<GkgRecord, GdeltError>>;
pub type NGramStream = BoxStream<'static, Result<NGram, GdeltError>>;

pub struct EventsEndpoint {
    fetcher: Arc<Fetcher<EventFilter>>,
}

impl EventsEndpoint {
    pub fn new(fetcher: Arc<Fetcher<EventFilter>>) -> Self {
        EventsEndpoint { fetcher }
    }

    pub async fn stream(
        &self,
        filter: EventFilter,
        opts: FetchOptions,
        dedup: DedupOption,
    ) -> Result<EventStream, GdeltError> {
        let raw_stream = self.fetcher.fetch(&filter, opts).await?;
        Ok(Box::pin(convert_stream(raw_stream, filter, dedup)))
    }

    /// Unlike `stream`, drives the raw stream itself so that `RawItem::Failed`
    /// entries recorded under `ErrorPolicy::Warn` land in `FetchResult.failed`
    /// instead of being silently dropped (§3.1 `complete` invariant, §7).
    pub async fn query(
        &self,
        filter: EventFilter,
        opts: FetchOptions,
        dedup: DedupOption,
    ) -> Result<FetchResult<Event>, GdeltError> {
        let raw_stream = self.fetcher.fetch(&filter, opts).await?;
        collect_events(raw_stream, filter, dedup).await
    }
}

fn convert_stream(
    mut raw_stream: RawRecordStream,
    filter: EventFilter,
    dedup: DedupOption,
) -> impl futures::Stream<Item = Result<Event, GdeltError>> {
    try_stream! {
        let mut dedup = dedup.map(Deduplicator::new);
        while let Some(item) = raw_stream.next().await {
            let RawItem::Record(record) = item? else { continue };
            let AnyRawRecord::Event(raw) = record else { continue };
            if !admits(&mut dedup, &raw) {
                continue;
            }
            let event = Event::from_raw(&raw);
            if event_passes(&event, &filter) {
                yield event;
            }
        }
    }
}

async fn collect_events(
    mut raw_stream: RawRecordStream,
    filter: EventFilter,
    dedup: DedupOption,
) -> Result<FetchResult<Event>, GdeltError> {
    let mut dedup = dedup.map(Deduplicator::new);
    let mut data = Vec::new();
    let mut failed = Vec::new();

    while let Some(item) = raw_stream.next().await {
        match item? {
            RawItem::Failed(f) => failed.push(f),
            RawItem::Record(AnyRawRecord::Event(raw)) => {
                if !admits(&mut dedup, &raw) {
                    continue;
                }
                let event = Event::from_raw(&raw);
                if event_passes(&event, &filter) {
                    data.push(event);
                }
            }
            RawItem::Record(_) => {}
        }
    }

    Ok(FetchResult { data, failed })
}

fn admits(dedup: &mut Option<Deduplicator>, raw: &RawEvent) -> bool {
    match dedup {
        Some(d) => d.admit(raw),
        None => true,
    }
}

fn event_passes(event: &Event, filter: &EventFilter) -> bool {
    if let Some(country) = &filter.actor1_country {
        if event.actor1.country_code.as_deref() != Some(country.as_str()) {
            return false;
        }
    }
    if let Some(country) = &filter.actor2_country {
        if event.actor2.country_code.as_deref() != Some(country.as_str()) {
            return false;
        }
    }
    if let Some(code) = &filter.event_code {
        if !matches_exact_ci(&event.event_code, code) {
            return false;
        }
    }
    tone_in_range(event.avg_tone, filter.min_tone, filter.max_tone)
}

pub struct MentionsEndpoint {
    fetcher: Arc<Fetcher<MentionFilter>>,
}

impl MentionsEndpoint {
    pub fn new(fetcher: Arc<Fetcher<MentionFilter>>) -> Self {
        MentionsEndpoint { fetcher }
    }

    pub async fn stream(
        &self,
        filter: MentionFilter,
        opts: FetchOptions,
    ) -> Result<MentionStream, GdeltError> {
        let mut raw_stream = self.fetcher.fetch(&filter, opts).await?;
        Ok(Box::pin(try_stream! {
            while let Some(item) = raw_stream.next().await {
                let RawItem::Record(record) = item? else { continue };
                let AnyRawRecord::Mention(raw) = record else { continue };
                let mention = Mention::from_raw(&raw);
                if mention_passes(&mention, &filter) {
                    yield mention;
                }
            }
        }))
    }

    pub async fn query(&self, filter: MentionFilter, opts: FetchOptions) -> Result<FetchResult<Mention>, GdeltError> {
        let raw_stream = self.fetcher.fetch(&filter, opts).await?;
        collect_mentions(raw_stream, filter).await
    }
}

async fn collect_mentions(
    mut raw_stream: RawRecordStream,
    filter: MentionFilter,
) -> Result<FetchResult<Mention>, GdeltError> {
    let mut data = Vec::new();
    let mut failed = Vec::new();

    while let Some(item) = raw_stream.next().await {
        match item? {
            RawItem::Failed(f) => failed.push(f),
            RawItem::Record(AnyRawRecord::Mention(raw)) => {
                let mention = Mention::from_raw(&raw);
                if mention_passes(&mention, &filter) {
                    data.push(mention);
                }
            }
            RawItem::Record(_) => {}
        }
    }

    Ok(FetchResult { data, failed })
}

fn mention_passes(mention: &Mention, filter: &MentionFilter) -> bool {
    if let Some(name) = &filter.source_name {
        if !crate::filter::predicates::contains_ci(&mention.mention_source_name, name) {
            return false;
        }
    }
    if let Some(min_confidence) = filter.min_confidence {
        if mention.confidence < min_confidence {
            return false;
        }
    }
    true
}

pub struct GkgEndpoint {
    fetcher: Arc<Fetcher<GkgFilter>>,
}

impl GkgEndpoint {
    pub fn new(fetcher: Arc<Fetcher<GkgFilter>>) -> Self {
        GkgEndpoint { fetcher }
    }

    pub async fn stream(
        &self,
        filter: GkgFilter,
        opts: FetchOptions,
        dedup: DedupOption,
    ) -> Result<GkgStream, GdeltError> {
        let mut raw_stream = self.fetcher.fetch(&filter, opts).await?;
        Ok(Box::pin(try_stream! {
            let mut dedup = dedup.map(Deduplicator::new);
            while let Some(item) = raw_stream.next().await {
                let RawItem::Record(record) = item? else { continue };
                let AnyRawRecord::Gkg(raw) = record else { continue };
                if !gkg_admits(&mut dedup, &raw) {
                    continue;
                }
                let record = GkgRecord::from_raw(&raw);
                if gkg_passes(&record, &filter) {
                    yield record;
                }
            }
        }))
    }

    pub async fn query(
        &self,
        filter: GkgFilter,
        opts: FetchOptions,
        dedup: DedupOption,
    ) -> Result<FetchResult<GkgRecord>, GdeltError> {
        let raw_stream = self.fetcher.fetch(&filter, opts).await?;
        collect_gkg(raw_stream, filter, dedup).await
    }
}

async fn collect_gkg(
    mut raw_stream: RawRecordStream,
    filter: GkgFilter,
    dedup: DedupOption,
) -> Result<FetchResult<GkgRecord>, GdeltError> {
    let mut dedup = dedup.map(Deduplicator::new);
    let mut data = Vec::new();
    let mut failed = Vec::new();

    while let Some(item) = raw_stream.next().await {
        match item? {
            RawItem::Failed(f) => failed.push(f),
            RawItem::Record(AnyRawRecord::Gkg(raw)) => {
                if !gkg_admits(&mut dedup, &raw) {
                    continue;
                }
                let record = GkgRecord::from_raw(&raw);
                if gkg_passes(&record, &filter) {
                    data.push(record);
                }
            }
            RawItem::Record(_) => {}
        }
    }

    Ok(FetchResult { data, failed })
}

fn gkg_admits(dedup: &mut Option<Deduplicator>, raw: &RawGkg) -> bool {
    match dedup {
        Some(d) => d.admit(raw),
        None => true,
    }
}

fn gkg_passes(record: &GkgRecord, filter: &GkgFilter) -> bool {
    if !filter.include_translated && record.translation_info.is_some() {
        return false;
    }
    if !filter.themes.is_empty() && !themes_intersect_ci(&record.v1_themes, &filter.themes) {
        return false;
    }
    if let Some(prefix) = &filter.theme_prefix {
        if !theme_prefix_match(&record.v1_themes, prefix) {
            return false;
        }
    }
    if !filter.persons.is_empty() {
        let joined = record.v1_persons.join(";");
        if !contains_any_ci(&joined, &filter.persons) {
            return false;
        }
    }
    if !filter.organizations.is_empty() {
        let joined = record.v1_organizations.join(";");
        if !contains_any_ci(&joined, &filter.organizations) {
            return false;
        }
    }
    if let Some(country) = &filter.location_country {
        let matches_location = record
            .v2_enhanced_locations
            .iter()
            .any(|loc| loc.country_code == country.as_str());
        if !matches_location {
            return false;
        }
    }
    match &record.tone {
        Some(tone) => tone_in_range(tone.tone, filter.min_tone, filter.max_tone),
        None => filter.min_tone.is_none() && filter.max_tone.is_none(),
    }
}

pub struct NGramsEndpoint {
    fetcher: Arc<Fetcher<NGramsFilter>>,
}

impl NGramsEndpoint {
    pub fn new(fetcher: Arc<Fetcher<NGramsFilter>>) -> Self {
        NGramsEndpoint { fetcher }
    }

    pub async fn stream(
        &self,
        filter: NGramsFilter,
        opts: FetchOptions,
    ) -> Result<NGramStream, GdeltError> {
        let mut raw_stream = self.fetcher.fetch(&filter, opts).await?;
        Ok(Box::pin(try_stream! {
            while let Some(item) = raw_stream.next().await {
                let RawItem::Record(record) = item? else { continue };
                let AnyRawRecord::NGram(raw) = record else { continue };
                let ngram = NGram::from_raw(&raw);
                if ngram_passes(&ngram, &filter) {
                    yield ngram;
                }
            }
        }))
    }

    pub async fn query(&self, filter: NGramsFilter, opts: FetchOptions) -> Result<FetchResult<NGram>, GdeltError> {
        let raw_stream = self.fetcher.fetch(&filter, opts).await?;
        collect_ngrams(raw_stream, filter).await
    }
}

async fn collect_ngrams(
    mut raw_stream: RawRecordStream,
    filter: NGramsFilter,
) -> Result<FetchResult<NGram>, GdeltError> {
    let mut data = Vec::new();
    let mut failed = Vec::new();

    while let Some(item) = raw_stream.next().await {
        match item? {
            RawItem::Failed(f) => failed.push(f),
            RawItem::Record(AnyRawRecord::NGram(raw)) => {
                let ngram = NGram::from_raw(&raw);
                if ngram_passes(&ngram, &filter) {
                    data.push(ngram);
                }
            }
            RawItem::Record(_) => {}
        }
    }

    Ok(FetchResult { data, failed })
}

fn ngram_passes(ngram: &NGram, filter: &NGramsFilter) -> bool {
    if let Some(wanted) = &filter.ngram {
        if !crate::filter::predicates::contains_ci(&ngram.ngram, wanted) {
            return false;
        }
    }
    if let Some(lang) = &filter.language {
        if !matches_exact_ci(&ngram.lang, lang) {
            return false;
        }
    }
    position_in_range(ngram.position, filter.min_position, filter.max_position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FailedRequest, FailureReason};
    use futures::stream;

    #[test]
    fn event_passes_applies_tone_range() {
        let mut event = Event::from_raw(&RawEvent::default());
        event.avg_tone = 10.0;
        let filter = EventFilter {
            max_tone: Some(5.0),
            ..Default::default()
        };
        assert!(!event_passes(&event, &filter));
    }

    #[test]
    fn ngram_passes_applies_position_range() {
        let ngram = NGram {
            date: String::new(),
            url: String::new(),
            lang: "en".to_string(),
            position: 80,
            pre: String::new(),
            ngram: "climate".to_string(),
            post: String::new(),
        };
        let filter = NGramsFilter {
            max_position: Some(50),
            ..Default::default()
        };
        assert!(!ngram_passes(&ngram, &filter));
    }

    #[tokio::test]
    async fn collect_events_populates_failed_from_warned_items() {
        let items = vec![
            Ok(RawItem::Record(AnyRawRecord::Event(RawEvent::default()))),
            Ok(RawItem::Failed(FailedRequest {
                url: "http://data.gdeltproject.org/gdeltv2/x.export.CSV.zip".to_string(),
                reason: FailureReason::Timeout,
                attempts: 2,
            })),
        ];
        let raw_stream: RawRecordStream = Box::pin(stream::iter(items));
        let result = collect_events(raw_stream, EventFilter::default(), None).await.unwrap();
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.failed.len(), 1);
        assert!(!result.complete());
    }

    #[tokio::test]
    async fn collect_events_is_complete_when_nothing_failed() {
        let items = vec![Ok(RawItem::Record(AnyRawRecord::Event(RawEvent::default())))];
        let raw_stream: RawRecordStream = Box::pin(stream::iter(items));
        let result = collect_events(raw_stream, EventFilter::default(), None).await.unwrap();
        assert!(result.complete());
    }
}
