//! Deduplication over raw records before raw→public conversion (§4.8).

use std::collections::HashSet;

use tracing::warn;

use crate::model::raw::Dedupable;

/// Closed set of equivalence-key strategies (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupStrategy {
    UrlOnly,
    UrlDate,
    UrlDateLocation,
    ActorPair,
    Full,
}

impl DedupStrategy {
    fn key<T: Dedupable>(self, record: &T) -> String {
        match self {
            DedupStrategy::UrlOnly => record.source_url().to_string(),
            DedupStrategy::UrlDate => format!("{}|{}", record.source_url(), record.date()),
            DedupStrategy::UrlDateLocation => format!(
                "{}|{}|{:?}",
                record.source_url(),
                record.date(),
                record.primary_location_id()
            ),
            DedupStrategy::ActorPair => format!(
                "{:?}|{:?}|{}",
                record.actor1_code(),
                record.actor2_code(),
                record.date()
            ),
            DedupStrategy::Full => record.identity_key(),
        }
    }
}

/// First-occurrence-wins streaming deduplicator. The seen-set is unbounded
/// by default, matching §4.8 ("bounded memory is a user concern"); an
/// optional `max_tracked` cap resolves the memory-growth Open Question by
/// having the deduplicator stop suppressing — rather than grow unbounded —
/// once the cap is hit, emitting a warning when it does.
pub struct Deduplicator {
    strategy: DedupStrategy,
    seen: HashSet<String>,
    max_tracked: Option<usize>,
    cap_reached: bool,
}

impl Deduplicator {
    pub fn new(strategy: DedupStrategy) -> Self {
        Deduplicator {
            strategy,
            seen: HashSet::new(),
            max_tracked: None,
            cap_reached: false,
        }
    }

    pub fn with_max_tracked(strategy: DedupStrategy, max_tracked: usize) -> Self {
        Deduplicator {
            strategy,
            seen: HashSet::new(),
            max_tracked: Some(max_tracked),
            cap_reached: false,
        }
    }

    /// Returns `true` if `record` should be admitted (first occurrence, or
    /// the seen-set cap has been reached and suppression has stopped).
    pub fn admit<T: Dedupable>(&mut self, record: &T) -> bool {
        if self.cap_reached {
            return true;
        }
        let key = self.strategy.key(record);
        if self.seen.contains(&key) {
            return false;
        }
        if let Some(max) = self.max_tracked {
            if self.seen.len() >= max {
                warn!(
                    max_tracked = max,
                    "deduplicator seen-set cap reached, no longer suppressing"
                );
                self.cap_reached = true;
                return true;
            }
        }
        self.seen.insert(key);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::raw::RawEvent;

    fn event(url: &str, date: &str, loc: &str, a1: &str, a2: &str) -> RawEvent {
        RawEvent {
            source_url: url.to_string(),
            date_added: date.to_string(),
            action_geo_feature_id: loc.to_string(),
            actor1_code: a1.to_string(),
            actor2_code: a2.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn url_date_location_drops_second_matching_event() {
        let mut dedup = Deduplicator::new(DedupStrategy::UrlDateLocation);
        let e1 = event("http://x", "20240115", "LOC1", "A", "B");
        let e2 = event("http://x", "20240115", "LOC1", "C", "D");
        assert!(dedup.admit(&e1));
        assert!(!dedup.admit(&e2));
    }

    #[test]
    fn url_only_treats_same_url_as_duplicate_regardless_of_other_fields() {
        let mut dedup = Deduplicator::new(DedupStrategy::UrlOnly);
        let e1 = event("http://x", "20240115", "LOC1", "A", "B");
        let e2 = event("http://x", "20240116", "LOC2", "C", "D");
        assert!(dedup.admit(&e1));
        assert!(!dedup.admit(&e2));
    }

    #[test]
    fn actor_pair_strategy_keys_on_actors_and_date() {
        let mut dedup = Deduplicator::new(DedupStrategy::ActorPair);
        let e1 = event("http://x", "20240115", "LOC1", "USA", "RUS");
        let e2 = event("http://y", "20240115", "LOC2", "USA", "RUS");
        assert!(dedup.admit(&e1));
        assert!(!dedup.admit(&e2));
    }

    #[test]
    fn max_tracked_cap_stops_suppressing_once_reached() {
        let mut dedup = Deduplicator::with_max_tracked(DedupStrategy::UrlOnly, 1);
        let e1 = event("http://x", "d", "l", "a", "b");
        let e2 = event("http://y", "d", "l", "a", "b");
        let e2_again = event("http://y", "d", "l", "a", "b");
        assert!(dedup.admit(&e1));
        assert!(dedup.admit(&e2));
        assert!(dedup.admit(&e2_again));
    }
}
