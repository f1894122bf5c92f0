//! The dataset enum and the per-dataset metadata that the resolver, the
//! transport, and the parsers key off of.

/// One of the enumerated GDELT record families (GLOSSARY).
///
/// `Graph` and `Broadcast` are represented so that callers can match
/// exhaustively on the set the project publishes, but neither has a shipped
/// parser: the wire format for them is not part of this crate's scope (see
/// `SPEC_FULL.md` §2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Events,
    Mentions,
    Gkg,
    NGrams,
    Graph,
    Broadcast,
}

impl Dataset {
    /// Maximum span in days a single filter's date range may cover (§3.1).
    pub fn max_span_days(self) -> i64 {
        match self {
            Dataset::Events => 365,
            Dataset::Mentions => 30,
            Dataset::Gkg => 30,
            Dataset::NGrams => 7,
            Dataset::Graph | Dataset::Broadcast => 7,
        }
    }

    /// Expected column count for TSV datasets; `None` for JSON-lines
    /// datasets, whose shape is object fields rather than a column count (§6).
    pub fn column_count(self) -> Option<usize> {
        match self {
            Dataset::Events => Some(61),
            Dataset::Mentions => Some(16),
            Dataset::Gkg => Some(27),
            Dataset::NGrams => None,
            Dataset::Graph | Dataset::Broadcast => None,
        }
    }

    /// The path segment GDELT uses in the master file list to identify a
    /// bucket's dataset, e.g. `20240115120000.export.CSV.zip` for events.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Dataset::Events => ".export.CSV.zip",
            Dataset::Mentions => ".mentions.CSV.zip",
            Dataset::Gkg => ".gkg.csv.zip",
            Dataset::NGrams => ".webngrams.json.gz",
            Dataset::Graph => ".graph.zip",
            Dataset::Broadcast => ".broadcast.zip",
        }
    }

    /// Whether this dataset's archives are ZIP (TSV) or GZIP (JSON-L).
    pub fn archive_kind(self) -> ArchiveKind {
        match self {
            Dataset::NGrams => ArchiveKind::Gzip,
            _ => ArchiveKind::Zip,
        }
    }

    pub fn is_implemented(self) -> bool {
        matches!(
            self,
            Dataset::Events | Dataset::Mentions | Dataset::Gkg | Dataset::NGrams
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Gzip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_span_is_one_year() {
        assert_eq!(Dataset::Events.max_span_days(), 365);
    }

    #[test]
    fn gkg_has_27_columns() {
        assert_eq!(Dataset::Gkg.column_count(), Some(27));
    }

    #[test]
    fn ngrams_has_no_column_count() {
        assert_eq!(Dataset::NGrams.column_count(), None);
    }

    #[test]
    fn ngrams_archive_is_gzip() {
        assert_eq!(Dataset::NGrams.archive_kind(), ArchiveKind::Gzip);
    }

    #[test]
    fn events_archive_is_zip() {
        assert_eq!(Dataset::Events.archive_kind(), ArchiveKind::Zip);
    }

    #[test]
    fn graph_and_broadcast_are_not_implemented() {
        assert!(!Dataset::Graph.is_implemented());
        assert!(!Dataset::Broadcast.is_implemented());
        assert!(Dataset::Gkg.is_implemented());
    }
}
