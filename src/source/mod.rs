//! The two backing sources behind the unified streaming contract: public
//! HTTP file archives (H) and BigQuery (I). Both implement [`Source`] so
//! the fetcher orchestrator (J) can treat them interchangeably.

pub mod bigquery_source;
pub mod file_source;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::{ErrorPolicy, FailedRequest, GdeltError};
use crate::filter::Filter;
use crate::parse::AnyRawRecord;

/// One item out of a raw record stream: either a successfully parsed
/// record, or — under `ErrorPolicy::Warn` — a per-URL failure the source
/// recorded instead of silently dropping (§7). A hard `Err(GdeltError)`
/// on the stream itself means `ErrorPolicy::Raise` (or a fatal error
/// unrelated to any single URL) and ends the stream.
#[derive(Debug)]
pub enum RawItem {
    Record(AnyRawRecord),
    Failed(FailedRequest),
}

pub type RawRecordStream = BoxStream<'static, Result<RawItem, GdeltError>>;

/// `fetch(dataset, filter) -> async lazy finite sequence of raw records`
/// (§4.5, §4.6).
#[async_trait]
pub trait Source<F: Filter + Sync>: Send + Sync {
    async fn fetch(&self, filter: &F, policy: ErrorPolicy) -> Result<RawRecordStream, GdeltError>;
}
