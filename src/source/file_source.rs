//! Drives D+E+F: resolve → download (B+C) → decompress → parse → yield raw
//! records (component H, §4.5).

use std::collections::HashMap;
use std::sync::Arc;

use async_stream::try_stream;
use async_trait::async_trait;
use tokio::sync::{mpsc, Semaphore};
use tracing::warn;

use crate::cache::DiskCache;
use crate::dataset::ArchiveKind;
use crate::decode::{self, ArchiveHint};
use crate::error::{ErrorPolicy, FailedRequest, FailureReason, GdeltError};
use crate::filter::resolver;
use crate::filter::Filter;
use crate::masterlist::MasterFileList;
use crate::parse::{self, AnyRawRecord};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::transport::Transport;

use super::{RawItem, RawRecordStream, Source};

pub struct FileSource {
    transport: Arc<Transport>,
    cache: Arc<DiskCache>,
    master_list: Arc<MasterFileList>,
    max_concurrent_downloads: usize,
    decompressed_size_cap_bytes: u64,
    include_translated: bool,
    retry_policy: RetryPolicy,
}

impl FileSource {
    pub fn new(
        transport: Arc<Transport>,
        cache: Arc<DiskCache>,
        master_list: Arc<MasterFileList>,
        max_concurrent_downloads: usize,
        decompressed_size_cap_bytes: u64,
        include_translated: bool,
        retry_policy: RetryPolicy,
    ) -> Self {
        FileSource {
            transport,
            cache,
            master_list,
            max_concurrent_downloads,
            decompressed_size_cap_bytes,
            include_translated,
            retry_policy,
        }
    }

    async fn fetch_impl<F: Filter + Sync>(
        &self,
        filter: &F,
        policy: ErrorPolicy,
    ) -> Result<RawRecordStream, GdeltError> {
        let dataset = filter.dataset();
        let urls = resolver::resolve_urls(&self.master_list, &self.transport, filter, self.include_translated).await?;

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_downloads.max(1)));
        let (tx, mut rx) = mpsc::channel::<(usize, Result<Vec<AnyRawRecord>, FailedRequest>)>(
            self.max_concurrent_downloads.max(1) * 2,
        );

        for (index, url) in urls.iter().cloned().enumerate() {
            let transport = self.transport.clone();
            let cache = self.cache.clone();
            let semaphore = semaphore.clone();
            let tx = tx.clone();
            let retry_policy = self.retry_policy;
            let cap = self.decompressed_size_cap_bytes;

            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                let result = fetch_decode_parse(&transport, &cache, &url, dataset, cap, retry_policy, policy).await;
                let mapped = result.map_err(|err| failed_request_from(&url, &err));
                // A closed receiver means the consumer dropped the stream
                // (cancellation); there is nothing further to report.
                let _ = tx.send((index, mapped)).await;
            });
        }
        drop(tx);

        // Downloads complete out of order; buffer until the next expected
        // bucket index is available so bucket locality is preserved on the
        // output side (§4.5, §5 "Ordering guarantees").
        let stream = try_stream! {
            let mut pending: HashMap<usize, Result<Vec<AnyRawRecord>, FailedRequest>> = HashMap::new();
            let mut next_index = 0usize;
            let total = urls.len();

            while next_index < total {
                if let Some(item) = pending.remove(&next_index) {
                    next_index += 1;
                    match item {
                        Ok(records) => {
                            for record in records {
                                yield RawItem::Record(record);
                            }
                        }
                        Err(failed) => match policy {
                            ErrorPolicy::Raise => Err(GdeltError::Api {
                                status: failed.reason.http_status(),
                                message: format!("fetch failed for {}: {:?}", failed.url, failed.reason),
                            })?,
                            ErrorPolicy::Warn => {
                                warn!(url = failed.url, reason = ?failed.reason, "file source request failed");
                                yield RawItem::Failed(failed);
                            }
                            ErrorPolicy::Skip => {}
                        },
                    }
                    continue;
                }

                match rx.recv().await {
                    Some((index, result)) => {
                        pending.insert(index, result);
                    }
                    None => break,
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

async fn fetch_decode_parse(
    transport: &Transport,
    cache: &DiskCache,
    url: &str,
    dataset: crate::dataset::Dataset,
    cap_bytes: u64,
    retry_policy: RetryPolicy,
    policy: ErrorPolicy,
) -> Result<Vec<AnyRawRecord>, GdeltError> {
    let ext = match dataset.archive_kind() {
        ArchiveKind::Zip => "zip",
        ArchiveKind::Gzip => "gz",
    };

    let bytes = retry_with_backoff(retry_policy, |_attempt| async {
        cache.get_or_fetch(transport, url, ext).await
    })
    .await?;

    let hint = match dataset.archive_kind() {
        ArchiveKind::Zip => ArchiveHint::Zip,
        ArchiveKind::Gzip => ArchiveHint::Gzip,
    };
    let decoded = decode::decode(bytes, hint, cap_bytes).await?;
    let text = String::from_utf8_lossy(&decoded).into_owned();

    let (records, _parse_errors) = parse::parse_all(dataset, &text, policy)?;
    Ok(records)
}

fn failed_request_from(url: &str, err: &GdeltError) -> FailedRequest {
    let reason = match err {
        GdeltError::RateLimited { .. } => FailureReason::RateLimited,
        GdeltError::Http(e) if e.is_timeout() => FailureReason::Timeout,
        GdeltError::Api { status, .. } => FailureReason::HttpError(status.unwrap_or(0)),
        GdeltError::Decode(msg) | GdeltError::Security(msg) => FailureReason::DecodeError(msg.clone()),
        GdeltError::Parse { message, .. } => FailureReason::ParseError(message.clone()),
        other => FailureReason::DecodeError(other.to_string()),
    };
    FailedRequest {
        url: url.to_string(),
        reason,
        attempts: 1,
    }
}

macro_rules! impl_file_source {
    ($filter_ty:ty) => {
        #[async_trait]
        impl Source<$filter_ty> for FileSource {
            async fn fetch(&self, filter: &$filter_ty, policy: ErrorPolicy) -> Result<RawRecordStream, GdeltError> {
                self.fetch_impl(filter, policy).await
            }
        }
    };
}

impl_file_source!(crate::filter::EventFilter);
impl_file_source!(crate::filter::MentionFilter);
impl_file_source!(crate::filter::GkgFilter);
impl_file_source!(crate::filter::NGramsFilter);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_request_classifies_rate_limit() {
        let err = GdeltError::RateLimited { retry_after_ms: None };
        let failed = failed_request_from("http://x", &err);
        assert!(matches!(failed.reason, FailureReason::RateLimited));
    }

    #[test]
    fn failed_request_classifies_parse_error() {
        let err = GdeltError::Parse {
            line: 3,
            message: "bad".to_string(),
        };
        let failed = failed_request_from("http://x", &err);
        assert!(matches!(failed.reason, FailureReason::ParseError(_)));
    }

    #[test]
    fn failed_request_uses_typed_status_not_digits_scraped_from_the_url() {
        let url = "http://data.gdeltproject.org/gdeltv2/20240115120000.export.CSV.zip";
        let err = GdeltError::Api {
            status: Some(503),
            message: format!("fetch failed for {url}: 503"),
        };
        let failed = failed_request_from(url, &err);
        assert!(matches!(failed.reason, FailureReason::HttpError(503)));
    }
}
