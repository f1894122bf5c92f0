//! Source selection and fallback over a single filter (component J, §4.7).
//! `FetchResult.failed` itself is assembled by the endpoint façade layer
//! (`facade.rs`), which is the first point with enough context (the typed
//! public record + its filter) to decide what survives into `data`.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::warn;

use crate::error::{ErrorPolicy, FailedRequest, GdeltError};
use crate::filter::Filter;
use crate::source::{RawRecordStream, Source};

/// Per-request knobs from §4.7: force BigQuery, the failure stance applied
/// to every per-record/per-URL failure, and whether a files→BigQuery
/// fallback may happen at stream start.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub use_bigquery: bool,
    pub error_policy: ErrorPolicy,
    pub fallback_enabled: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            use_bigquery: false,
            error_policy: ErrorPolicy::Warn,
            fallback_enabled: true,
        }
    }
}

/// `{ data, failed }`; `complete` iff nothing failed (§3.1).
#[derive(Debug, Clone, Default)]
pub struct FetchResult<T> {
    pub data: Vec<T>,
    pub failed: Vec<FailedRequest>,
}

impl<T> FetchResult<T> {
    pub fn complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives H (files) and I (BigQuery) behind one contract, switching to
/// BigQuery only before any record has been yielded (§4.7, §5 "Ordering
/// guarantees").
pub struct Fetcher<F: Filter + Sync> {
    files: Arc<dyn Source<F> + Send + Sync>,
    bigquery: Option<Arc<dyn Source<F> + Send + Sync>>,
}

impl<F: Filter + Sync + 'static> Fetcher<F> {
    pub fn new(
        files: Arc<dyn Source<F> + Send + Sync>,
        bigquery: Option<Arc<dyn Source<F> + Send + Sync>>,
    ) -> Self {
        Fetcher { files, bigquery }
    }

    /// `INIT → STREAMING_FILES → (fallback) → STREAMING_BQ → DONE`.
    pub async fn fetch(&self, filter: &F, opts: FetchOptions) -> Result<RawRecordStream, GdeltError> {
        if opts.use_bigquery {
            let bigquery = self.bigquery.as_ref().ok_or_else(|| {
                GdeltError::Configuration("use_bigquery requested but BigQuery is not configured".to_string())
            })?;
            return bigquery.fetch(filter, opts.error_policy).await;
        }

        let files_result = self.files.fetch(filter, opts.error_policy).await;
        let mut files_stream = match files_result {
            Ok(stream) => stream,
            Err(err) => return self.fallback_or_propagate(filter, opts, err).await,
        };

        match files_stream.next().await {
            None => Ok(Box::pin(stream::empty())),
            Some(Err(err)) if is_fallback_eligible(&err) => {
                self.fallback_or_propagate(filter, opts, err).await
            }
            Some(first) => {
                let prefix = stream::once(async move { first });
                Ok(Box::pin(prefix.chain(files_stream)))
            }
        }
    }

    async fn fallback_or_propagate(
        &self,
        filter: &F,
        opts: FetchOptions,
        err: GdeltError,
    ) -> Result<RawRecordStream, GdeltError> {
        if opts.fallback_enabled {
            if let Some(bigquery) = &self.bigquery {
                warn!(error = %err, "file source failed at stream start, falling back to BigQuery");
                return bigquery.fetch(filter, opts.error_policy).await;
            }
        }
        Err(err)
    }
}

fn is_fallback_eligible(err: &GdeltError) -> bool {
    matches!(err, GdeltError::RateLimited { .. } | GdeltError::Unavailable(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureReason;

    #[test]
    fn rate_limited_is_fallback_eligible() {
        assert!(is_fallback_eligible(&GdeltError::RateLimited {
            retry_after_ms: Some(1000)
        }));
    }

    #[test]
    fn validation_error_is_not_fallback_eligible() {
        assert!(!is_fallback_eligible(&GdeltError::Validation(
            "bad range".to_string()
        )));
    }

    #[test]
    fn default_options_warn_with_fallback_enabled() {
        let opts = FetchOptions::default();
        assert_eq!(opts.error_policy, ErrorPolicy::Warn);
        assert!(opts.fallback_enabled);
        assert!(!opts.use_bigquery);
    }

    #[test]
    fn fetch_result_complete_iff_no_failures() {
        let ok: FetchResult<i32> = FetchResult {
            data: vec![1],
            failed: vec![],
        };
        assert!(ok.complete());
        let bad: FetchResult<i32> = FetchResult {
            data: vec![],
            failed: vec![FailedRequest {
                url: "u".to_string(),
                reason: FailureReason::Timeout,
                attempts: 3,
            }],
        };
        assert!(!bad.complete());
    }
}
