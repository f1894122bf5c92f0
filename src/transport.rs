//! Connection-pooled HTTP client (component B, §4.2).
//!
//! A single [`Transport`] is shared across sources; concurrency against it is
//! capped by a semaphore of width `max_concurrent_requests`, mirroring the
//! way the teacher's `fetch::client` builds one `reqwest::Client` and reuses
//! it for every request.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::GdeltError;

/// The four timeout axes called out in §4.2. `reqwest` only exposes
/// connect/total knobs directly; write/pool timeouts are tracked for API
/// completeness and applied where the underlying transport allows it.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
    pub write: Duration,
    pub pool: Duration,
}

impl Timeouts {
    pub fn uniform(d: Duration) -> Self {
        Timeouts {
            connect: d,
            read: d,
            write: d,
            pool: d,
        }
    }
}

pub struct Transport {
    client: Client,
    concurrency: Arc<Semaphore>,
}

impl Transport {
    pub fn new(timeouts: Timeouts, max_concurrent_requests: usize) -> Result<Self, GdeltError> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.read)
            .pool_idle_timeout(timeouts.pool)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(GdeltError::Http)?;
        Ok(Transport {
            client,
            concurrency: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        })
    }

    /// Wraps an already-constructed client, e.g. one injected by the caller
    /// per §3.3 ("the client owns the HTTP transport unless one is
    /// injected").
    pub fn from_client(client: Client, max_concurrent_requests: usize) -> Self {
        Transport {
            client,
            concurrency: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// `get(url, timeouts) -> bytes | error` from §4.2. Bounded by the shared
    /// concurrency semaphore; classifies the response into the §7 taxonomy.
    pub async fn get(&self, url: &str) -> Result<Bytes, GdeltError> {
        let _permit = self
            .concurrency
            .acquire()
            .await
            .expect("semaphore never closed");
        debug!(url, "fetching over HTTP");
        let resp = self.client.get(url).send().await?;
        classify_response(resp).await
    }

    /// Fetches a response and returns it as UTF-8 text, e.g. for master
    /// file list inventories.
    pub async fn get_text(&self, url: &str) -> Result<String, GdeltError> {
        let bytes = self.get(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

async fn classify_response(resp: reqwest::Response) -> Result<Bytes, GdeltError> {
    let status = resp.status();
    if status.as_u16() == 429 {
        let retry_after_ms = retry_after_ms(&resp);
        warn!(status = %status, "rate limited");
        return Err(GdeltError::RateLimited { retry_after_ms });
    }
    if status.is_server_error() {
        return Err(GdeltError::Unavailable(format!(
            "server error: {}",
            status
        )));
    }
    if !status.is_success() {
        return Err(GdeltError::Api {
            status: Some(status.as_u16()),
            message: format!("HTTP {status}"),
        });
    }
    Ok(resp.bytes().await?)
}

fn retry_after_ms(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(|secs| secs * 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_timeouts_apply_to_all_axes() {
        let t = Timeouts::uniform(Duration::from_secs(5));
        assert_eq!(t.connect, Duration::from_secs(5));
        assert_eq!(t.read, Duration::from_secs(5));
        assert_eq!(t.write, Duration::from_secs(5));
        assert_eq!(t.pool, Duration::from_secs(5));
    }

    #[test]
    fn transport_construction_succeeds_with_sane_defaults() {
        let transport = Transport::new(Timeouts::uniform(Duration::from_secs(30)), 10);
        assert!(transport.is_ok());
    }

    #[tokio::test]
    async fn concurrency_semaphore_has_requested_width() {
        let transport =
            Transport::new(Timeouts::uniform(Duration::from_secs(30)), 4).unwrap();
        assert_eq!(transport.concurrency.available_permits(), 4);
    }
}
