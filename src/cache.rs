//! Content-addressed on-disk cache keyed by URL (component C, §4.2).
//!
//! Single-flight protection follows the same shape as the stampede guard in
//! spineldb's `CACHE.FETCH` command: a `DashMap<key, Shared<BoxFuture<...>>>`
//! where the first caller for a key inserts a shared future and every other
//! concurrent caller for that key awaits the same future instead of issuing
//! its own download.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::GdeltError;
use crate::transport::Transport;

/// `{url_hash, path, size, mtime, checksum?}` from §3.1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedFileMeta {
    pub url: String,
    pub mtime_unix: u64,
    pub size: u64,
    pub checksum: Option<String>,
}

type FetchFuture = Shared<BoxFuture<'static, Result<Bytes, Arc<GdeltError>>>>;

pub struct DiskCache {
    dir: PathBuf,
    ttl: Duration,
    in_flight: DashMap<String, FetchFuture>,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        DiskCache {
            dir: dir.into(),
            ttl,
            in_flight: DashMap::new(),
        }
    }

    fn files_dir(&self) -> PathBuf {
        self.dir.join("files")
    }

    fn data_path(&self, key: &str, ext: &str) -> PathBuf {
        self.files_dir().join(format!("{key}.{ext}"))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.files_dir().join(format!("{key}.meta"))
    }

    /// `get_or_fetch(url, ttl) -> bytes`, §4.2. Looks up a fresh cached file
    /// first; otherwise joins (or starts) the single in-flight download for
    /// that URL.
    pub async fn get_or_fetch(
        &self,
        transport: &Transport,
        url: &str,
        ext: &str,
    ) -> Result<Bytes, GdeltError> {
        let key = hash_url(url);

        if let Some(bytes) = self.read_fresh(&key, ext).await {
            debug!(url, "cache hit");
            return Ok(bytes);
        }

        let future_to_await = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(occupied) => occupied.get().clone(),
            Entry::Vacant(vacant) => {
                let dir = self.files_dir();
                let data_path = self.data_path(&key, ext);
                let meta_path = self.meta_path(&key);
                let url_owned = url.to_string();
                let transport_client = transport.client().clone();

                let fetch_future: BoxFuture<'static, Result<Bytes, Arc<GdeltError>>> = async move {
                    fetch_and_store(&transport_client, &url_owned, &dir, &data_path, &meta_path)
                        .await
                        .map_err(Arc::new)
                }
                .boxed();

                let shared_future = fetch_future.shared();
                vacant.insert(shared_future.clone());
                shared_future
            }
        };

        let result = future_to_await.await;
        self.in_flight.remove(&key);
        result.map_err(|arc_err| reconstruct_error(&arc_err))
    }

    async fn read_fresh(&self, key: &str, ext: &str) -> Option<Bytes> {
        let meta_path = self.meta_path(key);
        let data_path = self.data_path(key, ext);
        let meta_text = tokio::fs::read_to_string(&meta_path).await.ok()?;
        let meta: CachedFileMeta = serde_json::from_str(&meta_text).ok()?;
        let now = now_unix();
        if now.saturating_sub(meta.mtime_unix) >= self.ttl.as_secs() {
            return None;
        }
        let bytes = tokio::fs::read(&data_path).await.ok()?;
        if bytes.is_empty() || bytes.len() as u64 != meta.size {
            warn!(path = %data_path.display(), "cached file corrupt, invalidating");
            return None;
        }
        Some(Bytes::from(bytes))
    }

    /// Explicit invalidation of a cached entry, per §3.1's `CachedFile`
    /// lifecycle ("evicted on TTL expiry or explicit invalidation").
    pub async fn invalidate(&self, url: &str, ext: &str) {
        let key = hash_url(url);
        let _ = tokio::fs::remove_file(self.data_path(&key, ext)).await;
        let _ = tokio::fs::remove_file(self.meta_path(&key)).await;
    }
}

async fn fetch_and_store(
    client: &reqwest::Client,
    url: &str,
    dir: &Path,
    data_path: &Path,
    meta_path: &Path,
) -> Result<Bytes, GdeltError> {
    tokio::fs::create_dir_all(dir).await?;

    let resp = client.get(url).send().await?;
    let status = resp.status();
    if status.as_u16() == 429 {
        return Err(GdeltError::RateLimited {
            retry_after_ms: resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|s| s * 1000),
        });
    }
    if !status.is_success() {
        return Err(GdeltError::Api {
            status: Some(status.as_u16()),
            message: format!("HTTP {status} fetching {url}"),
        });
    }
    let bytes = resp.bytes().await?;

    write_atomically(data_path, &bytes).await?;

    let meta = CachedFileMeta {
        url: url.to_string(),
        mtime_unix: now_unix(),
        size: bytes.len() as u64,
        checksum: None,
    };
    let meta_json = serde_json::to_vec_pretty(&meta)?;
    write_atomically(meta_path, &meta_json).await?;

    Ok(bytes)
}

/// Temp file + rename, so a reader never observes a partially written file
/// (§4.2's "write atomically").
async fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<(), GdeltError> {
    let tmp_path = dest.with_extension(format!(
        "{}.tmp",
        dest.extension().and_then(|e| e.to_str()).unwrap_or("part")
    ));
    {
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
    }
    tokio::fs::rename(&tmp_path, dest).await?;
    Ok(())
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// `Arc<GdeltError>` is not `Clone`-through into an owned `GdeltError`
/// (the inner variants hold non-`Clone` sources), so followers reconstruct
/// a representative error from the leader's rather than cloning it.
fn reconstruct_error(err: &GdeltError) -> GdeltError {
    match err {
        GdeltError::RateLimited { retry_after_ms } => GdeltError::RateLimited {
            retry_after_ms: *retry_after_ms,
        },
        other => GdeltError::Api {
            status: None,
            message: other.to_string(),
        },
    }
}

/// FNV-1a 64-bit, hex-encoded — a stable, dependency-free hash for cache
/// keys that must stay the same across process restarts.
pub fn hash_url(url: &str) -> String {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    let mut hash = FNV_OFFSET;
    for byte in url.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{hash:016x}")
}
