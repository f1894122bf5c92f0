//! # gdelt-client
//!
//! A client library for [GDELT](https://www.gdeltproject.org/) — a global,
//! near-real-time feed of news-derived records published every 15 minutes —
//! exposing one uniform streaming surface over two backing sources: the
//! public HTTP file archives and BigQuery.
//!
//! ## What this crate is
//!
//! GDELT ships Events, Mentions, GKG, and NGrams as zipped/gzipped TSV or
//! JSON-lines files on a 15-minute cadence, and mirrors the structured
//! datasets into BigQuery for SQL access. This crate unifies both behind one
//! `query`/`stream` contract per dataset:
//!
//! - a master file-list cache and temporal resolver that maps a filter's
//!   date range to 15-minute archive URLs ([`masterlist`], [`filter`]);
//! - a fetcher orchestrator that downloads, decompresses, parses, and
//!   streams records with bounded concurrency, caching, retry, rate-limit
//!   handling, and fallback to BigQuery ([`fetch`], [`source`]);
//! - per-dataset parsers tolerant of schema evolution ([`parse`]);
//! - a dual raw/public record model with pluggable deduplication
//!   ([`model`]).
//!
//! Lookup tables (CAMEO, themes, countries), the REST endpoint wrappers
//! (DOC/GEO/Context/TV), and a CLI are deliberately out of scope — this
//! crate is the data-acquisition core those would sit on top of.
//!
//! ## Architecture
//!
//! ```text
//! filter ──► resolver ──► master file list ──► file source ──► decode ──► parse
//!    │                                               │                      │
//!    └───────────────► fetcher orchestrator ◄────────┘                      │
//!                              │                                            │
//!                       (fallback) BigQuery source                         raw record
//!                              │                                            │
//!                              └──────────────► dedup ──► raw→public ◄──────┘
//!                                                              │
//!                                                        endpoint façade
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gdelt_client::cache::DiskCache;
//! use gdelt_client::config::Settings;
//! use gdelt_client::facade::GkgEndpoint;
//! use gdelt_client::fetch::{FetchOptions, Fetcher};
//! use gdelt_client::filter::{DateRange, GkgFilter};
//! use gdelt_client::masterlist::MasterFileList;
//! use gdelt_client::retry::RetryPolicy;
//! use gdelt_client::source::file_source::FileSource;
//! use gdelt_client::transport::{Timeouts, Transport};
//!
//! # async fn run() -> Result<(), gdelt_client::error::GdeltError> {
//! let settings = Settings::load(None)?;
//! let transport = Arc::new(Transport::new(
//!     Timeouts::uniform(settings.timeout()),
//!     settings.max_concurrent_requests,
//! )?);
//! let cache = Arc::new(DiskCache::new(settings.cache_dir.clone(), settings.cache_ttl()));
//! let master_list = Arc::new(MasterFileList::new(settings.master_file_list_ttl()));
//! let files = Arc::new(FileSource::new(
//!     transport,
//!     cache,
//!     master_list,
//!     settings.max_concurrent_downloads,
//!     settings.decompressed_size_cap_bytes,
//!     settings.include_translated,
//!     RetryPolicy::new(settings.max_retries),
//! ));
//! let fetcher = Arc::new(Fetcher::new(files, None));
//! let gkg = GkgEndpoint::new(fetcher);
//!
//! let filter = GkgFilter {
//!     date_range: Some(DateRange::single_day(
//!         chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
//!     )),
//!     themes: vec!["CLIMATE_CHANGE".to_string()],
//!     ..Default::default()
//! };
//! let result = gkg.query(filter, FetchOptions::default(), None).await?;
//! println!("{} records, complete = {}", result.data.len(), result.complete());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Responsibility |
//! |--------|-----------------|
//! | [`config`] | Layered settings resolution (env, file, explicit override) |
//! | [`transport`] | Connection-pooled HTTP client with bounded concurrency |
//! | [`cache`] | Content-addressed on-disk cache, single-flight per URL |
//! | [`masterlist`] | GDELT master inventory fetch/parse, TTL-cached, bucket index |
//! | [`decode`] | ZIP and gzip streaming decompression with a size cap |
//! | [`parse`] | Per-dataset TSV/JSON-L parsers producing raw records |
//! | [`filter`] | Filter value objects, temporal resolver, client-side predicates |
//! | [`source`] | [`FileSource`](source::file_source::FileSource) and [`BigQuerySource`](source::bigquery_source::BigQuerySource) |
//! | [`fetch`] | [`Fetcher`](fetch::Fetcher) — source selection, fallback, retry |
//! | [`model`] | Raw/public record types, dedup strategies |
//! | [`facade`] | Per-dataset `query`/`stream` endpoints |
//! | [`error`] | [`GdeltError`](error::GdeltError) taxonomy and [`ErrorPolicy`](error::ErrorPolicy) |
//! | [`dataset`] | The [`Dataset`](dataset::Dataset) enum and its per-dataset invariants |

pub mod cache;
pub mod config;
pub mod dataset;
pub mod decode;
pub mod error;
pub mod facade;
pub mod fetch;
pub mod filter;
pub mod masterlist;
pub mod model;
pub mod parse;
pub mod retry;
pub mod source;
pub mod transport;
