//! Fetch module for retrieving and decoding listing pages
//!
//! This module contains the page-level plumbing for a grab:
//! - HTTP fetching with upstream failure classification
//! - Per-page extraction of films and watchlist slugs
//! - Pagination discovery
//! - The fetch-and-merge engine that walks every page of a listing

mod engine;
mod extract;
mod fetcher;

pub use engine::{fetch_all_pages, NullSink, PagedError, ProgressSink, ResourceRequest};
pub use extract::{extractor_for, FilmsExtractor, PageDocument, PageExtractor, WatchlistExtractor};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
