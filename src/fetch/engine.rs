//! Fetch-and-merge engine
//!
//! Walks every page of a paginated listing: fetch page 1, discover the
//! total page count from its pagination markers, then fetch pages 2..=n
//! sequentially, merging each page's items into one listing and reporting
//! progress after every page.
//!
//! There is no partial success: a failure on any page fails the whole
//! operation, and nothing is cached for it.

use crate::fetch::extract::{extractor_for, PageDocument, PageExtractor};
use crate::fetch::fetcher::PageFetcher;
use crate::listing::{Listing, ResourceKind};
use crate::FetchError;
use thiserror::Error;
use url::Url;

/// Identifies what to fetch: a user, a resource kind, and the extractor
/// that decodes one page of it
pub struct ResourceRequest<'a> {
    pub username: &'a str,
    pub kind: ResourceKind,
    pub extractor: &'a dyn PageExtractor,
}

impl<'a> ResourceRequest<'a> {
    /// Builds a request with the standard extractor for the kind
    pub fn new(username: &'a str, kind: ResourceKind) -> Self {
        Self {
            username,
            kind,
            extractor: extractor_for(kind),
        }
    }
}

/// A fetch failure tagged with the page index it occurred on.
///
/// The failure classifier treats first-page failures differently from
/// failures further into the listing, so the index travels with the error.
#[derive(Debug, Error)]
#[error("page {page}: {source}")]
pub struct PagedError {
    pub page: u32,
    #[source]
    pub source: FetchError,
}

/// Receiver for incremental fetch progress.
///
/// The engine reports a fraction in [0, 1] plus a label after each page;
/// fractions are strictly increasing and reach exactly 1.0 on the last
/// page. Callers render them or ignore them.
pub trait ProgressSink {
    fn report(&mut self, fraction: f64, label: &str);
}

/// Sink that discards all progress updates
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&mut self, _fraction: f64, _label: &str) {}
}

/// Fetches and merges every page of a listing.
///
/// # Arguments
///
/// * `request` - The user, resource kind, and page extractor
/// * `base` - Base URL of the upstream site (must end with a slash)
/// * `fetcher` - The page fetcher to issue requests through
/// * `progress` - Sink for per-page progress updates
///
/// # Returns
///
/// * `Ok(Listing)` - The union of every page's items
/// * `Err(PagedError)` - The first failure, tagged with its page index
pub async fn fetch_all_pages(
    request: &ResourceRequest<'_>,
    base: &Url,
    fetcher: &dyn PageFetcher,
    progress: &mut dyn ProgressSink,
) -> Result<Listing, PagedError> {
    let label = format!("{} for {}", request.kind.describe(), request.username);

    let url = page_url(base, request, 1)?;
    let body = fetcher
        .fetch(&url)
        .await
        .map_err(|source| PagedError { page: 1, source })?;
    // Parsed documents are scoped so none is held across an await; the
    // returned future stays Send
    let (mut listing, total) = {
        let doc = PageDocument::parse(&body);
        let listing = request
            .extractor
            .extract(&doc)
            .map_err(|source| PagedError { page: 1, source })?;
        (listing, doc.page_count())
    };
    tracing::debug!("{}: {} page(s) discovered", label, total);
    progress.report(1.0 / f64::from(total), &label);

    for page in 2..=total {
        let url = page_url(base, request, page)?;
        let body = fetcher
            .fetch(&url)
            .await
            .map_err(|source| PagedError { page, source })?;
        let doc = PageDocument::parse(&body);
        let partial = request
            .extractor
            .extract(&doc)
            .map_err(|source| PagedError { page, source })?;
        listing.merge(partial);
        progress.report(f64::from(page) / f64::from(total), &label);
    }

    tracing::info!("{}: {} item(s) across {} page(s)", label, listing.len(), total);
    Ok(listing)
}

/// Resolves the URL of one listing page under the base URL
fn page_url(base: &Url, request: &ResourceRequest<'_>, page: u32) -> Result<Url, PagedError> {
    base.join(&format!(
        "{}/{}/page/{}/",
        request.username,
        request.kind.path_segment(),
        page
    ))
    .map_err(|e| PagedError {
        page,
        source: FetchError::InvalidResponse {
            reason: format!("could not build listing url: {}", e),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher serving canned bodies keyed by URL path; unknown paths 404
    struct StubFetcher {
        pages: HashMap<String, Result<String, FetchError>>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn new(pages: Vec<(&str, Result<String, FetchError>)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(path, body)| (path.to_string(), body))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url.path())
                .cloned()
                .unwrap_or(Err(FetchError::NotFound))
        }
    }

    /// Sink that records every report for later assertions
    #[derive(Default)]
    struct RecordingSink {
        reports: Vec<(f64, String)>,
    }

    impl ProgressSink for RecordingSink {
        fn report(&mut self, fraction: f64, label: &str) {
            self.reports.push((fraction, label.to_string()));
        }
    }

    fn film_item(slug: &str) -> String {
        format!(
            r#"<li class="poster-container"><div class="film-poster" data-film-slug="{}"><img alt="{}"></div></li>"#,
            slug, slug
        )
    }

    fn page_body(slugs: &[&str], total_pages: u32) -> String {
        let items: String = slugs.iter().map(|s| film_item(s)).collect();
        let markers: String = (1..=total_pages)
            .map(|p| format!(r#"<li class="paginate-page"><a>{}</a></li>"#, p))
            .collect();
        format!("<html><body><ul>{}</ul>{}</body></html>", items, markers)
    }

    fn base() -> Url {
        Url::parse("https://example.test/").unwrap()
    }

    #[tokio::test]
    async fn test_multi_page_fetch_merges_all_pages() {
        let fetcher = StubFetcher::new(vec![
            ("/jane/films/page/1/", Ok(page_body(&["aa"], 3))),
            ("/jane/films/page/2/", Ok(page_body(&["bb"], 3))),
            ("/jane/films/page/3/", Ok(page_body(&["cc"], 3))),
        ]);
        let mut sink = RecordingSink::default();
        let request = ResourceRequest::new("jane", ResourceKind::Films);

        let listing = fetch_all_pages(&request, &base(), &fetcher, &mut sink)
            .await
            .unwrap();

        assert_eq!(listing.len(), 3);
        assert_eq!(fetcher.call_count(), 3);
        match listing {
            Listing::Films(films) => {
                assert!(films.contains_key("aa"));
                assert!(films.contains_key("bb"));
                assert!(films.contains_key("cc"));
            }
            _ => panic!("expected films listing"),
        }
    }

    #[tokio::test]
    async fn test_progress_increases_and_ends_at_one() {
        let fetcher = StubFetcher::new(vec![
            ("/jane/films/page/1/", Ok(page_body(&["aa"], 3))),
            ("/jane/films/page/2/", Ok(page_body(&["bb"], 3))),
            ("/jane/films/page/3/", Ok(page_body(&["cc"], 3))),
        ]);
        let mut sink = RecordingSink::default();
        let request = ResourceRequest::new("jane", ResourceKind::Films);

        fetch_all_pages(&request, &base(), &fetcher, &mut sink)
            .await
            .unwrap();

        let fractions: Vec<f64> = sink.reports.iter().map(|(f, _)| *f).collect();
        assert_eq!(fractions.len(), 3);
        for pair in fractions.windows(2) {
            assert!(pair[0] < pair[1], "progress must strictly increase");
        }
        assert_eq!(*fractions.last().unwrap(), 1.0);
        assert!(sink.reports[0].1.contains("jane"));
    }

    #[tokio::test]
    async fn test_single_page_short_circuits() {
        let fetcher = StubFetcher::new(vec![(
            "/jane/films/page/1/",
            Ok(page_body(&["aa", "bb"], 1)),
        )]);
        let mut sink = RecordingSink::default();
        let request = ResourceRequest::new("jane", ResourceKind::Films);

        let listing = fetch_all_pages(&request, &base(), &fetcher, &mut sink)
            .await
            .unwrap();

        assert_eq!(listing.len(), 2);
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(sink.reports.len(), 1);
        assert_eq!(sink.reports[0].0, 1.0);
    }

    #[tokio::test]
    async fn test_no_pagination_markers_means_one_page() {
        let fetcher = StubFetcher::new(vec![(
            "/jane/watchlist/page/1/",
            Ok(r#"<html><body><li class="poster-container"><div class="film-poster" data-film-slug="aa"></div></li></body></html>"#.to_string()),
        )]);
        let mut sink = RecordingSink::default();
        let request = ResourceRequest::new("jane", ResourceKind::Watchlist);

        let listing = fetch_all_pages(&request, &base(), &fetcher, &mut sink)
            .await
            .unwrap();

        assert_eq!(listing.len(), 1);
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_past_first_page_carries_page_index() {
        let fetcher = StubFetcher::new(vec![
            ("/jane/films/page/1/", Ok(page_body(&["aa"], 3))),
            ("/jane/films/page/2/", Err(FetchError::AccessDenied)),
        ]);
        let mut sink = RecordingSink::default();
        let request = ResourceRequest::new("jane", ResourceKind::Films);

        let err = fetch_all_pages(&request, &base(), &fetcher, &mut sink)
            .await
            .unwrap_err();

        assert_eq!(err.page, 2);
        assert!(matches!(err.source, FetchError::AccessDenied));
    }

    #[tokio::test]
    async fn test_first_page_failure_stops_immediately() {
        let fetcher = StubFetcher::new(vec![(
            "/ghost/films/page/1/",
            Err(FetchError::NotFound),
        )]);
        let mut sink = RecordingSink::default();
        let request = ResourceRequest::new("ghost", ResourceKind::Films);

        let err = fetch_all_pages(&request, &base(), &fetcher, &mut sink)
            .await
            .unwrap_err();

        assert_eq!(err.page, 1);
        assert_eq!(fetcher.call_count(), 1);
        assert!(sink.reports.is_empty());
    }
}
