//! Grab orchestration: cache lookup, fetch-and-merge, classified recovery
//!
//! A grab is one request for one user's listing. It consults the freshness
//! cache first, runs the fetch-and-merge engine on a miss (or when the
//! entry is stale, or when the user forces a refresh), stores the merged
//! result, and applies the failure classifier when the engine fails.

mod classifier;

pub use classifier::{classify, ClassifierRules, FailureAction};

use crate::cache::{is_fresh, CacheEntry, CacheKey, CacheStore, Clock};
use crate::fetch::{fetch_all_pages, PageFetcher, ProgressSink, ResourceRequest};
use crate::listing::{Listing, ResourceKind};
use crate::{ReelError, Result};
use chrono::Duration;
use url::Url;

/// Orchestrates grabs against one cache store and one fetcher
pub struct Grabber<'a> {
    store: &'a mut dyn CacheStore,
    fetcher: &'a dyn PageFetcher,
    clock: &'a dyn Clock,
    base_url: Url,
    /// Maximum cached-entry age; `None` means entries never expire
    max_age: Option<Duration>,
    rules: ClassifierRules,
}

impl<'a> Grabber<'a> {
    pub fn new(
        store: &'a mut dyn CacheStore,
        fetcher: &'a dyn PageFetcher,
        clock: &'a dyn Clock,
        base_url: Url,
        max_age: Option<Duration>,
        rules: ClassifierRules,
    ) -> Self {
        Self {
            store,
            fetcher,
            clock,
            base_url,
            max_age,
            rules,
        }
    }

    /// Returns one user's complete listing, from cache or upstream.
    ///
    /// A fresh cached entry short-circuits the fetch entirely unless
    /// `force` is set. On a successful fetch the merged listing is stored
    /// before being returned. Classified failures either surface
    /// [`ReelError::UserNotFound`], cache an empty listing (private or
    /// blocked watchlists), or abort with [`ReelError::Fetch`].
    pub async fn grab(
        &mut self,
        username: &str,
        kind: ResourceKind,
        force: bool,
        progress: &mut dyn ProgressSink,
    ) -> Result<Listing> {
        let key = CacheKey::new(username, kind);

        if force {
            tracing::info!("refresh requested for {} of {}", kind.describe(), username);
        } else if let Some(entry) = self.store.lookup(&key)? {
            let fresh = match self.max_age {
                Some(age) => is_fresh(&entry, self.clock.now(), age),
                None => true,
            };
            if fresh {
                tracing::info!(
                    "using cached {} for {} (loaded {})",
                    kind.describe(),
                    username,
                    entry.loaded_at
                );
                return Ok(entry.listing);
            }
            tracing::info!(
                "cached {} for {} from {} is stale, re-fetching",
                kind.describe(),
                username,
                entry.loaded_at
            );
        }

        let request = ResourceRequest::new(username, kind);
        match fetch_all_pages(&request, &self.base_url, self.fetcher, progress).await {
            Ok(listing) => {
                let entry = CacheEntry::new(self.clock.now(), listing.clone());
                self.store.store(&key, &entry)?;
                Ok(listing)
            }
            Err(error) => match classify(&error, kind, &self.rules) {
                FailureAction::CacheEmpty => {
                    tracing::warn!(
                        "{} for {} is unavailable ({}), caching it as empty",
                        kind.describe(),
                        username,
                        error.source
                    );
                    let empty = Listing::empty(kind);
                    let entry = CacheEntry::new(self.clock.now(), empty.clone());
                    self.store.store(&key, &entry)?;
                    Ok(empty)
                }
                FailureAction::ReportMissingUser => Err(ReelError::UserNotFound {
                    username: username.to_string(),
                }),
                FailureAction::Abort => Err(ReelError::Fetch {
                    page: error.page,
                    source: error.source,
                }),
            },
        }
    }
}
