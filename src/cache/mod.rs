//! Freshness cache for fetched listings
//!
//! Completed grabs are persisted keyed by (username, resource kind) and
//! tagged with the moment the full merge finished. A cached entry is served
//! instead of re-fetching while it is younger than the configured maximum
//! age; the user can force a refresh past any age. Entries are only ever
//! superseded by a new fetch, never deleted automatically.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteCache;
pub use traits::{CacheStore, StoreError, StoreResult};

use crate::listing::{Listing, ResourceKind};
use chrono::{DateTime, Duration, Utc};

/// Key identifying one cached listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub username: String,
    pub kind: ResourceKind,
}

impl CacheKey {
    pub fn new(username: &str, kind: ResourceKind) -> Self {
        Self {
            username: username.to_string(),
            kind,
        }
    }
}

/// A persisted listing plus the moment its full fetch completed.
///
/// `loaded_at` reflects when the all-pages merge finished, not any
/// individual page's fetch time.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub loaded_at: DateTime<Utc>,
    pub listing: Listing,
}

impl CacheEntry {
    pub fn new(loaded_at: DateTime<Utc>, listing: Listing) -> Self {
        Self { loaded_at, listing }
    }
}

/// Checks whether a cached entry is still usable.
///
/// True iff `now - loaded_at < max_age`. Pass the clock's `now` in rather
/// than reading wall-clock time here, so staleness is deterministic under
/// test.
pub fn is_fresh(entry: &CacheEntry, now: DateTime<Utc>, max_age: Duration) -> bool {
    now - entry.loaded_at < max_age
}

/// Source of the current time, injected so staleness checks are testable
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock reading real wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::FilmMap;

    fn entry_loaded_at(loaded_at: DateTime<Utc>) -> CacheEntry {
        CacheEntry::new(loaded_at, Listing::Films(FilmMap::new()))
    }

    #[test]
    fn test_fresh_within_window() {
        let now = Utc::now();
        let entry = entry_loaded_at(now - Duration::days(6));
        assert!(is_fresh(&entry, now, Duration::days(7)));
    }

    #[test]
    fn test_stale_past_window() {
        let now = Utc::now();
        let entry = entry_loaded_at(now - Duration::days(8));
        assert!(!is_fresh(&entry, now, Duration::days(7)));
    }

    #[test]
    fn test_exactly_max_age_is_stale() {
        let now = Utc::now();
        let entry = entry_loaded_at(now - Duration::days(7));
        assert!(!is_fresh(&entry, now, Duration::days(7)));
    }

    #[test]
    fn test_entry_from_the_future_is_fresh() {
        // Clock skew between sessions shouldn't force a refetch
        let now = Utc::now();
        let entry = entry_loaded_at(now + Duration::hours(1));
        assert!(is_fresh(&entry, now, Duration::days(7)));
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
