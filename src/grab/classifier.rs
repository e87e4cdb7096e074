//! Failure classification for grab operations
//!
//! Maps page-fetch failures onto resource-appropriate outcomes. Only the
//! first page of a listing gets lenient treatment: a missing user is
//! reported by name, and a private (or, by default, access-denied)
//! watchlist counts as legitimately empty and is cached as such so repeat
//! lookups stop hitting the failing source. Every other failure, and any
//! failure past the first page, aborts the whole session. Nothing is
//! retried.

use crate::fetch::PagedError;
use crate::listing::ResourceKind;
use crate::FetchError;

/// Named, overridable classification rules.
///
/// `denied_watchlist_as_private` controls whether an access-denied first
/// page of a watchlist is treated like a private one (empty, cached)
/// instead of aborting the session. Upstream has been observed answering
/// 403 for some private watchlists, so this defaults to on; disable it via
/// `[rules] treat-denied-watchlist-as-private = false` if upstream behavior
/// changes.
#[derive(Debug, Clone)]
pub struct ClassifierRules {
    pub denied_watchlist_as_private: bool,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            denied_watchlist_as_private: true,
        }
    }
}

/// Outcome of classifying one grab failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// The user does not exist: end this request with a named message,
    /// without writing a cache entry
    ReportMissingUser,

    /// The listing is legitimately unavailable: treat as empty, cache the
    /// empty result, and continue
    CacheEmpty,

    /// Abort the whole session and surface the underlying error
    Abort,
}

/// Classifies a grab failure by resource kind
pub fn classify(error: &PagedError, kind: ResourceKind, rules: &ClassifierRules) -> FailureAction {
    // A listing that produced at least one good page has proven the user
    // exists and the data is public; anything that breaks mid-walk is an
    // upstream problem severe enough to stop the session
    if error.page > 1 {
        return FailureAction::Abort;
    }

    match (&error.source, kind) {
        (FetchError::NotFound, _) => FailureAction::ReportMissingUser,
        (FetchError::PrivateRoute, ResourceKind::Watchlist) => FailureAction::CacheEmpty,
        (FetchError::AccessDenied, ResourceKind::Watchlist)
            if rules.denied_watchlist_as_private =>
        {
            FailureAction::CacheEmpty
        }
        _ => FailureAction::Abort,
    }
}
