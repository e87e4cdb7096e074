//! Listing model for fetched user data
//!
//! A listing is one user's fully merged view of a paginated resource:
//! either the watched-films grid (slug → film attributes) or the watchlist
//! (a set of slugs).

use std::collections::{BTreeSet, HashMap};

/// Which listing is being fetched for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// All films the user has watched
    Films,
    /// Films the user has saved for later
    Watchlist,
}

impl ResourceKind {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Films => "films",
            Self::Watchlist => "watchlist",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "films" => Some(Self::Films),
            "watchlist" => Some(Self::Watchlist),
            _ => None,
        }
    }

    /// Path segment of the listing under a user's profile URL
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Films => "films",
            Self::Watchlist => "watchlist",
        }
    }

    /// Human-readable name, used in progress labels and error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Films => "watched films",
            Self::Watchlist => "watchlist",
        }
    }
}

/// Attributes of one watched film
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Film {
    pub name: String,
    pub year: Option<u16>,
    /// Rating on the 0-10 half-star integer scale (8 = four stars)
    pub rating: Option<u8>,
    pub liked: bool,
}

/// Map from film slug to attributes, as extracted from the films grid
pub type FilmMap = HashMap<String, Film>;

/// Set of film slugs, as extracted from a watchlist grid
pub type SlugSet = BTreeSet<String>;

/// One user's fully merged listing payload
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Films(FilmMap),
    Watchlist(SlugSet),
}

impl Listing {
    /// An empty listing of the given kind
    pub fn empty(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Films => Self::Films(FilmMap::new()),
            ResourceKind::Watchlist => Self::Watchlist(SlugSet::new()),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Films(_) => ResourceKind::Films,
            Self::Watchlist(_) => ResourceKind::Watchlist,
        }
    }

    /// Merges another page's listing into this one by union.
    ///
    /// Slugs are unique per user so collisions are not expected, but a
    /// duplicate slug resolves last-write-wins.
    pub fn merge(&mut self, other: Listing) {
        match (self, other) {
            (Self::Films(films), Self::Films(more)) => films.extend(more),
            (Self::Watchlist(slugs), Self::Watchlist(more)) => slugs.extend(more),
            (slot, other) => debug_assert!(
                false,
                "cannot merge a {:?} page into a {:?} listing",
                other.kind(),
                slot.kind()
            ),
        }
    }

    /// Unwraps a films listing; an empty map if the kind doesn't match
    pub fn into_films(self) -> FilmMap {
        match self {
            Self::Films(films) => films,
            Self::Watchlist(_) => {
                debug_assert!(false, "expected a films listing");
                FilmMap::new()
            }
        }
    }

    /// Unwraps a watchlist listing; an empty set if the kind doesn't match
    pub fn into_watchlist(self) -> SlugSet {
        match self {
            Self::Watchlist(slugs) => slugs,
            Self::Films(_) => {
                debug_assert!(false, "expected a watchlist listing");
                SlugSet::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Films(films) => films.len(),
            Self::Watchlist(slugs) => slugs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
