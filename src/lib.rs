//! Reel-Diff: compare two Letterboxd users' watched films
//!
//! This crate fetches two users' watched-film listings (and the first user's
//! watchlist), caches the merged results in SQLite with a freshness window,
//! and reports the films the first user has watched that the second has not,
//! ranked by the first user's rating, like, and watchlist signals.

pub mod cache;
pub mod compare;
pub mod config;
pub mod fetch;
pub mod grab;
pub mod listing;
pub mod username;

use thiserror::Error;

/// Main error type for Reel-Diff operations
#[derive(Debug, Error)]
pub enum ReelError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Store(#[from] cache::StoreError),

    #[error("No user named {username:?} exists")]
    UserNotFound { username: String },

    #[error("Fetch failed on page {page}: {source}")]
    Fetch { page: u32, source: FetchError },

    #[error("Invalid username {0:?}: usernames are lowercase letters, digits, and underscores")]
    InvalidUsername(String),

    #[error("Could not resolve short link {link}: {reason}")]
    ShortLink { link: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures the page fetcher can report for a single page request.
///
/// This is a closed taxonomy: every upstream misbehavior is folded into one
/// of these four variants, and the grab layer decides per resource kind
/// which are recoverable.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The listing (or the user that owns it) does not exist upstream.
    #[error("not found")]
    NotFound,

    /// The listing exists but its owner has marked it non-public.
    #[error("listing is private")]
    PrivateRoute,

    /// Upstream refused the request (defensive blocking or rate limiting).
    #[error("access denied or rate-limited by upstream")]
    AccessDenied,

    /// The response had an unexpected shape (bad status, wrong content
    /// type, transport failure).
    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Reel-Diff operations
pub type Result<T> = std::result::Result<T, ReelError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::{is_fresh, CacheEntry, CacheKey, CacheStore, Clock, SqliteCache, SystemClock};
pub use config::Config;
pub use grab::{ClassifierRules, Grabber};
pub use listing::{Film, Listing, ResourceKind};
