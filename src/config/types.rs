use chrono::Duration;
use serde::Deserialize;

/// Main configuration structure for Reel-Diff
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub rules: RulesConfig,
}

/// Upstream site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL user listings live under
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://letterboxd.com/".to_string(),
        }
    }
}

/// Cache behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Path to the SQLite cache database
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Cached entries older than this are re-fetched; 0 disables expiry
    #[serde(rename = "max-age-days")]
    pub max_age_days: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database_path: "./reel-diff.db".to_string(),
            max_age_days: 7,
        }
    }
}

impl CacheConfig {
    /// The staleness window, or `None` when expiry is disabled
    pub fn max_age(&self) -> Option<Duration> {
        if self.max_age_days == 0 {
            None
        } else {
            Some(Duration::days(self.max_age_days))
        }
    }
}

/// Failure-classification overrides
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Treat an access-denied first page of a watchlist like a private
    /// one (empty, cached) instead of aborting the session
    #[serde(rename = "treat-denied-watchlist-as-private")]
    pub treat_denied_watchlist_as_private: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            treat_denied_watchlist_as_private: true,
        }
    }
}
