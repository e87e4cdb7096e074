//! Configuration module for Reel-Diff
//!
//! Configuration is an optional TOML file; every key has a default so the
//! tool runs with no file at all.
//!
//! ```toml
//! [source]
//! base-url = "https://letterboxd.com/"
//!
//! [cache]
//! database-path = "./reel-diff.db"
//! max-age-days = 7
//!
//! [rules]
//! treat-denied-watchlist-as-private = true
//! ```

mod parser;
mod types;

pub use parser::{load_config, load_config_or_default, validate_config};
pub use types::{CacheConfig, Config, RulesConfig, SourceConfig};
