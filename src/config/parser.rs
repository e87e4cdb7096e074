//! Configuration loading and validation

use crate::config::Config;
use crate::{ConfigError, ConfigResult};
use std::path::Path;
use url::Url;

/// Loads and validates a TOML configuration file.
///
/// The base URL is normalized to end with a slash so listing paths can be
/// joined onto it directly.
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let raw = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&raw)?;

    if !config.source.base_url.ends_with('/') {
        config.source.base_url.push('/');
    }

    validate_config(&config)?;
    Ok(config)
}

/// Loads the config file when a path is given, falling back to defaults
pub fn load_config_or_default(path: Option<&Path>) -> ConfigResult<Config> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    Url::parse(&config.source.base_url).map_err(|e| {
        ConfigError::Validation(format!(
            "base-url {:?} is not a valid URL: {}",
            config.source.base_url, e
        ))
    })?;

    if config.cache.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path must not be empty".to_string(),
        ));
    }

    if config.cache.max_age_days < 0 {
        return Err(ConfigError::Validation(format!(
            "max-age-days must not be negative (got {})",
            config.cache.max_age_days
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
            [source]
            base-url = "https://example.test/"

            [cache]
            database-path = "/tmp/reel.db"
            max-age-days = 3

            [rules]
            treat-denied-watchlist-as-private = false
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.source.base_url, "https://example.test/");
        assert_eq!(config.cache.database_path, "/tmp/reel.db");
        assert_eq!(config.cache.max_age_days, 3);
        assert!(!config.rules.treat_denied_watchlist_as_private);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let file = write_config(
            r#"
            [cache]
            max-age-days = 30
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.cache.max_age_days, 30);
        assert_eq!(config.source.base_url, "https://letterboxd.com/");
        assert!(config.rules.treat_denied_watchlist_as_private);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let file = write_config(
            r#"
            [source]
            base-url = "https://example.test"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.source.base_url, "https://example.test/");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let file = write_config(
            r#"
            [source]
            base-url = "not a url"
            "#,
        );

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_negative_max_age_rejected() {
        let file = write_config(
            r#"
            [cache]
            max-age-days = -1
            "#,
        );

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let file = write_config("cache = nonsense [");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_no_path_falls_back_to_defaults() {
        let config = load_config_or_default(None).unwrap();
        assert_eq!(config.cache.max_age_days, 7);
    }
}
