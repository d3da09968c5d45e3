use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Minimum accepted check interval. Upstream APIs are rate limited.
pub const MIN_INTERVAL_SECS: u64 = 5;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid interval_secs: {0}. Must be at least {MIN_INTERVAL_SECS}")]
    InvalidInterval(u64),

    #[error("Invalid server port: 0")]
    InvalidPort,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid storage backend: {0}. Must be one of: sqlite, memory")]
    InvalidStorageBackend(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid repository: {0}. Must be shaped owner/repo")]
    InvalidRepository(String),

    #[error("Invalid hits_per_page: {0}. Must be between 1 and 100")]
    InvalidHitsPerPage(u32),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .dropwatch/config.yaml
    /// 3. .dropwatch/local.yaml (optional local overrides)
    /// 4. Environment variables (DROPWATCH_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        let config: Config = Self::base_figment()
            .merge(Yaml::file(".dropwatch/config.yaml"))
            .merge(Yaml::file(".dropwatch/local.yaml"))
            .merge(Env::prefixed("DROPWATCH_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Self::base_figment()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("DROPWATCH_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn base_figment() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.schedule.interval_secs < MIN_INTERVAL_SECS {
            return Err(ConfigError::InvalidInterval(config.schedule.interval_secs));
        }

        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        // Storage
        match config.storage.backend.as_str() {
            "memory" => {}
            "sqlite" if config.storage.path.trim().is_empty() => {
                return Err(ConfigError::EmptyDatabasePath);
            }
            "sqlite" => {}
            other => return Err(ConfigError::InvalidStorageBackend(other.to_string())),
        }

        // Sources
        let pages = &config.sources.pages;
        if pages.urls.iter().any(|url| url.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "page URLs cannot be empty".to_string(),
            ));
        }
        if pages.max_fragment_len == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_fragment_len must be at least 1".to_string(),
            ));
        }

        let hits = config.sources.discussion.hits_per_page;
        if !(1..=100).contains(&hits) {
            return Err(ConfigError::InvalidHitsPerPage(hits));
        }

        for repo in &config.sources.releases.repositories {
            let shaped = repo
                .split_once('/')
                .is_some_and(|(owner, name)| {
                    !owner.is_empty() && !name.is_empty() && !name.contains('/')
                });
            if !shaped {
                return Err(ConfigError::InvalidRepository(repo.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schedule.interval_secs, 60);
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.storage.path, ".dropwatch/subscriptions.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.sources.pages.max_fragment_len, 200);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
schedule:
  interval_secs: 30
server:
  port: 9999
  trigger_token: s3cret
sources:
  catalog:
    api_key: sk-test
  releases:
    repositories:
      - owner/one
logging:
  level: debug
  format: pretty
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.schedule.interval_secs, 30);
        assert!(config.schedule.run_on_startup);
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.trigger_token.as_deref(), Some("s3cret"));
        assert_eq!(config.sources.catalog.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.sources.catalog.api_version, "2023-06-01");
        assert_eq!(config.sources.releases.repositories, vec!["owner/one"]);
        assert_eq!(config.logging.format, "pretty");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_short_interval() {
        let mut config = Config::default();
        config.schedule.interval_secs = 2;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidInterval(2))
        ));
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidPort)
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_validate_invalid_rotation() {
        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRotation(_))
        ));
    }

    #[test]
    fn test_validate_storage() {
        let mut config = Config::default();
        config.storage.backend = "redis".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidStorageBackend(_))
        ));

        config.storage.backend = "sqlite".to_string();
        config.storage.path = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDatabasePath)
        ));

        config.storage.backend = "memory".to_string();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_repository_shape() {
        for bad in ["noslash", "/repo", "owner/", "a/b/c"] {
            let mut config = Config::default();
            config.sources.releases.repositories = vec![bad.to_string()];
            assert!(
                matches!(
                    ConfigLoader::validate(&config),
                    Err(ConfigError::InvalidRepository(_))
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_hits_per_page_bounds() {
        let mut config = Config::default();
        config.sources.discussion.hits_per_page = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidHitsPerPage(0))
        ));
        config.sources.discussion.hits_per_page = 101;
        assert!(ConfigLoader::validate(&config).is_err());
        config.sources.discussion.hits_per_page = 100;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_page_list() {
        let mut config = Config::default();
        config.sources.pages.urls.push(String::new());
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ValidationFailed(_))
        ));

        let mut config = Config::default();
        config.sources.pages.max_fragment_len = 0;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_env_override() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "schedule:\n  interval_secs: 45\nlogging:\n  level: warn").unwrap();
        file.flush().unwrap();

        temp_env::with_vars(
            [
                ("DROPWATCH_SCHEDULE__INTERVAL_SECS", Some("90")),
                ("DROPWATCH_SOURCES__CATALOG__API_KEY", Some("from-env")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.schedule.interval_secs, 90, "env should win");
                assert_eq!(config.logging.level, "warn", "file value should persist");
                assert_eq!(config.sources.catalog.api_key.as_deref(), Some("from-env"));
            },
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "schedule:\n  interval_secs: 30\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "schedule:\n  interval_secs: 15\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.schedule.interval_secs, 15, "Override should win");
        assert_eq!(
            config.logging.level, "debug",
            "Override should win for nested fields"
        );
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        temp_env::with_vars_unset(["DROPWATCH_SCHEDULE__INTERVAL_SECS"], || {
            let config = ConfigLoader::load_from_file("/nonexistent/dropwatch.yaml").unwrap();
            assert_eq!(config.schedule.interval_secs, 60);
        });
    }
}
