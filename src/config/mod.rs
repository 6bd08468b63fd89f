//! Configuration for a friend-circle run.
//!
//! Settings are read from `settings.yaml` and theme presets from
//! `rules.yaml`. Missing fields use default values; [`Config::validate`]
//! fills the remaining defaults and rejects values the run cannot use.

pub mod rules;

pub use rules::{FriendsPageRule, Preset, Rules};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::FriendLink;

/// Default number of friends processed concurrently.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

/// Retry count used when the configured value is negative.
pub const DEFAULT_RETRY: u32 = 2;

/// Environment variable that overrides the configured user agent.
pub const USER_AGENT_ENV: &str = "FRIEND_CIRCLE_UA";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "LINK")]
    pub link_sources: Vec<LinkSource>,
    #[serde(rename = "SETTINGS_FRIENDS_LINKS")]
    pub static_friends: Vec<FriendLink>,
    /// Maximum posts taken from one feed, 0 for no limit.
    #[serde(rename = "MAX_POSTS_NUM")]
    pub max_posts_num: i64,
    /// Retention window in days, 0 disables cleanup.
    #[serde(rename = "OUTDATE_CLEAN")]
    pub outdate_clean_days: i64,
    #[serde(rename = "SIMPLE_MODE")]
    pub simple_mode: bool,
    #[serde(rename = "RESET_ON_START")]
    pub reset_on_start: bool,
    #[serde(rename = "DATABASE")]
    pub database: DatabaseConfig,
    #[serde(rename = "CONCURRENCY")]
    pub concurrency: ConcurrencyConfig,
    #[serde(rename = "PROXY")]
    pub proxy: ProxyConfig,
    #[serde(rename = "USER_AGENT")]
    pub user_agent: String,
    #[serde(rename = "LOG_LEVEL")]
    pub log_level: String,
    #[serde(rename = "LOG_FORMAT")]
    pub log_format: String,
    #[serde(rename = "LOG_COLOR")]
    pub log_color: String,
}

/// A place friends are listed. Only `type: page` sources are read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub theme: String,
}

impl LinkSource {
    pub fn is_page(&self) -> bool {
        self.kind == "page"
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub dsn: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    pub fetch: i64,
    pub retry: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub http: String,
    pub https: String,
}

impl Config {
    /// Load and validate settings from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config = Self::from_yaml(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse settings without validating them.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Reject unusable values and fill in defaults.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.max_posts_num < 0 {
            return Err(ConfigError::Invalid("MAX_POSTS_NUM must be >= 0".into()));
        }
        if self.outdate_clean_days < 0 {
            return Err(ConfigError::Invalid("OUTDATE_CLEAN must be >= 0".into()));
        }
        if self.database.kind.is_empty() {
            self.database.kind = "sqlite".into();
        }
        if self.database.kind != "sqlite" {
            return Err(ConfigError::Invalid(format!(
                "unsupported database type: {}",
                self.database.kind
            )));
        }
        if self.database.dsn.is_empty() {
            self.database.dsn = "./data.db".into();
        }
        if self.concurrency.fetch <= 0 {
            self.concurrency.fetch = DEFAULT_FETCH_CONCURRENCY as i64;
        }
        if self.concurrency.retry < 0 {
            self.concurrency.retry = DEFAULT_RETRY as i64;
        }
        for proxy in [&self.proxy.http, &self.proxy.https] {
            if !proxy.is_empty() {
                url::Url::parse(proxy)
                    .map_err(|e| ConfigError::Invalid(format!("invalid proxy {}: {}", proxy, e)))?;
            }
        }
        if self.user_agent.is_empty() {
            self.user_agent = DEFAULT_USER_AGENT.into();
        }
        if self.log_level.is_empty() {
            self.log_level = "info".into();
        }
        if self.log_format.is_empty() {
            self.log_format = "pretty".into();
        }
        if self.log_color.is_empty() {
            self.log_color = "auto".into();
        }
        Ok(())
    }

    pub fn max_posts(&self) -> usize {
        self.max_posts_num.max(0) as usize
    }

    pub fn retention_days(&self) -> u32 {
        self.outdate_clean_days.clamp(0, u32::MAX as i64) as u32
    }

    pub fn fetch_concurrency(&self) -> usize {
        self.concurrency.fetch.max(1) as usize
    }

    pub fn retry(&self) -> u32 {
        self.concurrency.retry.clamp(0, u32::MAX as i64) as u32
    }

    /// User agent sent with every request; the environment override wins.
    pub fn effective_user_agent(&self) -> String {
        match std::env::var(USER_AGENT_ENV) {
            Ok(ua) if !ua.trim().is_empty() => ua,
            _ if !self.user_agent.is_empty() => self.user_agent.clone(),
            _ => DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn page_sources(&self) -> impl Iterator<Item = &LinkSource> {
        self.link_sources.iter().filter(|s| s.is_page())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
LINK:
  - type: page
    url: https://blog.example/links
    theme: butterfly
  - type: json
    url: https://blog.example/friends.json
SETTINGS_FRIENDS_LINKS:
  - name: Alice
    link: https://alice.example
    avatar: https://alice.example/a.png
    feed_suffix: /atom.xml
MAX_POSTS_NUM: 5
OUTDATE_CLEAN: 60
CONCURRENCY:
  fetch: 4
  retry: 1
"#;

    #[test]
    fn test_sample_config_deserializes() {
        let mut config = Config::from_yaml(SAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(config.link_sources.len(), 2);
        assert_eq!(config.page_sources().count(), 1);
        assert_eq!(config.static_friends[0].feed_suffix, "/atom.xml");
        assert_eq!(config.max_posts(), 5);
        assert_eq!(config.retention_days(), 60);
        assert_eq!(config.fetch_concurrency(), 4);
        assert_eq!(config.retry(), 1);
    }

    #[test]
    fn test_defaults_applied() {
        let mut config =
            Config::from_yaml("LINK: []\nSETTINGS_FRIENDS_LINKS: []\nSIMPLE_MODE: true\n").unwrap();
        config.validate().unwrap();

        assert!(config.simple_mode);
        assert_eq!(config.database.kind, "sqlite");
        assert_eq!(config.database.dsn, "./data.db");
        assert_eq!(config.fetch_concurrency(), DEFAULT_FETCH_CONCURRENCY);
        assert_eq!(config.retry(), 0);
        assert_eq!(config.log_format, "pretty");
        assert_eq!(config.log_color, "auto");
    }

    #[test]
    fn test_empty_config() {
        let mut config = Config::from_yaml("").unwrap();
        config.validate().unwrap();
        assert!(config.link_sources.is_empty());
        assert!(!config.simple_mode);
    }

    #[test]
    fn test_negative_values_rejected_or_defaulted() {
        let mut config = Config::from_yaml("MAX_POSTS_NUM: -1\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::from_yaml("OUTDATE_CLEAN: -3\n").unwrap();
        assert!(config.validate().is_err());

        let mut config = Config::from_yaml("CONCURRENCY:\n  fetch: 0\n  retry: -1\n").unwrap();
        config.validate().unwrap();
        assert_eq!(config.fetch_concurrency(), DEFAULT_FETCH_CONCURRENCY);
        assert_eq!(config.retry(), DEFAULT_RETRY);
    }

    #[test]
    fn test_unsupported_database_rejected() {
        let mut config = Config::from_yaml("DATABASE:\n  type: mysql\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.static_friends[0].name, "Alice");

        let missing = Config::load(&dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
