//! Engine configuration
//!
//! Loaded from a YAML file; the Unix-socket path stays a command-line
//! argument because every deployment points it somewhere else.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tracing filter directive (overridden by `RUST_LOG`)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Upstream feed endpoint and poll cadence
    pub feed: FeedConfig,

    /// OnCourt MySQL mirror
    pub database: DatabaseConfig,

    /// MongoDB match archive
    pub mongo: MongoConfig,

    /// Directory holding the `atp.txt` / `wta.txt` player maps
    pub players_dir: String,

    /// Unix-socket listener tuning
    #[serde(default)]
    pub socket: SocketConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed URL with a `{kind}` placeholder (`pre` / `liv`)
    pub url_template: String,

    /// Seconds between poll cycles
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketConfig {
    /// Listen backlog for the Unix socket
    #[serde(default = "default_backlog")]
    pub backlog: i32,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            backlog: default_backlog(),
        }
    }
}

fn default_log_level() -> String {
    "info,live_score=debug".to_string()
}

fn default_poll_secs() -> u64 {
    5
}

fn default_backlog() -> i32 {
    0x4000
}

impl Config {
    /// Load configuration from YAML file
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let config: Config = serde_yaml::from_str(&yaml_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if !self.feed.url_template.contains("{kind}") {
            return Err(ConfigError::ValidationError(
                "feed.url_template must contain the {kind} placeholder".to_string(),
            ));
        }

        if self.feed.poll_secs == 0 {
            return Err(ConfigError::ValidationError(
                "feed.poll_secs must be greater than 0".to_string(),
            ));
        }

        if self.socket.backlog <= 0 {
            return Err(ConfigError::ValidationError(
                "socket.backlog must be greater than 0".to_string(),
            ));
        }

        if self.players_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "players_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
feed:
  url_template: "http://livefeeds.example.com/feed/betennis_{kind}_ru"
database:
  url: "mysql://bt:bt@localhost/oncourt"
mongo:
  uri: "mongodb://127.0.0.1"
players_dir: "/etc/bt/players.data"
"#;

    #[test]
    fn sample_config_parses_with_defaults() {
        let config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.feed.poll_secs, 5);
        assert_eq!(config.socket.backlog, 0x4000);
        assert_eq!(config.log_level, "info,live_score=debug");
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let mut config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        config.feed.url_template = "http://livefeeds.example.com/feed/fixed".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let mut config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        config.feed.poll_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.mongo.uri, "mongodb://127.0.0.1");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(matches!(
            Config::load("/nonexistent/config.yaml"),
            Err(ConfigError::FileError(_))
        ));
    }
}
