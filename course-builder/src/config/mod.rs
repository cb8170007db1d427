//! Configuration for the course builder
//!
//! Provides a unified configuration for the remote API, the persistence
//! synchronizer and logging, with sane defaults for every field.

pub mod loader;

pub use loader::{ConfigSource, default_config_path, load, load_from_path, load_with_source};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Remote store connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST backend, without trailing slash
    pub base_url: String,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Persistence synchronizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum update requests of one batch in flight at once
    pub max_in_flight: usize,
    /// Warn when a batch is dispatched while an earlier one is still running
    pub warn_on_overlap: bool,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// env_logger filter string, e.g. "info" or "course_builder=debug"
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 8,
            warn_on_overlap: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Create a new builder for Config
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.api.token = Some(token.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.api.timeout_secs = secs;
        self
    }

    /// Zero is clamped to one so a batch can always make progress
    pub fn max_in_flight(mut self, max: usize) -> Self {
        self.config.sync.max_in_flight = max.max(1);
        self
    }

    pub fn warn_on_overlap(mut self, enabled: bool) -> Self {
        self.config.sync.warn_on_overlap = enabled;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.sync.max_in_flight, 8);
        assert!(config.sync.warn_on_overlap);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_builder_pattern() {
        let config = Config::builder()
            .base_url("https://lms.example.org/api/")
            .token("secret")
            .max_in_flight(0)
            .log_level("debug")
            .build();

        assert_eq!(config.api.base_url, "https://lms.example.org/api");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.sync.max_in_flight, 1);
        assert_eq!(config.logging.level, "debug");
    }
}
