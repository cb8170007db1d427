//! Loads configuration from a TOML file plus `COURSE_BUILDER_*` environment
//! overrides. A `.env` file in the working directory is honoured.

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use super::Config;

const ENV_BASE_URL: &str = "COURSE_BUILDER_API_URL";
const ENV_TOKEN: &str = "COURSE_BUILDER_API_TOKEN";
const ENV_TIMEOUT: &str = "COURSE_BUILDER_API_TIMEOUT";
const ENV_MAX_IN_FLIGHT: &str = "COURSE_BUILDER_MAX_IN_FLIGHT";
const ENV_LOG: &str = "COURSE_BUILDER_LOG";

/// `<config_dir>/course-builder/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("course-builder").join("config.toml"))
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Load config from an explicit path, or the default location if it exists.
/// A missing default file is not an error; a missing explicit file is.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    load_with_source(explicit).map(|(config, _)| config)
}

/// Same as `load`, also reporting which file (if any) was read. Runs before
/// logging is set up, so callers log the source themselves.
pub fn load_with_source(explicit: Option<&Path>) -> Result<(Config, ConfigSource)> {
    let _ = dotenvy::dotenv();

    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|path| path.exists()),
    };
    let (mut config, source) = match path {
        Some(path) => (load_from_path(&path)?, ConfigSource::File(path)),
        None => (Config::default(), ConfigSource::Defaults),
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok((config, source))
}

/// Parse a TOML config file
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_BASE_URL) {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(token) = lookup(ENV_TOKEN) {
        config.api.token = Some(token);
    }
    if let Some(timeout) = lookup(ENV_TIMEOUT) {
        config.api.timeout_secs = timeout
            .parse()
            .with_context(|| format!("{} must be a number of seconds", ENV_TIMEOUT))?;
    }
    if let Some(max) = lookup(ENV_MAX_IN_FLIGHT) {
        let max: usize = max
            .parse()
            .with_context(|| format!("{} must be a positive integer", ENV_MAX_IN_FLIGHT))?;
        config.sync.max_in_flight = max.max(1);
    }
    if let Some(level) = lookup(ENV_LOG) {
        config.logging.level = level;
    }
    Ok(())
}
