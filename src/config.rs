//! Runtime configuration
//!
//! Values come from CLI flags or their environment variables (see `cli`),
//! falling back to the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use thiserror::Error;

use crate::cli::Cli;

/// Public Tempo API
pub const DEFAULT_API_URL: &str = "https://www.api-couleur-tempo.fr/api";

/// Deadline for each HTTP request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifetime of cached responses
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Name of the append-only log file
pub const LOG_FILE_NAME: &str = "tempotray.log";

/// Errors for invalid configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API URL is not an http(s) URL
    #[error("Invalid API URL: '{0}' (expected http:// or https://)")]
    InvalidApiUrl(String),

    /// A zero request timeout would fail every fetch
    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,

    /// The TTL in minutes does not fit in a duration in seconds
    #[error("Cache TTL too large: {0} minutes")]
    CacheTtlTooLarge(u64),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the Tempo API
    pub api_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// TTL of cached responses; zero disables caching
    pub cache_ttl: Duration,
    /// Directory holding the indicator icons
    pub assets_dir: PathBuf,
    /// Log file, `None` when no platform data directory is available
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            assets_dir: default_assets_dir(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// Builds the configuration from parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let cache_ttl = match cli.cache_ttl_minutes {
            Some(minutes) => minutes
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or(ConfigError::CacheTtlTooLarge(minutes))?,
            None => defaults.cache_ttl,
        };
        let config = Config {
            api_url: cli.api_url.clone().unwrap_or(defaults.api_url),
            timeout: cli
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            cache_ttl,
            assets_dir: cli.assets.clone().unwrap_or(defaults.assets_dir),
            log_file: cli.log_file.clone().or(defaults.log_file),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would make the application unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(self.api_url.clone()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// `assets/` next to the executable, or relative to the working directory
fn default_assets_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join("assets"))
        .unwrap_or_else(|| PathBuf::from("assets"))
}

/// Log file under the platform data directory (`~/.local/share/tempotray/` on Linux)
fn default_log_file() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "tempotray")?;
    Some(project_dirs.data_local_dir().join(LOG_FILE_NAME))
}
