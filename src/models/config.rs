//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Placeholder left in freshly generated config files.
pub const PLACEHOLDER_APPLICATION_ID: &str = "YOUR_APPLICATION_ID";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Encyclopedia API access and pacing
    #[serde(default)]
    pub api: ApiConfig,

    /// Output locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let app_id = self.api.application_id.trim();
        if app_id.is_empty() || app_id == PLACEHOLDER_APPLICATION_ID {
            return Err(AppError::validation("api.application_id is not set"));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::validation("api.base_url is empty"));
        }
        if self.api.language.trim().is_empty() {
            return Err(AppError::validation("api.language is empty"));
        }
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Encyclopedia API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Application credential sent as `application_id`
    #[serde(default = "defaults::application_id")]
    pub application_id: String,

    /// Regional API host
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Language code for localized names
    #[serde(default = "defaults::language")]
    pub language: String,

    /// Optional field projection for listing calls
    #[serde(default)]
    pub fields: Vec<String>,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between listing pages in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Delay between per-ship image downloads in milliseconds
    #[serde(default = "defaults::ship_delay")]
    pub ship_delay_ms: u64,

    /// Delay between per-ship detail requests in milliseconds
    #[serde(default = "defaults::detail_delay")]
    pub detail_delay_ms: u64,
}

impl ApiConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn ship_delay(&self) -> Duration {
        Duration::from_millis(self.ship_delay_ms)
    }

    pub fn detail_delay(&self) -> Duration {
        Duration::from_millis(self.detail_delay_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            application_id: defaults::application_id(),
            base_url: defaults::base_url(),
            language: defaults::language(),
            fields: Vec::new(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            ship_delay_ms: defaults::ship_delay(),
            detail_delay_ms: defaults::detail_delay(),
        }
    }
}

/// Output file and directory locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Full catalog snapshot
    #[serde(default = "defaults::cache_file")]
    pub cache_file: PathBuf,

    /// Directory holding `tier_{n}.json`
    #[serde(default = "defaults::tiers_dir")]
    pub tiers_dir: PathBuf,

    /// Directory of mirrored ship images
    #[serde(default = "defaults::images_dir")]
    pub images_dir: PathBuf,

    /// Directory of per-ship detail files
    #[serde(default = "defaults::details_dir")]
    pub details_dir: PathBuf,

    /// Statistics of the last partition run
    #[serde(default = "defaults::stats_file")]
    pub stats_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_file: defaults::cache_file(),
            tiers_dir: defaults::tiers_dir(),
            images_dir: defaults::images_dir(),
            details_dir: defaults::details_dir(),
            stats_file: defaults::stats_file(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // API defaults
    pub fn application_id() -> String {
        super::PLACEHOLDER_APPLICATION_ID.into()
    }
    pub fn base_url() -> String {
        "https://api.worldofwarships.asia".into()
    }
    pub fn language() -> String {
        "ja".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; shipyard/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        200
    }
    pub fn ship_delay() -> u64 {
        200
    }
    pub fn detail_delay() -> u64 {
        300
    }

    // Path defaults
    pub fn cache_file() -> PathBuf {
        "ships_cache.json".into()
    }
    pub fn tiers_dir() -> PathBuf {
        "tiers".into()
    }
    pub fn images_dir() -> PathBuf {
        "images".into()
    }
    pub fn details_dir() -> PathBuf {
        "ships_data".into()
    }
    pub fn stats_file() -> PathBuf {
        "run_stats.json".into()
    }
}
