use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::coordinator::{DEFAULT_MAX_IMAGES, DEFAULT_WORKERS};
use crate::fetch::default_user_agents;
use crate::filter::{ImageFilter, DEFAULT_MIN_DIMENSION};
use crate::retry::RetryPolicy;

/// Fetch and retry parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per URL (including the first).
    pub max_attempts: u32,
    /// Per-attempt timeout in seconds (connect and whole transfer).
    pub timeout_secs: u64,
    /// Exponent base for backoff; wait after attempt i is `base^i` units.
    pub backoff_base: u32,
    /// Backoff unit in milliseconds (1000 = seconds).
    pub backoff_unit_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_secs: 10,
            backoff_base: 2,
            backoff_unit_ms: 1000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            backoff_base: self.backoff_base.max(2),
            backoff_unit: Duration::from_millis(self.backoff_unit_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Global configuration loaded from `~/.config/imgrab/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum accepted image width in pixels.
    pub min_width: u32,
    /// Minimum accepted image height in pixels.
    pub min_height: u32,
    /// Maximum images admitted into one archive.
    pub max_images: usize,
    /// Concurrent fetch workers.
    pub workers: usize,
    /// User-Agent pool; one is picked at random per URL. Empty = curl default.
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
    /// Where staging dirs and archives are created (default: OS temp dir).
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_DIMENSION,
            min_height: DEFAULT_MIN_DIMENSION,
            max_images: DEFAULT_MAX_IMAGES,
            workers: DEFAULT_WORKERS,
            user_agents: default_user_agents(),
            work_dir: None,
            retry: None,
        }
    }
}

impl CrawlerConfig {
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    pub fn image_filter(&self) -> ImageFilter {
        ImageFilter::new(self.min_width, self.min_height)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CrawlerConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CrawlerConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: CrawlerConfig = toml::from_str(&data)?;
    Ok(cfg)
}
