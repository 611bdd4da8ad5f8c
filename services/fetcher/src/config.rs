//! Configuration loading for the fetcher.
//!
//! Settings come from a YAML file (see `config/fetcher.yaml`), with command
//! line overrides applied on top. The raw [`FetcherConfig`] is validated once
//! into a [`ValidatedConfig`] before any directory or network work starts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};

use gfs_common::forecast::DEFAULT_AVAILABILITY_CUTOFF_HOUR;
use gfs_common::{
    parse_reference_date, BoundingBox, ConfigError, ProductKind, Run, NOMADS_GFS_0P25_URL,
};

/// Root configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    #[serde(default)]
    pub bbox: BboxConfig,
    #[serde(default)]
    pub run: RunSetting,
    /// Use `explicit_date` instead of today's date
    #[serde(default)]
    pub use_explicit_date: bool,
    #[serde(default)]
    pub explicit_date: Option<String>,
    /// Store files under `<storage_path>/<YYYYMMDD>_<RUN>` instead of the
    /// current directory
    #[serde(default)]
    pub use_custom_storage_path: bool,
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    #[serde(default)]
    pub product: ProductKind,
    /// Local hour before which the 00Z run is assumed unpublished
    #[serde(default = "default_cutoff_hour")]
    pub availability_cutoff_hour: u32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

fn default_cutoff_hour() -> u32 {
    DEFAULT_AVAILABILITY_CUTOFF_HOUR
}

fn default_base_url() -> String {
    NOMADS_GFS_0P25_URL.to_string()
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            bbox: BboxConfig::default(),
            run: RunSetting::default(),
            use_explicit_date: false,
            explicit_date: None,
            use_custom_storage_path: false,
            storage_path: None,
            product: ProductKind::default(),
            availability_cutoff_hour: default_cutoff_hour(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            cleanup: CleanupConfig::default(),
        }
    }
}

/// Bounding box in integer degrees.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BboxConfig {
    pub south_latitude: i32,
    pub north_latitude: i32,
    pub west_longitude: i32,
    pub east_longitude: i32,
}

impl Default for BboxConfig {
    fn default() -> Self {
        Self {
            south_latitude: 5,
            north_latitude: 45,
            west_longitude: -140,
            east_longitude: -30,
        }
    }
}

impl From<BboxConfig> for BoundingBox {
    fn from(config: BboxConfig) -> Self {
        BoundingBox::new(
            config.south_latitude,
            config.north_latitude,
            config.west_longitude,
            config.east_longitude,
        )
    }
}

/// Run as written in YAML: `"06"` and `6` are both accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RunSetting {
    Number(u32),
    Text(String),
}

impl Default for RunSetting {
    fn default() -> Self {
        RunSetting::Text("00".to_string())
    }
}

impl RunSetting {
    pub fn parse(&self) -> Result<Run, ConfigError> {
        match self {
            RunSetting::Number(hour) => {
                Run::from_hour(*hour).ok_or_else(|| ConfigError::InvalidRun(hour.to_string()))
            }
            RunSetting::Text(text) => text.parse(),
        }
    }
}

/// Removal of previous grid files before a new batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CleanupConfig {
    #[serde(default = "default_cleanup_enabled")]
    pub enabled: bool,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Only files whose names start with one of these are removed
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,
}

fn default_cleanup_enabled() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_prefixes() -> Vec<String> {
    vec!["gfs.".to_string()]
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: default_cleanup_enabled(),
            data_dir: default_data_dir(),
            prefixes: default_prefixes(),
        }
    }
}

/// Command line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub run: Option<String>,
    pub date: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub no_cleanup: bool,
}

/// Checked configuration handed to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub bbox: BoundingBox,
    pub run: Run,
    /// Replaces the clock date when set
    pub explicit_date: Option<NaiveDate>,
    /// Parent of the dated storage directory; `None` means the current directory
    pub storage_root: Option<PathBuf>,
    pub product: ProductKind,
    pub availability_cutoff_hour: u32,
    pub base_url: String,
    pub request_timeout: Duration,
    pub cleanup: CleanupConfig,
}

impl FetcherConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: FetcherConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded fetcher config");
        Ok(config)
    }

    /// Load from `path`, or fall back to built-in defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config = Self::load(path)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(run) = overrides.run {
            self.run = RunSetting::Text(run);
        }
        if let Some(date) = overrides.date {
            self.use_explicit_date = true;
            self.explicit_date = Some(date);
        }
        if let Some(dir) = overrides.output_dir {
            self.use_custom_storage_path = true;
            self.storage_path = Some(dir);
        }
        if let Some(url) = overrides.base_url {
            self.base_url = url;
        }
        if overrides.no_cleanup {
            self.cleanup.enabled = false;
        }
    }

    /// Check every setting.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let bbox = BoundingBox::from(self.bbox);
        bbox.validate()?;

        let run = self.run.parse()?;

        // A malformed date is rejected even when the toggle is off.
        let parsed_date = self
            .explicit_date
            .as_deref()
            .map(parse_reference_date)
            .transpose()?;
        let explicit_date = if self.use_explicit_date {
            Some(parsed_date.ok_or_else(|| {
                ConfigError::MissingSetting("explicit_date (use_explicit_date is true)".to_string())
            })?)
        } else {
            None
        };

        let storage_root = if self.use_custom_storage_path {
            match &self.storage_path {
                Some(path) if !path.as_os_str().is_empty() => Some(path.clone()),
                _ => {
                    return Err(ConfigError::MissingSetting(
                        "storage_path (use_custom_storage_path is true)".to_string(),
                    ))
                }
            }
        } else {
            None
        };

        if self.availability_cutoff_hour > 24 {
            return Err(ConfigError::InvalidSetting {
                name: "availability_cutoff_hour".to_string(),
                message: format!("{} is not an hour of the day", self.availability_cutoff_hour),
            });
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidSetting {
                name: "base_url".to_string(),
                message: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "request_timeout_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }

        Ok(ValidatedConfig {
            bbox,
            run,
            explicit_date,
            storage_root,
            product: self.product,
            availability_cutoff_hour: self.availability_cutoff_hour,
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            cleanup: self.cleanup.clone(),
        })
    }
}
