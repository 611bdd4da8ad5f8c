//! Error types for the GFS fetcher.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using FetchError.
pub type FetchResult<T> = Result<T, FetchError>;

/// Problems with the configured values. Raised before any network activity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid bounding box: {0}")]
    InvalidBbox(String),

    #[error("Invalid run '{0}': expected one of 00, 06, 12, 18")]
    InvalidRun(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD or YYYYMMDD")]
    InvalidDate(String),

    #[error("Invalid forecast window: {0}")]
    InvalidWindow(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),

    #[error("Invalid value for '{name}': {message}")]
    InvalidSetting { name: String, message: String },
}

/// Failure of a single forecast-hour download.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("Server returned a failure page ({content_type})")]
    FailurePage { content_type: String },

    #[error("Server returned an empty body")]
    EmptyBody,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Short label used in logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            DownloadError::Http(_) => "http",
            DownloadError::Timeout => "timeout",
            DownloadError::Status(_) => "status",
            DownloadError::FailurePage { .. } => "failure_page",
            DownloadError::EmptyBody => "empty_body",
            DownloadError::Io(_) => "io",
        }
    }
}

/// Primary error type for a fetch session.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("All {0} downloads failed")]
    AllDownloadsFailed(usize),
}

impl FetchError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Filesystem {
            path: path.into(),
            source,
        }
    }
}
