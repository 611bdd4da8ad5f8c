//! Fetches bounding-box subsets of GFS 0.25 degree files from NOMADS.

pub mod config;
pub mod download;
pub mod session;
pub mod storage;

pub use config::{FetcherConfig, Overrides, ValidatedConfig};
pub use download::{DownloadConfig, DownloadManager, DownloadedFile, Fetch};
pub use session::{FailedHour, Session, SessionPlan, SessionSummary};
