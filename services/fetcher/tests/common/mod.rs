//! Shared helpers for fetcher integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use gfs_common::DownloadError;
use gfs_fetcher::download::unique_path;
use gfs_fetcher::{DownloadedFile, Fetch, FetcherConfig, ValidatedConfig};

/// Canned failure for a given call index.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Status(u16),
    Page,
    Timeout,
}

impl Failure {
    fn to_error(self) -> DownloadError {
        match self {
            Failure::Status(code) => DownloadError::Status(code),
            Failure::Page => DownloadError::FailurePage {
                content_type: "text/html".to_string(),
            },
            Failure::Timeout => DownloadError::Timeout,
        }
    }
}

/// In-memory fetcher that records URLs and writes a small payload.
#[derive(Default)]
pub struct FakeFetcher {
    calls: Mutex<Vec<String>>,
    failures: HashMap<usize, Failure>,
    fail_all: bool,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(calls: &[(usize, Failure)]) -> Self {
        Self {
            failures: calls.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn always_failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for FakeFetcher {
    async fn fetch(
        &self,
        url: &str,
        fallback_name: &str,
        dest_dir: &Path,
    ) -> Result<DownloadedFile, DownloadError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(url.to_string());
            calls.len() - 1
        };

        if self.fail_all {
            return Err(DownloadError::Status(404));
        }
        if let Some(failure) = self.failures.get(&index) {
            return Err(failure.to_error());
        }

        let path = unique_path(dest_dir, fallback_name).await;
        let payload = b"GRIB\x00\x00\x00\x02fake7777";
        tokio::fs::write(&path, payload).await?;
        Ok(DownloadedFile {
            path,
            bytes: payload.len() as u64,
        })
    }
}

/// Validated config that stores under `storage_root` and cleans `data_dir`.
pub fn config_with_dirs(storage_root: &Path, data_dir: &Path) -> ValidatedConfig {
    let yaml = test_utils::config_yaml_with_dirs(
        &storage_root.to_string_lossy(),
        &data_dir.to_string_lossy(),
    );
    let config: FetcherConfig = serde_yaml::from_str(&yaml).unwrap();
    config.validate().unwrap()
}
