//! Single-attempt HTTP downloads.
//!
//! Each call issues one GET, rejects error statuses and text failure pages,
//! and streams the body to `<name>.partial` before renaming it into place.
//! There is no retry or resumption.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client, Response};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use gfs_common::DownloadError;

/// A file written by a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Something that can fetch a URL into a directory.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Download `url` into `dest_dir`.
    ///
    /// `fallback_name` is used when the server does not name the file.
    async fn fetch(
        &self,
        url: &str,
        fallback_name: &str,
        dest_dir: &Path,
    ) -> Result<DownloadedFile, DownloadError>;
}

/// Configuration for the download manager.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Whole-request timeout
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// reqwest-backed [`Fetch`] implementation.
pub struct DownloadManager {
    client: Client,
}

impl DownloadManager {
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("gfs-fetcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for DownloadManager {
    #[instrument(skip(self, dest_dir), fields(url = %url))]
    async fn fetch(
        &self,
        url: &str,
        fallback_name: &str,
        dest_dir: &Path,
    ) -> Result<DownloadedFile, DownloadError> {
        let response = self.client.get(url).send().await.map_err(from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if is_failure_content_type(&content_type) {
            return Err(DownloadError::FailurePage { content_type });
        }

        let name = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_content_disposition)
            .and_then(|n| sanitize_file_name(&n))
            .or_else(|| sanitize_file_name(fallback_name))
            .unwrap_or_else(|| "gfs.download".to_string());

        let final_path = unique_path(dest_dir, &name).await;
        let temp_path = partial_path(&final_path);

        let bytes = match stream_to_file(response, &temp_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                fs::remove_file(&temp_path).await.ok();
                return Err(e);
            }
        };

        if bytes == 0 {
            fs::remove_file(&temp_path).await.ok();
            return Err(DownloadError::EmptyBody);
        }

        finish_partial(&temp_path, &final_path).await?;
        debug!(path = %final_path.display(), bytes = bytes, "Saved response body");

        Ok(DownloadedFile {
            path: final_path,
            bytes,
        })
    }
}

fn from_reqwest(err: reqwest::Error) -> DownloadError {
    if err.is_timeout() {
        DownloadError::Timeout
    } else {
        DownloadError::Http(err.to_string())
    }
}

/// Stream response body to file, returning the number of bytes written.
async fn stream_to_file(response: Response, path: &Path) -> Result<u64, DownloadError> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await?;

    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(from_reqwest)?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;

    Ok(written)
}

/// NOMADS reports missing runs and bad parameters as HTML or plain text.
pub fn is_failure_content_type(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("text/")
}

/// Extract `filename` from a Content-Disposition header value.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        let (key, val) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let val = val.trim().trim_matches('"');
        (!val.is_empty()).then(|| val.to_string())
    })
}

/// Keep only the final path component so a server cannot write elsewhere.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?.trim();
    if last.is_empty() || last == "." || last == ".." {
        None
    } else {
        Some(last.to_string())
    }
}

/// `dir/name`, or `dir/name.1`, `dir/name.2`, ... when taken.
pub async fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !path_exists(&candidate).await {
        return candidate;
    }

    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{}.{}", name, n));
        if !path_exists(&candidate).await {
            return candidate;
        }
        n += 1;
    }
}

async fn path_exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}

/// Move a completed `.partial` file into place, removing it if that fails.
async fn finish_partial(temp_path: &Path, final_path: &Path) -> Result<(), DownloadError> {
    if let Err(e) = fs::rename(temp_path, final_path).await {
        fs::remove_file(temp_path).await.ok();
        return Err(e.into());
    }
    Ok(())
}

fn partial_path(final_path: &Path) -> PathBuf {
    let mut name = final_path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}
