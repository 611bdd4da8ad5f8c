//! Storage directory preparation and working-directory cleanup.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tokio::fs;
use tracing::{debug, info};

use gfs_common::{FetchError, FetchResult, Run};

/// Name of the dated directory for one run: `<YYYYMMDD>_<RUN>`.
pub fn dated_dir_name(date: NaiveDate, run: Run) -> String {
    format!("{}_{}", date.format("%Y%m%d"), run)
}

/// Directory downloads are written to.
///
/// With a storage root this is `<root>/<YYYYMMDD>_<RUN>`, otherwise the
/// process's current working directory.
pub fn target_dir(storage_root: Option<&Path>, date: NaiveDate, run: Run) -> FetchResult<PathBuf> {
    match storage_root {
        Some(root) => Ok(root.join(dated_dir_name(date, run))),
        None => std::env::current_dir().map_err(|e| FetchError::filesystem(".", e)),
    }
}

/// Create `dir` and its parents if they do not exist yet.
pub async fn prepare_dir(dir: &Path) -> FetchResult<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| FetchError::filesystem(dir, e))?;
    debug!(path = %dir.display(), "Storage directory ready");
    Ok(())
}

/// Remove regular files in `dir` whose names start with one of `prefixes`.
///
/// A missing directory counts as already clean. Subdirectories and
/// non-matching files are left alone. Returns the number of files removed.
pub async fn cleanup_dir(dir: &Path, prefixes: &[String]) -> FetchResult<usize> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %dir.display(), "Nothing to clean up");
            return Ok(0);
        }
        Err(e) => return Err(FetchError::filesystem(dir, e)),
    };

    let mut removed = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FetchError::filesystem(dir, e))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| FetchError::filesystem(&path, e))?;
        if !file_type.is_file() {
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            continue;
        }

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed previous file");
                removed += 1;
            }
            // Removed by someone else in the meantime.
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(FetchError::filesystem(&path, e)),
        }
    }

    if removed > 0 {
        info!(path = %dir.display(), removed = removed, "Cleaned up previous downloads");
    }
    Ok(removed)
}
