//! One complete download session.
//!
//! A session picks the run and forecast window from the clock, prepares the
//! target directory, clears out the previous batch and then downloads one
//! filter URL per forecast hour, strictly one after another. A failed hour is
//! logged and skipped; the loop always runs to the end.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{error, info, instrument, warn};

use gfs_common::{
    select_run, Clock, FetchResult, FilterRequest, ForecastHour, ForecastHours, RunSelection,
};

use crate::config::ValidatedConfig;
use crate::download::Fetch;
use crate::storage;

/// Everything decided before the first request.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub selection: RunSelection,
    pub date: NaiveDate,
    pub target_dir: PathBuf,
    pub request: FilterRequest,
}

impl SessionPlan {
    pub fn hours(&self) -> ForecastHours {
        self.selection.hours()
    }

    /// `(forecast hour, url)` pairs in request order.
    pub fn urls(&self) -> impl Iterator<Item = (ForecastHour, String)> + '_ {
        self.hours().map(move |hour| (hour, self.request.url(hour)))
    }
}

/// A forecast hour that could not be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedHour {
    pub forecast_hour: ForecastHour,
    pub url: String,
    pub kind: &'static str,
    pub error: String,
}

/// Outcome of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub bytes: u64,
    pub files: Vec<PathBuf>,
    pub failures: Vec<FailedHour>,
}

impl SessionSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when at least one download was attempted and none succeeded.
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.succeeded == 0
    }
}

/// Drives a session with an injected fetcher and clock.
pub struct Session<F, C> {
    config: ValidatedConfig,
    fetcher: F,
    clock: C,
}

impl<F: Fetch, C: Clock> Session<F, C> {
    pub fn new(config: ValidatedConfig, fetcher: F, clock: C) -> Self {
        Self {
            config,
            fetcher,
            clock,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Decide run, window, reference date and target directory.
    pub fn plan(&self) -> FetchResult<SessionPlan> {
        let now = self.clock.now();
        let selection = select_run(
            self.config.run,
            self.clock.hour(),
            self.config.availability_cutoff_hour,
        );

        if selection.forced {
            info!(
                configured = %self.config.run,
                local_time = %now.format("%H:%M"),
                cutoff_hour = self.config.availability_cutoff_hour,
                "00Z run not yet published, using 00Z with later forecast hours"
            );
        }

        let date = self.config.explicit_date.unwrap_or_else(|| self.clock.today());
        let target_dir =
            storage::target_dir(self.config.storage_root.as_deref(), date, selection.run)?;

        let request = FilterRequest::new(
            self.config.base_url.clone(),
            selection.run,
            date,
            self.config.bbox,
            self.config.product,
        );

        Ok(SessionPlan {
            selection,
            date,
            target_dir,
            request,
        })
    }

    /// Create the target directory and clear the data directory.
    pub async fn prepare(&self, plan: &SessionPlan) -> FetchResult<()> {
        storage::prepare_dir(&plan.target_dir).await?;

        if self.config.cleanup.enabled {
            storage::cleanup_dir(&self.config.cleanup.data_dir, &self.config.cleanup.prefixes)
                .await?;
        }

        Ok(())
    }

    /// Plan, prepare and download every forecast hour in order.
    ///
    /// Only planning and preparation errors are returned; download failures
    /// end up in the summary.
    #[instrument(skip(self))]
    pub async fn run(&self) -> FetchResult<SessionSummary> {
        let plan = self.plan()?;
        self.prepare(&plan).await?;
        Ok(self.download_all(&plan).await)
    }

    /// The sequential download loop.
    pub async fn download_all(&self, plan: &SessionPlan) -> SessionSummary {
        let total = plan.hours().len();
        info!(
            run = %plan.selection.run,
            date = %plan.date.format("%Y%m%d"),
            window_start = plan.selection.window.start,
            window_end = plan.selection.window.end,
            step = plan.selection.window.step,
            count = total,
            dir = %plan.target_dir.display(),
            "Starting download session"
        );

        let mut summary = SessionSummary::default();

        for (index, (hour, url)) in plan.urls().enumerate() {
            summary.attempted += 1;
            let file_name = plan.request.file_name(hour);

            info!(
                forecast_hour = %hour,
                progress = %format!("{}/{}", index + 1, total),
                url = %url,
                "Downloading"
            );

            match self.fetcher.fetch(&url, &file_name, &plan.target_dir).await {
                Ok(file) => {
                    info!(
                        forecast_hour = %hour,
                        path = %file.path.display(),
                        bytes = file.bytes,
                        "Download complete"
                    );
                    summary.succeeded += 1;
                    summary.bytes += file.bytes;
                    summary.files.push(file.path);
                }
                Err(e) => {
                    warn!(
                        forecast_hour = %hour,
                        kind = e.kind(),
                        error = %e,
                        "Download failed, continuing with next forecast hour"
                    );
                    summary.failures.push(FailedHour {
                        forecast_hour: hour,
                        url,
                        kind: e.kind(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if summary.all_failed() {
            error!(attempted = summary.attempted, "Every download failed");
        }

        let failed_hours: Vec<String> = summary
            .failures
            .iter()
            .map(|f| f.forecast_hour.to_string())
            .collect();
        info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed(),
            failed_hours = %failed_hours.join(","),
            total_bytes = summary.bytes,
            "Download session complete"
        );

        summary
    }

    /// Log every URL of the plan without downloading anything.
    pub fn dry_run(&self) -> FetchResult<Vec<String>> {
        let plan = self.plan()?;
        let urls: Vec<String> = plan
            .urls()
            .map(|(hour, url)| {
                info!(forecast_hour = %hour, url = %url, "Would download");
                url
            })
            .collect();
        info!(
            count = urls.len(),
            dir = %plan.target_dir.display(),
            "Dry run complete"
        );
        Ok(urls)
    }
}
