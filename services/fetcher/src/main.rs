//! GFS subset fetcher.
//!
//! Picks the GFS run and forecast hours for the current time of day, builds
//! one NOMADS filter URL per forecast hour and downloads them sequentially.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use gfs_common::{FetchError, SystemClock};
use gfs_fetcher::{DownloadConfig, DownloadManager, FetcherConfig, Overrides, Session};

#[derive(Parser, Debug)]
#[command(name = "gfs-fetcher")]
#[command(about = "Download a bounding-box subset of GFS 0.25 degree files from NOMADS")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "GFS_FETCHER_CONFIG", default_value = "config/fetcher.yaml")]
    config: PathBuf,

    /// Override the configured run (00, 06, 12, 18)
    #[arg(long)]
    run: Option<String>,

    /// Use this reference date (YYYY-MM-DD or YYYYMMDD) instead of today
    #[arg(long)]
    date: Option<String>,

    /// Store downloads under <DIR>/<YYYYMMDD>_<RUN>
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Filter service URL
    #[arg(long)]
    base_url: Option<String>,

    /// Keep files from previous batches
    #[arg(long)]
    no_cleanup: bool,

    /// Print the request URLs without downloading
    #[arg(long)]
    dry_run: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format);

    info!("Starting GFS fetcher");

    let mut config = FetcherConfig::load_or_default(&args.config)?;
    config.apply_overrides(Overrides {
        run: args.run,
        date: args.date,
        output_dir: args.output_dir,
        base_url: args.base_url,
        no_cleanup: args.no_cleanup,
    });
    let config = config
        .validate()
        .map_err(FetchError::from)
        .context("Invalid configuration")?;

    let downloader = DownloadManager::new(DownloadConfig {
        request_timeout: config.request_timeout,
        ..DownloadConfig::default()
    })?;

    let session = Session::new(config, downloader, SystemClock);

    if args.dry_run {
        session.dry_run()?;
        return Ok(());
    }

    let summary = session.run().await?;

    if summary.all_failed() {
        return Err(FetchError::AllDownloadsFailed(summary.attempted).into());
    }

    Ok(())
}
