use anyhow::{bail, Context, Result};
use clap::crate_version;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};

use crate::config::Config;
use crate::location::FetchOutcome;
use crate::table::load_locations;

/// Number of successful downloads between usage log writes.
pub const CHECKPOINT_INTERVAL: u64 = 10;

const ZERO_DURATION: Duration = Duration::from_secs(0);

/// Why a run ended before the last location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Halt {
    /// The usage count reached the quota ceiling.
    QuotaReached { count: u64 },
    /// The API answered 403 or 429.
    Stopped(StatusCode),
}

/// Result of a single run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchSummary {
    /// Locations read from the input.
    pub total: usize,
    pub downloaded: u64,
    pub skipped: u64,
    pub failed: u64,
    pub halt: Option<Halt>,
    /// The usage count after the run, if usage is tracked.
    pub usage: Option<u64>,
}

/// Fetch one image per location listed in `cfg.input` and save them to
/// `cfg.output_folder`, one location after the other.
///
/// Locations whose image already exists are skipped. With usage tracking the
/// run refuses to start, or stops, once the quota ceiling is reached and the
/// count is persisted every [`CHECKPOINT_INTERVAL`] downloads and at the end.
///
/// # Example
/// ```rust,no_run
/// use static_map_downloader::{fetch, Config, ImageStyle, UrlTemplate};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = Config {
///     input: "train.csv".into(),
///     output_folder: "./images".into(),
///     url: UrlTemplate::mapbox(ImageStyle::default(), "pk.my-token".into()),
///     timeout: Duration::from_secs(10),
///     download_delay: Duration::from_millis(50),
///     usage: None,
/// };
///
/// let summary = fetch(config).await.expect("failed fetching images");
/// println!("downloaded {} images", summary.downloaded);
/// # }
/// ```
pub async fn fetch(cfg: Config) -> Result<FetchSummary> {
    let output_folder = cfg.output_folder.as_path();

    if output_folder.exists() && !output_folder.is_dir() {
        bail!("output {} must be a directory", output_folder.display());
    }

    if !output_folder.exists() {
        fs::create_dir_all(output_folder)
            .await
            .context("failed to create output directory")?;
        info!("created output directory {}", output_folder.display());
    }

    let locations = load_locations(&cfg.input)?;
    let mut summary = FetchSummary {
        total: locations.len(),
        ..Default::default()
    };

    let mut usage = match &cfg.usage {
        Some(quota) => {
            let count = quota.log.read()?;
            info!(count, max = quota.policy.max_allowed(), "previous API usage");

            if quota.policy.is_exhausted(count) {
                warn!(
                    "limit reached, reset {} if this is a new month",
                    quota.log.path().display()
                );
                summary.halt = Some(Halt::QuotaReached { count });
                summary.usage = Some(count);
                return Ok(summary);
            }

            Some(count)
        }
        None => None,
    };

    info!(
        "processing {} locations at zoom {}",
        locations.len(),
        cfg.url.style().zoom
    );

    let client = http_client(cfg.timeout)?;

    let pb = ProgressBar::new(locations.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:60.cyan/blue} {pos:>7}/{len:7} ETA: {eta} {msg}")
            .progress_chars("##-"),
    );

    for location in pb.wrap_iter(locations.iter()) {
        if let (Some(quota), Some(count)) = (&cfg.usage, usage) {
            if quota.policy.is_exhausted(count) {
                warn!(count, "safety stop, usage limit reached");
                summary.halt = Some(Halt::QuotaReached { count });
                break;
            }
        }

        match location.fetch_from(&client, &cfg.url, output_folder).await {
            FetchOutcome::Skipped => summary.skipped += 1,
            FetchOutcome::Error(_) => summary.failed += 1,
            FetchOutcome::Stop(status) => {
                summary.halt = Some(Halt::Stopped(status));
                break;
            }
            FetchOutcome::Downloaded => {
                summary.downloaded += 1;

                if let (Some(quota), Some(count)) = (&cfg.usage, usage.as_mut()) {
                    *count += 1;
                    if summary.downloaded % CHECKPOINT_INTERVAL == 0 {
                        quota.log.write(*count)?;
                    }
                }

                if cfg.download_delay > ZERO_DURATION {
                    tokio::time::sleep(cfg.download_delay).await;
                }
            }
        }
    }

    pb.finish_and_clear();

    if let (Some(quota), Some(count)) = (&cfg.usage, usage) {
        quota.log.write(count)?;
    }
    summary.usage = usage;

    info!(
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        failed = summary.failed,
        "batch finished, images saved to {}",
        output_folder.display()
    );

    Ok(summary)
}

/// Counts the locations in `cfg.input` that don't have an image yet.
pub fn count_pending(cfg: &Config) -> Result<usize> {
    let locations = load_locations(&cfg.input)?;

    Ok(locations
        .iter()
        .filter(|location| !location.image_path(&cfg.output_folder).exists())
        .count())
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if timeout > ZERO_DURATION {
        builder = builder.timeout(timeout);
    }

    builder
        .user_agent(format!("static-map-downloader_rs_{}", crate_version!()))
        .build()
        .with_context(|| "failed creating HTTP client")
}
