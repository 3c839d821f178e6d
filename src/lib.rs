//! Download one static satellite image per row of a table of coordinates.
//!
//! Every row of the input (CSV or spreadsheet) carries an `id`, a `lat` and a
//! longitude under `lon`, `long` or `longitude`. For each row an image is
//! requested from the Mapbox Static Images API and written to
//! `{output}/{id}.jpg`. Rows whose image is already on disk are skipped, so an
//! interrupted run can simply be started again.
//!
//! Every request counts against the Mapbox monthly quota. A small JSON usage
//! log keeps track of the requests made so far and the run stops before the
//! quota (minus a safety buffer) is exhausted.
//!
//! # CLI Example
//!
//! ```bash
//! MAPBOX_TOKEN=pk.xxx static-map-downloader train.csv \
//!   --output ./images_mapbox_zoom18 \
//!   --zoom 18
//! ```
//!
//! # Library Example
//! ```rust,no_run
//! use static_map_downloader::{fetch, Config, ImageStyle, QuotaPolicy, UrlTemplate, UsageLog, UsageQuota};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = Config {
//!     input: "train.csv".into(),
//!     output_folder: "./images".into(),
//!     url: UrlTemplate::mapbox(ImageStyle::default(), "pk.my-token".into()),
//!     timeout: Duration::from_secs(10),
//!     download_delay: Duration::from_millis(50),
//!     usage: Some(UsageQuota {
//!         log: UsageLog::new("mapbox_usage_log.json"),
//!         policy: QuotaPolicy::default(),
//!     }),
//! };
//!
//! fetch(config).await.expect("failed fetching images");
//! # }
//! ```

mod config;
mod fetch;
mod location;
mod table;
mod url;
mod usage;

pub use config::Config;
pub use fetch::{count_pending, fetch, FetchSummary, Halt, CHECKPOINT_INTERVAL};
pub use location::{FetchOutcome, Location};
pub use table::{load_locations, normalize_id, Table};
pub use url::{ImageStyle, UrlTemplate, MAPBOX_STATIC_URL};
pub use usage::{QuotaPolicy, UsageLog, UsageQuota, MONTHLY_LIMIT, SAFETY_BUFFER};
