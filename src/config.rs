use std::{path::PathBuf, time::Duration};

use crate::url::UrlTemplate;
use crate::usage::UsageQuota;

/// Image fetching configuration.
#[derive(Debug, PartialEq)]
pub struct Config {
    /// CSV or spreadsheet with `id`, `lat` and `lon`/`long`/`longitude` columns.
    pub input: PathBuf,

    /// The folder to write `{id}.jpg` files to.
    pub output_folder: PathBuf,

    /// The URL to download individual images from.
    pub url: UrlTemplate,

    /// Timeout for fetching a single image.
    ///
    /// Pass the zero duration to disable the timeout.
    pub timeout: Duration,

    /// Pause after every successful download.
    pub download_delay: Duration,

    /// Usage log and quota to enforce, if any.
    pub usage: Option<UsageQuota>,
}
