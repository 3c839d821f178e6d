use clap::{
    app_from_crate, crate_authors, crate_description, crate_name, crate_version,
    App, AppSettings, Arg, ArgMatches, ErrorKind,
};
use std::{path::PathBuf, time::Duration};

use crate::validators::*;
use static_map_downloader::{
    Config, ImageStyle, QuotaPolicy, UrlTemplate, UsageLog, UsageQuota, MAPBOX_STATIC_URL,
};

const INPUT_ARG: &str = "input";
const OUTPUT_DIR_ARG: &str = "output_dir";
const SUBDIR_ARG: &str = "subdir";
const URL_ARG: &str = "url";
const TOKEN_ARG: &str = "token";
const STYLE_ARG: &str = "style";
const ZOOM_ARG: &str = "zoom";
const WIDTH_ARG: &str = "width";
const HEIGHT_ARG: &str = "height";
const TIMEOUT_ARG: &str = "timeout";
const DELAY_ARG: &str = "delay";
const USAGE_FILE_ARG: &str = "usage_file";
const NO_USAGE_LOG_ARG: &str = "no_usage_log";
const MONTHLY_LIMIT_ARG: &str = "monthly_limit";
const SAFETY_BUFFER_ARG: &str = "safety_buffer";
const DRY_RUN_ARG: &str = "dry_run";

pub struct Args {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub url: String,
    pub token: String,
    pub style: ImageStyle,
    pub timeout: Duration,
    pub delay: Duration,
    pub usage: Option<UsageQuota>,
    pub dry_run: bool,
}

impl std::convert::From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            input: args.input,
            output_folder: args.output_dir,
            url: UrlTemplate::new(args.url, args.style, args.token),
            timeout: args.timeout,
            download_delay: args.delay,
            usage: args.usage,
        }
    }
}

// values are checked by the validators, so parsing can't fail here
fn value<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> T {
    match matches.value_of(name).map(str::parse::<T>) {
        Some(Ok(val)) => val,
        _ => unreachable!("argument `{}` is validated by clap", name),
    }
}

impl Args {
    pub fn parse() -> Self {
        Self::from_matches(&app().get_matches()).unwrap_or_else(|e| e.exit())
    }

    fn from_matches(matches: &ArgMatches) -> clap::Result<Self> {
        // an empty MAPBOX_TOKEN from the environment gets past `empty_values`
        let token = matches.value_of(TOKEN_ARG).unwrap_or_default().trim();
        if token.is_empty() {
            return Err(clap::Error::with_description(
                "the access token must not be empty, set MAPBOX_TOKEN or pass --token",
                ErrorKind::EmptyValue,
            ));
        }

        let output_dir = {
            let mut buf = PathBuf::from(matches.value_of(OUTPUT_DIR_ARG).unwrap_or_default());
            if let Some(subdir) = matches.value_of(SUBDIR_ARG) {
                buf.push(subdir);
            }
            buf
        };

        let usage = if matches.is_present(NO_USAGE_LOG_ARG) {
            None
        } else {
            Some(UsageQuota {
                log: UsageLog::new(matches.value_of(USAGE_FILE_ARG).unwrap_or_default()),
                policy: QuotaPolicy {
                    monthly_limit: value(matches, MONTHLY_LIMIT_ARG),
                    safety_buffer: value(matches, SAFETY_BUFFER_ARG),
                },
            })
        };

        Ok(Self {
            input: PathBuf::from(matches.value_of(INPUT_ARG).unwrap_or_default()),
            output_dir,
            url: matches.value_of(URL_ARG).unwrap_or(MAPBOX_STATIC_URL).to_owned(),
            token: token.to_owned(),
            style: ImageStyle {
                style_id: matches.value_of(STYLE_ARG).unwrap_or_default().to_owned(),
                zoom: value(matches, ZOOM_ARG),
                width: value(matches, WIDTH_ARG),
                height: value(matches, HEIGHT_ARG),
            },
            timeout: Duration::from_secs(value(matches, TIMEOUT_ARG)),
            delay: Duration::from_millis(value(matches, DELAY_ARG)),
            usage,
            dry_run: matches.is_present(DRY_RUN_ARG),
        })
    }
}

fn app() -> App<'static, 'static> {
    app_from_crate!()
        .setting(AppSettings::GlobalVersion)
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name(INPUT_ARG)
                .help("CSV or spreadsheet (.xlsx, .xls, .ods) with `id`, `lat` and `lon`/`long`/`longitude` columns")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name(OUTPUT_DIR_ARG)
                .help("The folder to write the images to. Created if missing.")
                .default_value("images_mapbox_zoom18")
                .takes_value(true)
                .short("o")
                .long("output"),
        )
        .arg(
            Arg::with_name(SUBDIR_ARG)
                .help("Subfolder of the output folder to write the images to (eg. `test`)")
                .takes_value(true)
                .long("subdir"),
        )
        .arg(
            Arg::with_name(TOKEN_ARG)
                .help("Mapbox access token. Also read from a `.env` file in the working directory.")
                .env("MAPBOX_TOKEN")
                .hide_env_values(true)
                .required(true)
                .empty_values(false)
                .takes_value(true)
                .long("token"),
        )
        .arg(
            Arg::with_name(URL_ARG)
                .help("The URL with format specifiers `{style}`, `{lon}`, `{lat}`, `{zoom}`, `{width}`, `{height}` and `{token}` to fetch the images from. Defaults to the Mapbox Static Images API.")
                .takes_value(true)
                .short("u")
                .long("url"),
        )
        .arg(
            Arg::with_name(STYLE_ARG)
                .help("The Mapbox style to render")
                .default_value("mapbox/satellite-v9")
                .takes_value(true)
                .long("style"),
        )
        .arg(
            Arg::with_name(ZOOM_ARG)
                .help("The zoom level of the images")
                .validator(is_zoom)
                .default_value("18")
                .takes_value(true)
                .short("z")
                .long("zoom"),
        )
        .arg(
            Arg::with_name(WIDTH_ARG)
                .help("Image width in pixels")
                .validator(is_image_size)
                .default_value("600")
                .takes_value(true)
                .long("width"),
        )
        .arg(
            Arg::with_name(HEIGHT_ARG)
                .help("Image height in pixels")
                .validator(is_image_size)
                .default_value("600")
                .takes_value(true)
                .long("height"),
        )
        .arg(
            Arg::with_name(TIMEOUT_ARG)
                .help("The timeout (in seconds) for fetching a single image. Pass 0 for no timeout.")
                .validator(is_numeric_min(0))
                .default_value("10")
                .takes_value(true)
                .short("t")
                .long("timeout"),
        )
        .arg(
            Arg::with_name(DELAY_ARG)
                .help("Pause (in milliseconds) after every downloaded image")
                .validator(is_numeric_min(0))
                .default_value("50")
                .takes_value(true)
                .long("delay"),
        )
        .arg(
            Arg::with_name(USAGE_FILE_ARG)
                .help("JSON file keeping count of the requests made this month")
                .default_value("mapbox_usage_log.json")
                .takes_value(true)
                .long("usage-file"),
        )
        .arg(
            Arg::with_name(NO_USAGE_LOG_ARG)
                .help("Don't track or limit API usage")
                .takes_value(false)
                .long("no-usage-log"),
        )
        .arg(
            Arg::with_name(MONTHLY_LIMIT_ARG)
                .help("Requests allowed per month by the API plan")
                .validator(is_numeric_min(0))
                .default_value("50000")
                .takes_value(true)
                .long("monthly-limit"),
        )
        .arg(
            Arg::with_name(SAFETY_BUFFER_ARG)
                .help("Requests kept in reserve below the monthly limit")
                .validator(is_numeric_min(0))
                .default_value("2000")
                .takes_value(true)
                .long("safety-buffer"),
        )
        .arg(
            Arg::with_name(DRY_RUN_ARG)
                .help("Don't actually fetch anything, just determine how many images would be fetched.")
                .takes_value(false)
                .long("dry-run"),
        )
}
