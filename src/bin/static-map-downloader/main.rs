mod args;
mod validators;

use anyhow::Result;
use args::Args;
use static_map_downloader::{count_pending, fetch, Config, Halt};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // a missing .env is fine, the token may come from the environment or --token
    let _ = dotenvy::dotenv();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let dry_run = args.dry_run;
    let config: Config = args.into();

    if dry_run {
        let image_count = count_pending(&config)?;
        let style = config.url.style();
        let approx_image_size = 100f64 * f64::from(style.width * style.height) / 360_000f64;

        eprintln!(
            "would download {} images (approx {}, assuming {} kb per image)",
            image_count,
            pretty_bytes::converter::convert((image_count as f64) * approx_image_size * 1_000f64),
            approx_image_size.round()
        );

        return Ok(());
    }

    let summary = fetch(config).await?;

    match summary.halt {
        Some(Halt::QuotaReached { count }) => {
            eprintln!("stopped at usage limit ({} requests)", count)
        }
        Some(Halt::Stopped(status)) => {
            eprintln!("stopped by API error {}, check quota or token", status)
        }
        None => {}
    }
    eprintln!(
        "done. downloaded {} new images ({} already present, {} failed)",
        summary.downloaded, summary.skipped, summary.failed
    );

    Ok(())
}
