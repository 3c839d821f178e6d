use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};

use crate::url::UrlTemplate;

/// A single input record: an identifier and the point to image.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
}

/// What happened to a single location.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The image already exists on disk, nothing was requested.
    Skipped,
    /// The image was fetched and written.
    Downloaded,
    /// The API refused the request (403/429); the run should stop.
    Stop(StatusCode),
    /// The fetch failed and no file was written.
    Error(anyhow::Error),
}

impl Location {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
        }
    }

    pub fn image_path(&self, output_folder: &Path) -> PathBuf {
        output_folder.join(format!("{}.jpg", self.id))
    }

    /// Fetches the image of this location and stores it in `output_folder`,
    /// unless it's already there.
    pub async fn fetch_from(
        &self,
        client: &reqwest::Client,
        url: &UrlTemplate,
        output_folder: &Path,
    ) -> FetchOutcome {
        let output_file = self.image_path(output_folder);

        if output_file.exists() {
            return FetchOutcome::Skipped;
        }

        match self.download(client, url, &output_file).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(id = %self.id, "failed fetching image: {:#}", e);
                FetchOutcome::Error(e)
            }
        }
    }

    async fn download(
        &self,
        client: &reqwest::Client,
        url: &UrlTemplate,
        output_file: &Path,
    ) -> Result<FetchOutcome> {
        let formatted_url = url.location_url(self.lat, self.lon)?;

        // reqwest errors carry the URL, which carries the access token
        let mut response = client
            .get(&formatted_url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("failed fetching image for {}", self.id))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            warn!(id = %self.id, %status, "API refused request, check quota or token");
            return Ok(FetchOutcome::Stop(status));
        }

        if !status.is_success() {
            anyhow::bail!("received invalid status code {} for {}", status, self.id);
        }

        let partial_file = output_file.with_extension("jpg.part");
        let written = async {
            let mut file = fs::File::create(&partial_file).await?;
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(reqwest::Error::without_url)?
            {
                file.write_all(&chunk).await?;
            }
            file.flush().await?;

            Ok::<_, anyhow::Error>(())
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&partial_file).await;
            return Err(e.context(format!("failed streaming image {} to disk", self.id)));
        }

        fs::rename(&partial_file, output_file)
            .await
            .with_context(|| format!("failed moving image {} into place", self.id))?;
        debug!(id = %self.id, path = %output_file.display(), "image written");

        Ok(FetchOutcome::Downloaded)
    }
}
