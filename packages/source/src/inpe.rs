//! INPE queimadas daily CSV download.
//!
//! INPE publishes one file per day at
//! `https://queimadas.dgi.inpe.br/api/focos/csv/{YYYY}/{MM}/{DD}/focos_{date}.csv`.
//! Some mirrors serve the same path as a ZIP archive, so the body is
//! checked for the ZIP signature and unpacked when needed.

use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use queimadas_source_models::RawDataset;

use crate::csv_file::{read_csv_bytes, write_raw_csv};
use crate::{FetchOptions, HotspotSource, SourceError, days_between, retry};

/// Base URL of the INPE daily CSV API.
pub const DEFAULT_BASE_URL: &str = "https://queimadas.dgi.inpe.br/api/focos/csv";

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Downloads daily hotspot files from INPE.
pub struct InpeSource {
    base_url: String,
    client: reqwest::Client,
}

impl InpeSource {
    /// Creates a source against the public INPE endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a source against a custom base URL (mirrors, tests).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("queimadas/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Returns the download URL for `day`.
    #[must_use]
    pub fn url_for(&self, day: NaiveDate) -> String {
        daily_url(&self.base_url, day)
    }

    /// Downloads, unpacks and stores a single day.
    async fn fetch_day(&self, day: NaiveDate, output_dir: &Path) -> Result<RawDataset, SourceError> {
        let url = self.url_for(day);
        log::info!("Downloading {url}");
        let bytes = retry::get_bytes(&self.client, &url).await?;
        let path = output_dir.join(daily_file_name(day));

        if is_zip(&bytes) {
            let dataset = extract_zip(&bytes)?;
            write_raw_csv(&path, &dataset)?;
            log::info!("{day}: {} rows (unzipped) -> {}", dataset.len(), path.display());
            return Ok(dataset);
        }

        let dataset = read_csv_bytes(&bytes)?;
        tokio::fs::create_dir_all(output_dir).await?;
        tokio::fs::write(&path, &bytes).await?;
        log::info!("{day}: {} rows -> {}", dataset.len(), path.display());
        Ok(dataset)
    }
}

#[async_trait]
impl HotspotSource for InpeSource {
    fn name(&self) -> &'static str {
        "INPE Programa Queimadas"
    }

    async fn fetch(&self, options: &FetchOptions) -> Result<RawDataset, SourceError> {
        let today = Utc::now().date_naive();
        let to = options.to.unwrap_or(today);
        let from = options.from.unwrap_or(to);
        let days = days_between(from, to);
        options.progress.set_total(days.len() as u64);

        let mut dataset = RawDataset::empty();
        let mut failed = 0u64;
        for day in days {
            options.progress.set_message(day.to_string());
            match self.fetch_day(day, &options.output_dir).await {
                Ok(part) => dataset.extend(part),
                Err(e) => {
                    failed += 1;
                    log::error!("{day}: download failed, skipping: {e}");
                }
            }
            options.progress.inc(1);
        }

        if failed > 0 {
            log::warn!("{failed} day(s) could not be downloaded");
        }
        options
            .progress
            .finish(format!("{} rows ({failed} days failed)", dataset.len()));
        Ok(dataset)
    }
}

/// Builds the daily file URL under `base_url`.
#[must_use]
pub fn daily_url(base_url: &str, day: NaiveDate) -> String {
    format!(
        "{base_url}/{}/{}",
        day.format("%Y/%m/%d"),
        daily_file_name(day)
    )
}

/// File name used for a day's data, both remotely and on disk.
#[must_use]
pub fn daily_file_name(day: NaiveDate) -> String {
    format!("focos_{}.csv", day.format("%Y-%m-%d"))
}

#[must_use]
pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_SIGNATURE)
}

/// Reads every `.csv` entry of a ZIP archive into one dataset.
///
/// # Errors
///
/// Returns [`SourceError`] if the archive or an entry cannot be read, or if
/// it contains no CSV entries.
pub fn extract_zip(bytes: &[u8]) -> Result<RawDataset, SourceError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut dataset = RawDataset::empty();
    let mut entries = 0usize;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let is_csv = entry.is_file()
            && Path::new(entry.name())
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            continue;
        }
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        log::debug!("Extracted {} ({} bytes)", entry.name(), contents.len());
        dataset.extend(read_csv_bytes(&contents)?);
        entries += 1;
    }

    if entries == 0 {
        return Err(SourceError::InvalidResponse {
            message: "ZIP archive contains no CSV files".to_string(),
        });
    }
    Ok(dataset)
}
