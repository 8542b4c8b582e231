#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hotspot data sources.
//!
//! Each provider implements the [`HotspotSource`] trait and returns a
//! [`RawDataset`] of untyped rows. Cleaning and validation happen
//! downstream; sources only fetch, decode and split rows into columns.

pub mod csv_file;
pub mod inpe;
pub mod parsing;
pub mod progress;
pub mod retry;
pub mod synthetic;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use queimadas_source_models::RawDataset;

use crate::progress::ProgressCallback;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// ZIP archive could not be read.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sampling distribution for the synthetic generator was invalid.
    #[error("invalid sampling weights: {0}")]
    Weights(#[from] rand::distr::weighted::Error),

    /// A source was configured with values it cannot use.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the bad setting.
        message: String,
    },

    /// The source returned something unusable (empty body, bad status).
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of what went wrong.
        message: String,
    },
}

/// Options for a single fetch.
#[derive(Clone)]
pub struct FetchOptions {
    /// First day to fetch (inclusive). Sources without a date dimension
    /// ignore it.
    pub from: Option<NaiveDate>,
    /// Last day to fetch (inclusive).
    pub to: Option<NaiveDate>,
    /// Maximum number of rows to read from local files.
    pub limit: Option<u64>,
    /// Directory where downloaded or generated files are stored.
    pub output_dir: PathBuf,
    /// Progress reporting sink.
    pub progress: Arc<dyn ProgressCallback>,
}

impl std::fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOptions")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("limit", &self.limit)
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

impl FetchOptions {
    /// Creates options writing into `output_dir` with no date range,
    /// no limit and silent progress.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            from: None,
            to: None,
            limit: None,
            output_dir: output_dir.into(),
            progress: progress::null_progress(),
        }
    }

    #[must_use]
    pub const fn with_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }
}

/// Trait that all hotspot data sources implement.
#[async_trait]
pub trait HotspotSource: Send + Sync {
    /// Returns the human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetches raw rows.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the data cannot be obtained at all.
    /// Partial failures (a single missing day, an unreadable file in a
    /// directory) are logged and skipped instead.
    async fn fetch(&self, options: &FetchOptions) -> Result<RawDataset, SourceError>;
}

/// Fetches from `source`, turning any failure into an empty dataset.
///
/// Downstream stages treat a missing dataset exactly like an empty one, so
/// the pipeline never aborts because a provider was unreachable.
pub async fn fetch_or_empty(source: &dyn HotspotSource, options: &FetchOptions) -> RawDataset {
    match source.fetch(options).await {
        Ok(dataset) => {
            log::info!(
                "{}: fetched {} rows ({} columns)",
                source.name(),
                dataset.len(),
                dataset.columns.len()
            );
            dataset
        }
        Err(e) => {
            log::error!("{}: fetch failed, continuing with no data: {e}", source.name());
            RawDataset::empty()
        }
    }
}

/// Returns every day in `[from, to]`, or an empty list if `from > to`.
#[must_use]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|d| *d <= to).collect()
}
