//! Synthetic hotspot generator.
//!
//! Produces INPE-shaped rows for exercising the pipeline without network
//! access. Daily volume follows a base count with uniform jitter and a
//! seasonal factor peaking in the August-October burning season. State and
//! biome are drawn from weighted distributions skewed toward the arc of
//! deforestation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use queimadas_source_models::{RawDataset, RawRecord};
use rand::distr::weighted::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::csv_file::write_raw_csv;
use crate::inpe::daily_file_name;
use crate::{FetchOptions, HotspotSource, SourceError, days_between};

/// Columns written by the generator, in file order.
pub const COLUMNS: &[&str] = &[
    "data",
    "latitude",
    "longitude",
    "uf",
    "bioma",
    "satelite",
    "confianca",
];

pub const SATELLITES: &[&str] = &["NOAA-20", "AQUA", "TERRA", "GOES-16", "SUOMI-NPP"];

/// States with an explicit weight. The remaining UFs share what is left.
const STATE_WEIGHTS: &[(&str, f64)] = &[
    ("MT", 0.15),
    ("PA", 0.15),
    ("AM", 0.12),
    ("RO", 0.10),
    ("TO", 0.08),
    ("MA", 0.07),
    ("GO", 0.06),
    ("MS", 0.05),
    ("BA", 0.05),
    ("PI", 0.04),
    ("MG", 0.03),
    ("SP", 0.02),
    ("PR", 0.02),
    ("RS", 0.01),
];

const BIOME_WEIGHTS: &[(&str, f64)] = &[
    ("Amazonia", 0.35),
    ("Cerrado", 0.30),
    ("Caatinga", 0.15),
    ("Mata Atlantica", 0.10),
    ("Pantanal", 0.07),
    ("Pampa", 0.03),
];

/// Generator parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticConfig {
    /// Base number of hotspots per day before jitter and seasonality.
    pub base: u32,
    /// Maximum relative jitter, e.g. `0.3` for +/-30%.
    pub variation: f64,
    /// Seed for reproducible output. `None` seeds from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            base: 500,
            variation: 0.3,
            seed: None,
        }
    }
}

/// Seasonal multiplier for a calendar month.
#[must_use]
pub const fn seasonal_factor(month: u32) -> f64 {
    match month {
        8..=10 => 1.5,
        11 | 12 | 1 => 1.2,
        2..=4 => 0.7,
        _ => 0.9,
    }
}

/// Pairs every UF code with its sampling weight.
fn state_distribution() -> Vec<(&'static str, f64)> {
    let listed: f64 = STATE_WEIGHTS.iter().map(|(_, w)| w).sum();
    let others: Vec<&'static str> = queimadas_hotspot_models::Uf::all()
        .iter()
        .map(|uf| uf.code())
        .filter(|code| !STATE_WEIGHTS.iter().any(|(c, _)| c == code))
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let share = (1.0 - listed) / others.len() as f64;

    STATE_WEIGHTS
        .iter()
        .copied()
        .chain(others.into_iter().map(|code| (code, share)))
        .collect()
}

/// Generates synthetic hotspot rows.
pub struct SyntheticSource {
    config: SyntheticConfig,
    write_files: bool,
}

impl SyntheticSource {
    #[must_use]
    pub const fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            write_files: false,
        }
    }

    /// Also write one `focos_{date}.csv` per day into the fetch output
    /// directory.
    #[must_use]
    pub const fn with_write_files(mut self, write_files: bool) -> Self {
        self.write_files = write_files;
        self
    }

    /// Generates one dataset per day in `[from, to]`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidConfig`] if `variation` is not finite,
    /// or [`SourceError::Weights`] if a sampling distribution cannot be
    /// built.
    pub fn generate_days(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, RawDataset)>, SourceError> {
        if !self.config.variation.is_finite() {
            return Err(SourceError::InvalidConfig {
                message: format!("variation must be finite, got {}", self.config.variation),
            });
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let states = state_distribution();
        let state_index = WeightedIndex::new(states.iter().map(|(_, w)| *w))?;
        let biome_index = WeightedIndex::new(BIOME_WEIGHTS.iter().map(|(_, w)| *w))?;

        let variation = self.config.variation.abs();
        let mut days = Vec::new();
        for day in days_between(from, to) {
            let jitter = if variation > 0.0 {
                rng.random_range(-variation..=variation)
            } else {
                0.0
            };
            let count = day_count(self.config.base, jitter, day.month());

            let mut records = Vec::with_capacity(count);
            for _ in 0..count {
                let seconds = rng.random_range(0..86_400u32);
                let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
                    .unwrap_or(NaiveTime::MIN);
                let mut record = RawRecord::new();
                record.insert(
                    "data".to_string(),
                    day.and_time(time).format("%Y-%m-%d %H:%M:%S").to_string(),
                );
                record.insert(
                    "latitude".to_string(),
                    format!("{:.5}", rng.random_range(-33.0..5.0)),
                );
                record.insert(
                    "longitude".to_string(),
                    format!("{:.5}", rng.random_range(-73.0..-35.0)),
                );
                record.insert("uf".to_string(), states[state_index.sample(&mut rng)].0.to_string());
                record.insert(
                    "bioma".to_string(),
                    BIOME_WEIGHTS[biome_index.sample(&mut rng)].0.to_string(),
                );
                record.insert(
                    "satelite".to_string(),
                    SATELLITES[rng.random_range(0..SATELLITES.len())].to_string(),
                );
                record.insert(
                    "confianca".to_string(),
                    rng.random_range(1..=100u8).to_string(),
                );
                records.push(record);
            }

            log::debug!("{day}: generated {count} hotspots");
            days.push((
                day,
                RawDataset {
                    columns: COLUMNS.iter().map(ToString::to_string).collect(),
                    records,
                },
            ));
        }
        Ok(days)
    }
}

/// Daily volume: base plus jitter, then the seasonal factor, truncating at
/// each step.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]
fn day_count(base: u32, jitter: f64, month: u32) -> usize {
    let jittered = (f64::from(base) * (1.0 + jitter)).max(0.0).floor();
    (jittered * seasonal_factor(month)).floor() as usize
}

/// Writes each day's rows to `dir/focos_{date}.csv`.
///
/// # Errors
///
/// Returns [`SourceError`] if a file cannot be written.
pub fn write_daily_files(
    dir: &Path,
    days: &[(NaiveDate, RawDataset)],
) -> Result<Vec<PathBuf>, SourceError> {
    let mut paths = Vec::with_capacity(days.len());
    for (day, dataset) in days {
        let path = dir.join(daily_file_name(*day));
        write_raw_csv(&path, dataset)?;
        log::info!("Generated {} hotspots for {day} -> {}", dataset.len(), path.display());
        paths.push(path);
    }
    Ok(paths)
}

#[async_trait]
impl HotspotSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "Synthetic generator"
    }

    async fn fetch(&self, options: &FetchOptions) -> Result<RawDataset, SourceError> {
        let to = options.to.unwrap_or_else(|| Utc::now().date_naive());
        let from = options
            .from
            .unwrap_or_else(|| to - chrono::Duration::days(30));

        let days = self.generate_days(from, to)?;
        options.progress.set_total(days.len() as u64);
        if self.write_files {
            write_daily_files(&options.output_dir, &days)?;
        }

        let mut dataset = RawDataset::empty();
        for (_, part) in days {
            dataset.extend(part);
            options.progress.inc(1);
        }
        options
            .progress
            .finish(format!("{} synthetic hotspots", dataset.len()));
        Ok(dataset)
    }
}
