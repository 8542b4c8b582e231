//! The batch run: clean, aggregate, alert, report.
//!
//! Loading is the only async step. Everything after it is a synchronous
//! pass over the in-memory observations, so [`process`] can be driven
//! directly from tests with a hand-built dataset.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use queimadas_alert::{deliver_all, evaluate_latest, evaluate_series, load_config, sinks_from_config};
use queimadas_alert_models::Alert;
use queimadas_analytics::{
    aggregate, aggregate_by, filter_by_date_range, filter_by_region, regional_series,
};
use queimadas_analytics_models::TimeGranularity;
use queimadas_clean::{CleanError, CleaningReport, clean};
use queimadas_hotspot_models::{Biome, RegionGrouping, Uf};
use queimadas_report::{ReportError, ReportFormat, assemble, write_report};
use queimadas_report_models::{CleaningSummary, DEFAULT_TOP_N};
use queimadas_source::csv_file::CsvFileSource;
use queimadas_source::progress::ProgressCallback;
use queimadas_source::{FetchOptions, fetch_or_empty};
use queimadas_source_models::RawDataset;

use crate::output::write_intermediates;

/// Errors that stop a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Clean(#[from] CleanError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Settings for one run.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// CSV file or directory of CSV files.
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Alert configuration file; defaults when `None`.
    pub config: Option<PathBuf>,
    pub granularity: TimeGranularity,
    pub window: usize,
    /// Evaluate alerts for the last day only.
    pub latest_only: bool,
    pub format: ReportFormat,
    pub top_n: usize,
    pub skip_alerts: bool,
    pub skip_report: bool,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Keep only this state.
    pub state: Option<Uf>,
    /// Keep only this biome.
    pub biome: Option<Biome>,
    /// Stop reading input after this many rows.
    pub limit: Option<u64>,
}

impl RunOptions {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            config: None,
            granularity: TimeGranularity::Daily,
            window: queimadas_analytics_models::DEFAULT_WINDOW,
            latest_only: false,
            format: ReportFormat::Both,
            top_n: DEFAULT_TOP_N,
            skip_alerts: false,
            skip_report: false,
            from: None,
            to: None,
            state: None,
            biome: None,
            limit: None,
        }
    }

    /// Directory for the intermediate CSVs.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join("data")
    }

    /// Directory for the rendered reports.
    #[must_use]
    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir.join("reports")
    }
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub cleaning: CleaningReport,
    /// Observations left after the date and region filters.
    pub observations: usize,
    pub periods: usize,
    pub alerts: Vec<Alert>,
    /// Sinks that failed to deliver.
    pub failed_sinks: usize,
    pub intermediates: Vec<PathBuf>,
    pub reports: Vec<PathBuf>,
}

/// Loads the input CSVs and runs [`process`] on them.
///
/// An unreadable input is logged and treated as an empty dataset.
///
/// # Errors
///
/// Returns [`PipelineError`] if an output file cannot be written.
pub async fn run(
    options: &RunOptions,
    progress: Arc<dyn ProgressCallback>,
) -> Result<RunSummary, PipelineError> {
    let start = Instant::now();
    let source = CsvFileSource::new(&options.input);
    let fetch = FetchOptions::new(&options.output_dir)
        .with_limit(options.limit)
        .with_progress(progress);
    let raw = fetch_or_empty(&source, &fetch).await;
    log::info!("Loaded {} raw rows from {}", raw.len(), options.input.display());

    let summary = process(&raw, options, Utc::now())?;
    log::info!(
        "Run complete in {:.1}s: {} observations, {} periods, {} alerts",
        start.elapsed().as_secs_f64(),
        summary.observations,
        summary.periods,
        summary.alerts.len()
    );
    Ok(summary)
}

/// Runs every stage after loading. `now` stamps the report.
///
/// # Errors
///
/// Returns [`PipelineError`] if an output file cannot be written. Alert
/// sink failures are logged and counted in [`RunSummary::failed_sinks`].
pub fn process(
    raw: &RawDataset,
    options: &RunOptions,
    now: DateTime<Utc>,
) -> Result<RunSummary, PipelineError> {
    let batch = clean(raw);
    let observations = filter_by_date_range(&batch.observations, options.from, options.to);
    let observations = filter_by_region(&observations, options.state, options.biome);

    let series = aggregate(&observations, options.granularity, options.window);
    let states = aggregate_by(&observations, RegionGrouping::State);
    let biomes = aggregate_by(&observations, RegionGrouping::Biome);

    let intermediates =
        write_intermediates(&options.data_dir(), &observations, &series, &states, &biomes)?;

    let (alerts, failed_sinks) = if options.skip_alerts {
        log::info!("Skipping alerts");
        (Vec::new(), 0)
    } else {
        let config = load_config(options.config.as_deref()).config;
        let notification = config.notification.clone().relative_to(&options.output_dir);
        // Limits are per day, whatever granularity the report uses.
        let by_state =
            regional_series(&observations, RegionGrouping::State, TimeGranularity::Daily);
        let by_biome =
            regional_series(&observations, RegionGrouping::Biome, TimeGranularity::Daily);
        let series_refs = [&by_state, &by_biome];
        let alerts = if options.latest_only {
            evaluate_latest(&series_refs, &config)
        } else {
            evaluate_series(&series_refs, &config)
        };
        let failed = deliver_all(&sinks_from_config(&notification), &alerts);
        (alerts, failed)
    };

    let reports = if options.skip_report {
        log::info!("Skipping report");
        Vec::new()
    } else {
        let mut data = assemble(&series, &states, &biomes, &alerts, options.top_n, now);
        data.cleaning = Some(cleaning_summary(&batch.report));
        write_report(&data, &options.reports_dir(), options.format)?
    };

    Ok(RunSummary {
        cleaning: batch.report,
        observations: observations.len(),
        periods: series.points.len(),
        alerts,
        failed_sinks,
        intermediates,
        reports,
    })
}

const fn cleaning_summary(report: &CleaningReport) -> CleaningSummary {
    CleaningSummary {
        rows_read: report.rows_read,
        rows_kept: report.rows_kept,
        rows_rejected: report.rows_rejected(),
        duplicates_removed: report.duplicates_removed,
        missing_timestamps: report.missing_timestamps,
    }
}
