#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the burn hotspot monitoring pipeline.
//!
//! `generate` and `fetch` produce raw daily CSVs, `run` takes them through
//! cleaning, aggregation, alerting and reporting, and `init-config` writes
//! a starting alert configuration. Logging goes through
//! `indicatif-log-bridge` (see [`progress::init_logger`]) so log lines and
//! progress bars share the terminal.

mod output;
mod pipeline;
mod progress;

use std::path::PathBuf;

use chrono::{Days, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use queimadas_analytics_models::TimeGranularity;
use queimadas_hotspot_models::{Biome, Uf};
use queimadas_report::ReportFormat;
use queimadas_source::inpe::InpeSource;
use queimadas_source::synthetic::{SyntheticConfig, SyntheticSource, write_daily_files};
use queimadas_source::{FetchOptions, HotspotSource};

use crate::pipeline::RunOptions;

#[derive(Parser)]
#[command(name = "queimadas", about = "Burn hotspot monitoring for Brazil")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic daily hotspot CSVs
    Generate {
        /// First day (YYYY-MM-DD). Defaults to `--days` before `--to`
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD). Defaults to today
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Number of days when `--from` is not given
        #[arg(long, default_value = "30")]
        days: u32,
        /// Base hotspots per day before seasonality and jitter
        #[arg(long, default_value = "500")]
        base: u32,
        /// Maximum relative jitter per day (0.3 = +/-30%)
        #[arg(long, default_value = "0.3")]
        variation: f64,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "data/raw")]
        output_dir: PathBuf,
    },
    /// Download daily hotspot CSVs from INPE
    Fetch {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Number of days when `--from` is not given
        #[arg(long, default_value = "1")]
        days: u32,
        /// Override the INPE base URL
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long, default_value = "data/raw")]
        output_dir: PathBuf,
    },
    /// Clean, aggregate, evaluate alerts and write the report
    Run {
        /// Raw CSV file or directory of CSV files
        #[arg(long, default_value = "data/raw")]
        input: PathBuf,
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// Alert configuration (TOML, or JSON for `.json`)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Report aggregation period: day, week, month or year
        #[arg(long, default_value = "day")]
        granularity: TimeGranularity,
        /// Rolling-mean window, in periods
        #[arg(long, default_value = "7")]
        window: usize,
        /// Only evaluate alerts for the most recent day
        #[arg(long)]
        latest_only: bool,
        /// Report format: html, json or both
        #[arg(long, default_value = "both")]
        format: ReportFormat,
        /// Rows per regional table in the report
        #[arg(long, default_value = "10")]
        top: usize,
        #[arg(long)]
        skip_alerts: bool,
        #[arg(long)]
        skip_report: bool,
        /// Ignore observations before this day
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Ignore observations after this day
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Only analyze this state (UF code, e.g. MT)
        #[arg(long)]
        uf: Option<Uf>,
        /// Only analyze this biome (e.g. Cerrado, "Mata Atlantica")
        #[arg(long)]
        biome: Option<Biome>,
        /// Stop reading input after this many rows
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Write the default alert configuration
    InitConfig {
        #[arg(default_value = "config/alerts.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Resolves a day range from optional bounds and a day count.
fn resolve_range(from: Option<NaiveDate>, to: Option<NaiveDate>, days: u32) -> (NaiveDate, NaiveDate) {
    let to = to.unwrap_or_else(|| Utc::now().date_naive());
    let from = from.unwrap_or_else(|| {
        to.checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
            .unwrap_or(to)
    });
    (from, to)
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = progress::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            from,
            to,
            days,
            base,
            variation,
            seed,
            output_dir,
        } => {
            let (from, to) = resolve_range(from, to, days);
            if from > to {
                return Err(format!("--from {from} is after --to {to}").into());
            }
            let source = SyntheticSource::new(SyntheticConfig {
                base,
                variation,
                seed,
            });
            log::info!("Generating synthetic hotspots for {from}..{to}");
            let generated = source.generate_days(from, to)?;
            let paths = write_daily_files(&output_dir, &generated)?;
            log::info!("Wrote {} files to {}", paths.len(), output_dir.display());
        }
        Commands::Fetch {
            from,
            to,
            days,
            base_url,
            output_dir,
        } => {
            let (from, to) = resolve_range(from, to, days);
            let source = match base_url {
                Some(url) => InpeSource::with_base_url(url)?,
                None => InpeSource::new()?,
            };
            std::fs::create_dir_all(&output_dir)?;
            let options = FetchOptions::new(&output_dir)
                .with_range(from, to)
                .with_progress(progress::for_terminal(&multi, "Downloading"));
            log::info!("Fetching {} for {from}..{to}", source.name());
            let dataset = source.fetch(&options).await?;
            log::info!("Fetched {} rows into {}", dataset.len(), output_dir.display());
        }
        Commands::Run {
            input,
            output_dir,
            config,
            granularity,
            window,
            latest_only,
            format,
            top,
            skip_alerts,
            skip_report,
            from,
            to,
            uf,
            biome,
            limit,
        } => {
            let options = RunOptions {
                config,
                granularity,
                window,
                latest_only,
                format,
                top_n: top,
                skip_alerts,
                skip_report,
                from,
                to,
                state: uf,
                biome,
                limit,
                ..RunOptions::new(input, output_dir)
            };
            let summary =
                pipeline::run(&options, progress::for_terminal(&multi, "Reading CSVs")).await?;

            let cleaning = &summary.cleaning;
            println!(
                "Rows read: {}, kept: {}, rejected: {}, duplicates: {}",
                cleaning.rows_read,
                cleaning.rows_kept,
                cleaning.rows_rejected(),
                cleaning.duplicates_removed
            );
            println!(
                "Observations: {}, periods: {}, alerts: {}",
                summary.observations,
                summary.periods,
                summary.alerts.len()
            );
            for path in &summary.intermediates {
                log::debug!("Wrote {}", path.display());
            }
            for path in &summary.reports {
                println!("Report: {}", path.display());
            }
            if summary.failed_sinks > 0 {
                log::warn!("{} alert sink(s) failed", summary.failed_sinks);
            }
        }
        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )
                .into());
            }
            queimadas_alert::write_default_config(&path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
