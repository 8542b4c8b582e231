//! Building [`ReportData`] from aggregates and alerts.

use chrono::{DateTime, Utc};
use queimadas_alert_models::Alert;
use queimadas_analytics_models::{PeriodicAggregate, RegionalTable, TemporalSeries};
use queimadas_report_models::{
    AlertLine, PeakPeriod, RegionSection, ReportData, ReportPeriod, ReportSummary, TREND_WINDOW,
    Trend,
};

/// Relative change over the trend window above which counts are rising.
const RISING_RATIO: f64 = 1.2;
/// Relative change below which counts are falling.
const FALLING_RATIO: f64 = 0.8;

/// Assembles the report for one run.
///
/// `top_n` bounds the regional tables; the totals, excluded counts and
/// region counts still describe the whole table.
#[must_use]
pub fn assemble(
    series: &TemporalSeries,
    states: &RegionalTable,
    biomes: &RegionalTable,
    alerts: &[Alert],
    top_n: usize,
    generated_at: DateTime<Utc>,
) -> ReportData {
    let granularity = series.granularity;
    let period = series.bounds().map(|(first, last)| {
        let end = granularity.period_end(last);
        ReportPeriod {
            start: first,
            end,
            days: (end - first).num_days() + 1,
        }
    });

    let total_observations = series.stats.total;
    #[allow(clippy::cast_precision_loss)]
    let daily_mean = period.map_or(0.0, |p| total_observations as f64 / p.days as f64);

    let peaks = series
        .peaks()
        .map(|p| PeakPeriod {
            period_start: p.period_start,
            period_end: granularity.period_end(p.period_start),
            count: p.count,
            percent_of_max: p.percent_of_max,
        })
        .collect();

    log::info!(
        "Assembled report: {total_observations} observations, {} alerts",
        alerts.len()
    );

    ReportData {
        generated_at,
        granularity,
        period,
        summary: ReportSummary {
            total_observations,
            daily_mean,
            states_affected: states.rows.len(),
            biomes_affected: biomes.rows.len(),
            dropped_records: series.dropped_records,
        },
        trend: trend(&series.points),
        stats: series.stats,
        series: series.points.clone(),
        states: section(states, top_n),
        biomes: section(biomes, top_n),
        peaks,
        alerts: alerts.iter().map(AlertLine::from).collect(),
        cleaning: None,
    }
}

fn section(table: &RegionalTable, top_n: usize) -> RegionSection {
    RegionSection {
        grouping: table.grouping,
        total: table.total,
        excluded: table.excluded,
        region_count: table.rows.len(),
        rows: table.top(top_n).to_vec(),
    }
}

/// Compares the first and last counts of the trailing [`TREND_WINDOW`]
/// periods. `None` with fewer than two periods.
#[must_use]
pub fn trend(points: &[PeriodicAggregate]) -> Option<Trend> {
    if points.len() < 2 {
        return None;
    }
    let window = &points[points.len().saturating_sub(TREND_WINDOW)..];
    #[allow(clippy::cast_precision_loss)]
    let (first, last) = (
        window.first()?.count as f64,
        window.last()?.count as f64,
    );

    Some(if last > first * RISING_RATIO {
        Trend::Increasing
    } else if last < first * FALLING_RATIO {
        Trend::Decreasing
    } else {
        Trend::Stable
    })
}
