//! Temporal aggregation: counts per calendar period.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use queimadas_analytics_models::{PeriodicAggregate, TemporalSeries, TimeGranularity};
use queimadas_hotspot_models::Observation;

use crate::stats;

/// Multiplier on the standard deviation above the mean that marks a peak.
pub const PEAK_STDDEV_MULTIPLIER: f64 = 2.0;

/// Counts observations per period at `granularity`.
///
/// Only periods that contain at least one observation appear in the
/// result. Observations without a timestamp are skipped and counted in
/// [`TemporalSeries::dropped_records`].
#[must_use]
pub fn aggregate(
    observations: &[Observation],
    granularity: TimeGranularity,
    window: usize,
) -> TemporalSeries {
    let mut buckets: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut dropped = 0usize;
    for observation in observations {
        match observation.observed_at {
            Some(ts) => {
                *buckets
                    .entry(granularity.period_start(ts.date_naive()))
                    .or_default() += 1;
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::warn!("Skipped {dropped} observations without a timestamp");
    }

    let mut series = TemporalSeries::empty(granularity, window);
    series.dropped_records = dropped;
    if buckets.is_empty() {
        return series;
    }

    let counts: Vec<u64> = buckets.values().copied().collect();
    let rolling = stats::rolling_mean(&counts, window);
    let summary = stats::series_stats(&counts);
    let peak_threshold = summary.mean + PEAK_STDDEV_MULTIPLIER * summary.std_dev;
    #[allow(clippy::cast_precision_loss)]
    let max = summary.max as f64;

    series.points = buckets
        .into_iter()
        .zip(rolling)
        .map(|((period_start, count), rolling_mean)| {
            #[allow(clippy::cast_precision_loss)]
            let value = count as f64;
            PeriodicAggregate {
                period_start,
                count,
                rolling_mean,
                is_peak: value > peak_threshold,
                percent_of_max: if max > 0.0 { 100.0 * value / max } else { 0.0 },
            }
        })
        .collect();
    series.stats = summary;

    log::info!(
        "Aggregated {} observations into {} {granularity} periods",
        summary.total,
        series.points.len()
    );
    series
}

/// Keeps observations whose date falls in `[from, to]`. Either bound may be
/// open. With any bound set, observations without a timestamp are dropped.
#[must_use]
pub fn filter_by_date_range(
    observations: &[Observation],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<Observation> {
    if from.is_none() && to.is_none() {
        return observations.to_vec();
    }
    let kept: Vec<Observation> = observations
        .iter()
        .filter(|o| {
            o.observed_at.is_some_and(|ts| {
                let date = ts.date_naive();
                from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t)
            })
        })
        .cloned()
        .collect();
    log::info!(
        "Date filter {}..{} kept {} of {} observations",
        from.map_or_else(|| "*".to_string(), |d| d.to_string()),
        to.map_or_else(|| "*".to_string(), |d| d.to_string()),
        kept.len(),
        observations.len()
    );
    kept
}
