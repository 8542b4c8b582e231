#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate types produced by hotspot analytics.
//!
//! The temporal aggregator produces a [`TemporalSeries`] of
//! [`PeriodicAggregate`] rows; the spatial aggregator produces a
//! [`RegionalTable`] per grouping and a [`RegionalSeries`] of per-region
//! counts on the global period axis.

use chrono::{Datelike, Days, Months, NaiveDate};
use queimadas_hotspot_models::{Region, RegionGrouping};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// Default rolling-mean window, in periods.
pub const DEFAULT_WINDOW: usize = 7;

/// Granularity for time-series aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum TimeGranularity {
    /// Daily counts.
    #[strum(serialize = "day", serialize = "daily", serialize = "dia", serialize = "D")]
    Daily,
    /// Weekly counts, weeks starting on Monday.
    #[strum(serialize = "week", serialize = "weekly", serialize = "semana", serialize = "W")]
    Weekly,
    /// Monthly counts.
    #[strum(serialize = "month", serialize = "monthly", serialize = "mes", serialize = "mês", serialize = "M")]
    Monthly,
    /// Yearly counts.
    #[strum(serialize = "year", serialize = "yearly", serialize = "ano", serialize = "Y")]
    Yearly,
}

impl std::fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "day"),
            Self::Weekly => write!(f, "week"),
            Self::Monthly => write!(f, "month"),
            Self::Yearly => write!(f, "year"),
        }
    }
}

impl TimeGranularity {
    /// Returns the first day of the period containing `date`.
    #[must_use]
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => date,
            Self::Weekly => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                date - Days::new(offset)
            }
            Self::Monthly => date.with_day(1).unwrap_or(date),
            Self::Yearly => date.with_ordinal(1).unwrap_or(date),
        }
    }

    /// Returns the start of the period after the one starting at `start`.
    #[must_use]
    pub fn next_start(self, start: NaiveDate) -> NaiveDate {
        let next = match self {
            Self::Daily => start.checked_add_days(Days::new(1)),
            Self::Weekly => start.checked_add_days(Days::new(7)),
            Self::Monthly => start.checked_add_months(Months::new(1)),
            Self::Yearly => start.checked_add_months(Months::new(12)),
        };
        next.unwrap_or(NaiveDate::MAX)
    }

    /// Returns the last day of the period starting at `start`.
    #[must_use]
    pub fn period_end(self, start: NaiveDate) -> NaiveDate {
        self.next_start(start).pred_opt().unwrap_or(start)
    }

    /// Lists every period start from `first`'s period through `last`'s,
    /// inclusive.
    #[must_use]
    pub fn periods_between(self, first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
        let mut periods = Vec::new();
        let mut current = self.period_start(first);
        let end = self.period_start(last);
        while current <= end {
            periods.push(current);
            let next = self.next_start(current);
            if next <= current {
                break;
            }
            current = next;
        }
        periods
    }
}

/// One calendar period of a temporal series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodicAggregate {
    pub period_start: NaiveDate,
    pub count: u64,
    /// Mean count over the trailing window ending at this period.
    pub rolling_mean: f64,
    /// `count > mean + 2 * std_dev` over the whole series.
    pub is_peak: bool,
    /// `100 * count / max(count)`.
    pub percent_of_max: f64,
}

/// Descriptive statistics of a series of counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStats {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation, zero for fewer than two values.
    pub std_dev: f64,
    pub min: u64,
    pub max: u64,
    pub total: u64,
    /// Number of periods.
    pub count: usize,
}

/// Ordered temporal aggregation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalSeries {
    pub granularity: TimeGranularity,
    pub window: usize,
    /// Ascending by period start, one row per period present in the input.
    pub points: Vec<PeriodicAggregate>,
    pub stats: SeriesStats,
    /// Observations skipped because they had no timestamp.
    pub dropped_records: usize,
}

impl TemporalSeries {
    /// Returns an empty series.
    #[must_use]
    pub const fn empty(granularity: TimeGranularity, window: usize) -> Self {
        Self {
            granularity,
            window,
            points: Vec::new(),
            stats: SeriesStats {
                mean: 0.0,
                median: 0.0,
                std_dev: 0.0,
                min: 0,
                max: 0,
                total: 0,
                count: 0,
            },
            dropped_records: 0,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn counts(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.count).collect()
    }

    /// Returns the first and last period starts.
    #[must_use]
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.period_start, self.points.last()?.period_start))
    }

    pub fn peaks(&self) -> impl Iterator<Item = &PeriodicAggregate> {
        self.points.iter().filter(|p| p.is_peak)
    }
}

/// One row of a regional table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalAggregate {
    /// Stable key: UF code or biome code.
    pub key: String,
    /// Display name.
    pub name: String,
    pub count: u64,
    /// Share of the table total, in percent.
    pub percentage: f64,
}

/// Counts per region for one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalTable {
    pub grouping: RegionGrouping,
    /// Sum of `rows[*].count`.
    pub total: u64,
    /// Observations that lacked the grouping key.
    pub excluded: usize,
    /// Sorted by count descending, then key ascending.
    pub rows: Vec<RegionalAggregate>,
}

impl RegionalTable {
    /// Returns the first `n` rows.
    #[must_use]
    pub fn top(&self, n: usize) -> &[RegionalAggregate] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// Per-period counts for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCounts {
    pub region: Region,
    /// Aligned with [`RegionalSeries::periods`].
    pub counts: Vec<u64>,
}

/// Per-region counts on a shared period axis, zero-filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionalSeries {
    pub granularity: TimeGranularity,
    pub grouping: RegionGrouping,
    /// Every period from the first to the last observed, ascending.
    pub periods: Vec<NaiveDate>,
    /// All timestamped observations per period, including those lacking
    /// the grouping key.
    pub totals: Vec<u64>,
    /// Sorted by region key.
    pub regions: Vec<RegionCounts>,
}

impl RegionalSeries {
    /// Returns the index of `period_start` on the period axis.
    #[must_use]
    pub fn index_of(&self, period_start: NaiveDate) -> Option<usize> {
        self.periods.binary_search(&period_start).ok()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_granularity_aliases() {
        assert_eq!("day".parse::<TimeGranularity>(), Ok(TimeGranularity::Daily));
        assert_eq!("Semana".parse::<TimeGranularity>(), Ok(TimeGranularity::Weekly));
        assert_eq!("mes".parse::<TimeGranularity>(), Ok(TimeGranularity::Monthly));
        assert_eq!("ANO".parse::<TimeGranularity>(), Ok(TimeGranularity::Yearly));
        assert!("fortnight".parse::<TimeGranularity>().is_err());
    }

    #[test]
    fn display_is_short_name() {
        assert_eq!(TimeGranularity::Weekly.to_string(), "week");
        assert_eq!(
            TimeGranularity::Weekly.to_string().parse::<TimeGranularity>(),
            Ok(TimeGranularity::Weekly)
        );
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-01-07 is a Sunday.
        let start = TimeGranularity::Weekly.period_start(d(2024, 1, 7));
        assert_eq!(start, d(2024, 1, 1));
        assert_eq!(start.weekday(), Weekday::Mon);
        assert_eq!(TimeGranularity::Weekly.period_start(d(2024, 1, 8)), d(2024, 1, 8));
    }

    #[test]
    fn month_and_year_starts() {
        assert_eq!(TimeGranularity::Monthly.period_start(d(2024, 2, 29)), d(2024, 2, 1));
        assert_eq!(TimeGranularity::Yearly.period_start(d(2024, 8, 15)), d(2024, 1, 1));
    }

    #[test]
    fn period_end_is_last_day() {
        assert_eq!(TimeGranularity::Monthly.period_end(d(2024, 2, 1)), d(2024, 2, 29));
        assert_eq!(TimeGranularity::Weekly.period_end(d(2024, 1, 1)), d(2024, 1, 7));
        assert_eq!(TimeGranularity::Daily.period_end(d(2024, 1, 1)), d(2024, 1, 1));
    }

    #[test]
    fn periods_between_is_inclusive() {
        let periods = TimeGranularity::Monthly.periods_between(d(2024, 1, 20), d(2024, 3, 2));
        assert_eq!(periods, vec![d(2024, 1, 1), d(2024, 2, 1), d(2024, 3, 1)]);
    }

    #[test]
    fn top_clamps_to_row_count() {
        let table = RegionalTable {
            grouping: RegionGrouping::State,
            total: 1,
            excluded: 0,
            rows: vec![RegionalAggregate {
                key: "SP".to_string(),
                name: "São Paulo".to_string(),
                count: 1,
                percentage: 100.0,
            }],
        };
        assert_eq!(table.top(10).len(), 1);
        assert_eq!(table.top(0).len(), 0);
    }

    #[test]
    fn series_serializes_camel_case() {
        let series = TemporalSeries::empty(TimeGranularity::Daily, DEFAULT_WINDOW);
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["granularity"], "daily");
        assert_eq!(json["droppedRecords"], 0);
    }
}
