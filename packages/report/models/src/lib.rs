#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report data types.
//!
//! A [`ReportData`] holds everything a rendered report shows. It is
//! assembled once from the aggregates and alerts and then handed to the
//! HTML and JSON writers unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use queimadas_alert_models::{Alert, AlertKind, Severity};
use queimadas_analytics_models::{
    PeriodicAggregate, RegionalAggregate, SeriesStats, TimeGranularity,
};
use queimadas_hotspot_models::RegionGrouping;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of rows kept in each regional table by default.
pub const DEFAULT_TOP_N: usize = 10;

/// Number of trailing periods the trend label compares.
pub const TREND_WINDOW: usize = 7;

/// Direction of the recent counts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    /// Short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Increasing => "Increasing",
            Self::Decreasing => "Decreasing",
            Self::Stable => "Stable",
        }
    }

    #[must_use]
    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Increasing => "\u{25b2}",
            Self::Decreasing => "\u{25bc}",
            Self::Stable => "\u{25ac}",
        }
    }
}

/// Calendar span covered by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    /// Start of the first period.
    pub start: NaiveDate,
    /// Last day of the last period.
    pub end: NaiveDate,
    /// Days from `start` to `end`, inclusive.
    pub days: i64,
}

/// Headline figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Observations counted by the temporal series.
    pub total_observations: u64,
    /// `total_observations` divided by the days in the period.
    pub daily_mean: f64,
    pub states_affected: usize,
    pub biomes_affected: usize,
    /// Observations left out of the temporal series for lacking a timestamp.
    pub dropped_records: usize,
}

/// Top rows of one regional table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSection {
    pub grouping: RegionGrouping,
    /// Total over all regions, not only the rows shown.
    pub total: u64,
    /// Observations that lacked the grouping key.
    pub excluded: usize,
    /// Number of regions before truncation.
    pub region_count: usize,
    pub rows: Vec<RegionalAggregate>,
}

/// A period flagged as a peak by the temporal aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakPeriod {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub count: u64,
    pub percent_of_max: f64,
}

/// An alert formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertLine {
    pub severity: Severity,
    pub kind: AlertKind,
    pub period_start: NaiveDate,
    pub message: String,
}

impl From<&Alert> for AlertLine {
    fn from(alert: &Alert) -> Self {
        Self {
            severity: alert.severity,
            kind: alert.kind,
            period_start: alert.period_start,
            message: alert.message(),
        }
    }
}

/// Row counts from the cleaning stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningSummary {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_rejected: usize,
    pub duplicates_removed: usize,
    pub missing_timestamps: usize,
}

/// Everything a report shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub granularity: TimeGranularity,
    /// `None` when there were no timestamped observations.
    pub period: Option<ReportPeriod>,
    pub summary: ReportSummary,
    /// `None` with fewer than two periods.
    pub trend: Option<Trend>,
    pub stats: SeriesStats,
    pub series: Vec<PeriodicAggregate>,
    pub states: RegionSection,
    pub biomes: RegionSection,
    pub peaks: Vec<PeakPeriod>,
    pub alerts: Vec<AlertLine>,
    pub cleaning: Option<CleaningSummary>,
}

impl ReportData {
    /// Number of alerts with [`Severity::High`].
    #[must_use]
    pub fn high_alerts(&self) -> usize {
        self.alerts
            .iter()
            .filter(|a| a.severity == Severity::High)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_strings() {
        assert_eq!(Trend::Increasing.to_string(), "increasing");
        assert_eq!("stable".parse::<Trend>().unwrap(), Trend::Stable);
        assert_eq!(Trend::Decreasing.label(), "Decreasing");
        assert_eq!(
            serde_json::to_string(&Trend::Decreasing).unwrap(),
            "\"decreasing\""
        );
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = ReportSummary {
            total_observations: 15,
            daily_mean: 7.5,
            states_affected: 1,
            biomes_affected: 0,
            dropped_records: 2,
        };
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["totalObservations"], 15);
        assert_eq!(json["droppedRecords"], 2);
    }
}
