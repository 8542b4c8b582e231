#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Alert types.
//!
//! An [`Alert`] is raised when a period's hotspot count crosses an absolute
//! ceiling or deviates sharply from its recent baseline. Threshold
//! configuration lives in [`config`].

pub mod config;

use chrono::{DateTime, NaiveDate, Utc};
use queimadas_hotspot_models::{Region, RegionGrouping};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use config::{
    AlertConfig, AnomalyConfig, FileNotification, GlobalLimits, Limits, LogNotification,
    NotificationConfig, RegionLimits,
};

/// How urgent an alert is.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Medium,
    High,
}

/// What the alert is about.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AlertKind {
    /// The evaluated period's national count.
    GlobalDaily,
    /// The national count summed over a trailing window.
    GlobalWeekly,
    PerState,
    PerBiome,
}

impl AlertKind {
    #[must_use]
    pub const fn for_grouping(grouping: RegionGrouping) -> Self {
        match grouping {
            RegionGrouping::State => Self::PerState,
            RegionGrouping::Biome => Self::PerBiome,
        }
    }
}

/// Which rule fired.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertRule {
    /// Count above a fixed ceiling.
    Absolute,
    /// Count above the baseline mean plus a multiple of its deviation.
    Relative,
}

/// A raised alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub kind: AlertKind,
    pub rule: AlertRule,
    /// Region key (UF code or biome code) for per-region alerts.
    pub region: Option<String>,
    /// Region display name for per-region alerts.
    pub region_name: Option<String>,
    pub period_start: NaiveDate,
    /// Last day covered, inclusive.
    pub period_end: NaiveDate,
    pub observed: u64,
    /// Ceiling for absolute alerts, `mean + n * std_dev` for relative ones.
    pub limit: f64,
    pub baseline_mean: Option<f64>,
    pub percent_increase: Option<f64>,
    pub severity: Severity,
    /// Start of the evaluated period, so alerts depend only on their input.
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Attaches a region to the alert.
    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region.key().to_string());
        self.region_name = Some(region.name().to_string());
        self
    }

    /// Human-readable one-line description.
    #[must_use]
    pub fn message(&self) -> String {
        let period = if self.period_start == self.period_end {
            self.period_start.to_string()
        } else {
            format!("{} to {}", self.period_start, self.period_end)
        };
        let scope = match (&self.region_name, &self.region) {
            (Some(name), Some(key)) if name != key => format!("{name} ({key})"),
            (_, Some(key)) => key.clone(),
            _ => "Brazil".to_string(),
        };

        match (self.kind, self.rule) {
            (AlertKind::GlobalDaily, _) => format!(
                "[{}] {period}: {} hotspots nationwide exceed the daily limit of {}",
                self.severity, self.observed, self.limit
            ),
            (AlertKind::GlobalWeekly, _) => format!(
                "[{}] {period}: {} hotspots nationwide exceed the weekly limit of {}",
                self.severity, self.observed, self.limit
            ),
            (_, AlertRule::Absolute) => format!(
                "[{}] {period}: {scope} has {} hotspots, above its limit of {}",
                self.severity, self.observed, self.limit
            ),
            (_, AlertRule::Relative) => format!(
                "[{}] {period}: {scope} has {} hotspots, {:.1}% above its recent mean of {:.1}",
                self.severity,
                self.observed,
                self.percent_increase.unwrap_or(0.0),
                self.baseline_mean.unwrap_or(0.0)
            ),
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}
