//! Alert threshold configuration.
//!
//! Every section and key is optional; anything missing takes its default.
//!
//! ```toml
//! [limits.global]
//! daily = 1000
//! weekly = 5000
//!
//! [limits.per_region]
//! default = 100
//! AM = 200
//! Amazonia = 500
//!
//! [anomaly]
//! window = 7
//! stddev_multiplier = 1.5
//!
//! [notification.file]
//! enabled = true
//! path = "logs/alerts.log"
//! ```
//!
//! A relative `notification.file.path` is resolved against the run's output
//! directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use queimadas_hotspot_models::Region;
use serde::{Deserialize, Serialize};

/// Root of the alert configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub limits: Limits,
    pub anomaly: AnomalyConfig,
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub global: GlobalLimits,
    pub per_region: RegionLimits,
}

/// National ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalLimits {
    /// Ceiling on a single period's count.
    pub daily: u64,
    /// Ceiling on the sum of the trailing seven periods.
    pub weekly: u64,
}

impl Default for GlobalLimits {
    fn default() -> Self {
        Self {
            daily: 1000,
            weekly: 5000,
        }
    }
}

/// Per-region ceilings keyed by UF code or biome name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionLimits {
    /// Ceiling for regions without an explicit entry.
    #[serde(default = "default_region_limit")]
    pub default: u64,
    #[serde(flatten)]
    pub overrides: BTreeMap<String, u64>,
}

const fn default_region_limit() -> u64 {
    100
}

impl Default for RegionLimits {
    fn default() -> Self {
        let overrides = [("AM", 200), ("PA", 300), ("Amazonia", 500), ("Cerrado", 300)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self {
            default: default_region_limit(),
            overrides,
        }
    }
}

impl RegionLimits {
    /// Returns the ceiling configured for `region`, or the default.
    #[must_use]
    pub fn limit_for(&self, region: Region) -> u64 {
        self.overrides
            .iter()
            .find(|(key, _)| Region::parse(key) == Some(region))
            .map_or(self.default, |(_, limit)| *limit)
    }

    /// Keys that name neither a UF nor a biome.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.overrides
            .keys()
            .map(String::as_str)
            .filter(|key| Region::parse(key).is_none())
    }
}

/// Relative (baseline) rule parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Number of preceding periods in the baseline.
    pub window: usize,
    /// Standard deviations above the baseline mean that raise an alert.
    pub stddev_multiplier: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            window: 7,
            stddev_multiplier: 1.5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub log: LogNotification,
    pub file: FileNotification,
}

impl NotificationConfig {
    /// Anchors a relative alert file path at `base`. Absolute paths are
    /// kept as is.
    #[must_use]
    pub fn relative_to(mut self, base: &Path) -> Self {
        if self.file.path.is_relative() {
            self.file.path = base.join(&self.file.path);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogNotification {
    pub enabled: bool,
}

impl Default for LogNotification {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Append-only alert log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNotification {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for FileNotification {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("logs/alerts.log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use queimadas_hotspot_models::{Biome, Uf};

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AlertConfig::default();
        assert_eq!(config.limits.global.daily, 1000);
        assert_eq!(config.limits.global.weekly, 5000);
        assert_eq!(config.limits.per_region.default, 100);
        assert_eq!(config.anomaly.window, 7);
        assert!((config.anomaly.stddev_multiplier - 1.5).abs() < f64::EPSILON);
        assert!(config.notification.file.enabled);
    }

    #[test]
    fn limit_lookup_matches_uf_and_biome_keys() {
        let limits = RegionLimits::default();
        assert_eq!(limits.limit_for(Region::State(Uf::Am)), 200);
        assert_eq!(limits.limit_for(Region::State(Uf::Pa)), 300);
        assert_eq!(limits.limit_for(Region::Biome(Biome::Amazonia)), 500);
        assert_eq!(limits.limit_for(Region::State(Uf::Sp)), 100);
        assert_eq!(limits.limit_for(Region::Biome(Biome::Pampa)), 100);
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let config: AlertConfig = toml::from_str(
            r#"
            [limits.per_region]
            default = 50
            SP = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.global.daily, 1000);
        assert_eq!(config.limits.per_region.default, 50);
        assert_eq!(config.limits.per_region.limit_for(Region::State(Uf::Sp)), 8);
        // No AM entry in this document, so AM uses the default.
        assert_eq!(config.limits.per_region.limit_for(Region::State(Uf::Am)), 50);
        assert_eq!(config.anomaly, AnomalyConfig::default());
    }

    #[test]
    fn unknown_keys_are_reported() {
        let config: AlertConfig = toml::from_str(
            r#"
            [limits.per_region]
            Atlantis = 3
            mt = 10
            "#,
        )
        .unwrap();
        let unknown: Vec<&str> = config.limits.per_region.unknown_keys().collect();
        assert_eq!(unknown, vec!["Atlantis"]);
        assert_eq!(config.limits.per_region.limit_for(Region::State(Uf::Mt)), 10);
    }

    #[test]
    fn relative_alert_file_is_anchored_at_base() {
        let base = std::env::temp_dir().join("queimadas_run");
        let resolved = NotificationConfig::default().relative_to(&base);
        assert_eq!(resolved.file.path, base.join("logs").join("alerts.log"));

        let absolute = base.join("elsewhere.log");
        let mut config = NotificationConfig::default();
        config.file.path.clone_from(&absolute);
        assert_eq!(config.relative_to(&base).file.path, absolute);
    }

    #[test]
    fn accented_biome_keys_resolve() {
        let config: AlertConfig = toml::from_str(
            "[limits.per_region]\n\"Mata Atlântica\" = 42\n",
        )
        .unwrap();
        assert_eq!(
            config.limits.per_region.limit_for(Region::Biome(Biome::MataAtlantica)),
            42
        );
    }
}
