//! Alert evaluation.
//!
//! An [`AlertSnapshot`] captures everything the rules need about one
//! evaluated period: its national count, the preceding national counts,
//! and each region's count with its preceding history. [`evaluate`] is a
//! pure function of a snapshot and an [`AlertConfig`]: the same input
//! always yields the same alerts in the same order.
//!
//! Order: global daily, global weekly, then regions by key with the
//! absolute rule before the relative one.

use chrono::NaiveDate;
use queimadas_alert_models::{Alert, AlertConfig, AlertKind, AlertRule, Severity};
use queimadas_analytics::stats;
use queimadas_analytics_models::{RegionalSeries, TimeGranularity};
use queimadas_hotspot_models::Region;

/// Number of periods, ending at the evaluated one, summed for the weekly
/// national rule.
pub const WEEKLY_WINDOW: usize = 7;

/// Percent increase over the baseline above which a relative alert is
/// [`Severity::High`].
pub const HIGH_INCREASE_PERCENT: f64 = 100.0;

/// One region's view of the evaluated period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSnapshot {
    pub region: Region,
    pub count: u64,
    /// Preceding counts, oldest first.
    pub history: Vec<u64>,
}

/// Inputs for evaluating one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSnapshot {
    pub granularity: TimeGranularity,
    pub period_start: NaiveDate,
    pub global_count: u64,
    /// Preceding national counts, oldest first, one entry per period.
    pub global_history: Vec<u64>,
    pub regions: Vec<RegionSnapshot>,
}

impl AlertSnapshot {
    /// Builds the snapshot for period `index` of the given regional series.
    ///
    /// National counts come from the first series' totals. Each region's
    /// history holds up to `window` preceding periods. Returns `None` when
    /// `index` is out of range or no series is given.
    #[must_use]
    pub fn at(series: &[&RegionalSeries], index: usize, window: usize) -> Option<Self> {
        let first = series.first()?;
        let period_start = *first.periods.get(index)?;
        let global_start = index.saturating_sub(window.max(WEEKLY_WINDOW - 1));
        let region_start = index.saturating_sub(window);

        let mut regions: Vec<RegionSnapshot> = series
            .iter()
            .flat_map(|s| {
                s.regions.iter().filter_map(move |r| {
                    Some(RegionSnapshot {
                        region: r.region,
                        count: *r.counts.get(index)?,
                        history: r.counts.get(region_start..index)?.to_vec(),
                    })
                })
            })
            .collect();
        regions.sort_by(|a, b| a.region.key().cmp(b.region.key()));

        Some(Self {
            granularity: first.granularity,
            period_start,
            global_count: *first.totals.get(index)?,
            global_history: first.totals.get(global_start..index)?.to_vec(),
            regions,
        })
    }

    #[must_use]
    pub fn period_end(&self) -> NaiveDate {
        self.granularity.period_end(self.period_start)
    }
}

/// Severity for an absolute ceiling: HIGH at twice the limit or more.
#[allow(clippy::cast_precision_loss)]
fn absolute_severity(observed: u64, limit: u64) -> Severity {
    if observed as f64 >= 2.0 * limit as f64 {
        Severity::High
    } else {
        Severity::Medium
    }
}

fn base_alert(snapshot: &AlertSnapshot, kind: AlertKind, rule: AlertRule) -> Alert {
    Alert {
        kind,
        rule,
        region: None,
        region_name: None,
        period_start: snapshot.period_start,
        period_end: snapshot.period_end(),
        observed: 0,
        limit: 0.0,
        baseline_mean: None,
        percent_increase: None,
        severity: Severity::Medium,
        timestamp: snapshot
            .period_start
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn absolute_alert(
    snapshot: &AlertSnapshot,
    kind: AlertKind,
    observed: u64,
    limit: u64,
) -> Option<Alert> {
    (observed > limit).then(|| Alert {
        observed,
        limit: limit as f64,
        severity: absolute_severity(observed, limit),
        ..base_alert(snapshot, kind, AlertRule::Absolute)
    })
}

/// Baseline rule: `count > mean + n * std_dev` with a positive mean.
#[allow(clippy::cast_precision_loss)]
fn relative_alert(
    snapshot: &AlertSnapshot,
    region: &RegionSnapshot,
    multiplier: f64,
) -> Option<Alert> {
    let history: Vec<f64> = region.history.iter().map(|&c| c as f64).collect();
    let mean = stats::mean(&history);
    if mean <= 0.0 {
        return None;
    }
    let threshold = mean + multiplier * stats::sample_std_dev(&history);
    let observed = region.count as f64;
    if observed <= threshold {
        return None;
    }

    let increase = (observed - mean) / mean * 100.0;
    Some(
        Alert {
            observed: region.count,
            limit: threshold,
            baseline_mean: Some(mean),
            percent_increase: Some(increase),
            severity: if increase > HIGH_INCREASE_PERCENT {
                Severity::High
            } else {
                Severity::Medium
            },
            ..base_alert(
                snapshot,
                AlertKind::for_grouping(region.region.grouping()),
                AlertRule::Relative,
            )
        }
        .with_region(region.region),
    )
}

/// Evaluates every rule against one snapshot.
#[must_use]
pub fn evaluate(snapshot: &AlertSnapshot, config: &AlertConfig) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let global = &config.limits.global;

    if let Some(alert) = absolute_alert(
        snapshot,
        AlertKind::GlobalDaily,
        snapshot.global_count,
        global.daily,
    ) {
        alerts.push(alert);
    }

    let tail_len = snapshot.global_history.len().min(WEEKLY_WINDOW - 1);
    let tail = &snapshot.global_history[snapshot.global_history.len() - tail_len..];
    let weekly_sum = snapshot.global_count + tail.iter().sum::<u64>();
    if let Some(mut alert) = absolute_alert(
        snapshot,
        AlertKind::GlobalWeekly,
        weekly_sum,
        global.weekly,
    ) {
        let periods_back = u32::try_from(tail_len).unwrap_or(0);
        alert.period_start = rewind(snapshot.granularity, snapshot.period_start, periods_back);
        alerts.push(alert);
    }

    for region in &snapshot.regions {
        let limit = config.limits.per_region.limit_for(region.region);
        let kind = AlertKind::for_grouping(region.region.grouping());
        if let Some(alert) = absolute_alert(snapshot, kind, region.count, limit) {
            alerts.push(alert.with_region(region.region));
        }
        if let Some(alert) = relative_alert(snapshot, region, config.anomaly.stddev_multiplier) {
            alerts.push(alert);
        }
    }

    alerts
}

/// Steps back `periods` periods from `start`.
fn rewind(granularity: TimeGranularity, start: NaiveDate, periods: u32) -> NaiveDate {
    let mut current = start;
    for _ in 0..periods {
        let Some(previous) = current.pred_opt() else {
            break;
        };
        current = granularity.period_start(previous);
    }
    current
}

/// Evaluates every period of the series in order.
#[must_use]
pub fn evaluate_series(series: &[&RegionalSeries], config: &AlertConfig) -> Vec<Alert> {
    let periods = series.first().map_or(0, |s| s.periods.len());
    let alerts: Vec<Alert> = (0..periods)
        .filter_map(|i| AlertSnapshot::at(series, i, config.anomaly.window))
        .flat_map(|snapshot| evaluate(&snapshot, config))
        .collect();
    log::info!("Evaluated {periods} periods, {} alerts", alerts.len());
    alerts
}

/// Evaluates only the last period of the series.
#[must_use]
pub fn evaluate_latest(series: &[&RegionalSeries], config: &AlertConfig) -> Vec<Alert> {
    let Some(last) = series
        .first()
        .and_then(|s| s.periods.len().checked_sub(1))
    else {
        log::info!("No periods to evaluate");
        return Vec::new();
    };
    let alerts = AlertSnapshot::at(series, last, config.anomaly.window)
        .map(|snapshot| evaluate(&snapshot, config))
        .unwrap_or_default();
    log::info!("Evaluated latest period, {} alerts", alerts.len());
    alerts
}

#[cfg(test)]
mod tests {
    use queimadas_alert_models::RegionLimits;
    use queimadas_analytics::regional_series;
    use queimadas_hotspot_models::{Biome, Coordinates, Observation, RegionGrouping, Uf};

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn obs(day: &str, state: Uf, biome: Option<Biome>) -> Observation {
        Observation {
            observed_at: format!("{day}T10:00:00Z").parse().ok(),
            coordinates: Coordinates::new(-23.5, -46.6).unwrap(),
            state,
            biome,
            municipality: None,
            satellite: None,
            confidence: None,
            frp: None,
        }
    }

    fn config_with(default: u64, overrides: &[(&str, u64)]) -> AlertConfig {
        let mut config = AlertConfig::default();
        config.limits.per_region = RegionLimits {
            default,
            overrides: overrides
                .iter()
                .map(|(k, v)| ((*k).to_string(), *v))
                .collect(),
        };
        config
    }

    fn snapshot(count: u64, history: Vec<u64>) -> AlertSnapshot {
        AlertSnapshot {
            granularity: TimeGranularity::Daily,
            period_start: d(2024, 8, 15),
            global_count: count,
            global_history: history.clone(),
            regions: vec![RegionSnapshot {
                region: Region::State(Uf::Mt),
                count,
                history,
            }],
        }
    }

    #[test]
    fn sp_scenario_alerts_only_on_first_day() {
        let mut input: Vec<Observation> = (0..10).map(|_| obs("2024-01-01", Uf::Sp, None)).collect();
        input.extend((0..5).map(|_| obs("2024-01-02", Uf::Sp, None)));
        let states = regional_series(&input, RegionGrouping::State, TimeGranularity::Daily);
        assert_eq!(states.regions[0].counts, vec![10, 5]);

        let config = config_with(100, &[("SP", 8)]);
        let alerts = evaluate_series(&[&states], &config);
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.period_start, d(2024, 1, 1));
        assert_eq!(alert.kind, AlertKind::PerState);
        assert_eq!(alert.rule, AlertRule::Absolute);
        assert_eq!(alert.region.as_deref(), Some("SP"));
        assert_eq!(alert.observed, 10);
        assert_eq!(alert.severity, Severity::Medium);
    }

    #[test]
    fn missing_region_limit_uses_default() {
        let config = config_with(100, &[("PA", 300)]);
        let mut snap = snapshot(150, vec![]);
        snap.regions[0].region = Region::State(Uf::Am);
        let alerts = evaluate(&snap, &config);
        assert_eq!(alerts.len(), 1);
        assert!((alerts[0].limit - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn absolute_severity_doubles() {
        let config = config_with(100, &[]);
        let alerts = evaluate(&snapshot(200, vec![]), &config);
        assert_eq!(alerts[0].severity, Severity::High);
        let alerts = evaluate(&snapshot(199, vec![]), &config);
        assert_eq!(alerts[0].severity, Severity::Medium);
    }

    #[test]
    fn relative_rule_uses_preceding_baseline() {
        let config = config_with(1000, &[]);
        // mean 10, std 0: 25 > 10 -> +150% -> HIGH
        let alerts = evaluate(&snapshot(25, vec![10, 10, 10]), &config);
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.rule, AlertRule::Relative);
        assert_eq!(alert.baseline_mean, Some(10.0));
        assert!((alert.percent_increase.unwrap() - 150.0).abs() < 1e-9);
        assert_eq!(alert.severity, Severity::High);

        // +50% -> MEDIUM
        let alerts = evaluate(&snapshot(15, vec![10, 10, 10]), &config);
        assert_eq!(alerts[0].severity, Severity::Medium);
    }

    #[test]
    fn relative_rule_respects_deviation() {
        let config = config_with(1000, &[]);
        // mean 10, sample std ~11.55, threshold ~27.3 with multiplier 1.5
        let relative = |count| {
            evaluate(&snapshot(count, vec![0, 20, 0, 20]), &config)
                .iter()
                .any(|a| a.rule == AlertRule::Relative)
        };
        assert!(!relative(24));
        assert!(relative(30));
    }

    #[test]
    fn zero_baseline_never_triggers_relative() {
        let config = config_with(1000, &[]);
        assert!(evaluate(&snapshot(50, vec![0, 0, 0]), &config).is_empty());
        assert!(evaluate(&snapshot(50, vec![]), &config).is_empty());
    }

    #[test]
    fn global_rules_fire_independently() {
        let mut config = config_with(10_000, &[]);
        config.limits.global.daily = 100;
        config.limits.global.weekly = 500;
        config.anomaly.stddev_multiplier = 100.0;

        let alerts = evaluate(&snapshot(150, vec![80, 100, 90]), &config);
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::GlobalDaily]);

        let alerts = evaluate(&snapshot(90, vec![90, 90, 90, 90, 90, 90, 90]), &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::GlobalWeekly);
        assert_eq!(alerts[0].observed, 630);
        // Window covers the evaluated day and the six before it.
        assert_eq!(alerts[0].period_start, d(2024, 8, 9));
        assert_eq!(alerts[0].period_end, d(2024, 8, 15));
    }

    #[test]
    fn regions_are_ordered_by_key_absolute_first() {
        let input: Vec<Observation> = [
            ("2024-01-01", Uf::Pa, Some(Biome::Amazonia)),
            ("2024-01-01", Uf::Am, Some(Biome::Amazonia)),
        ]
        .iter()
        .flat_map(|(day, uf, biome)| (0..3).map(move |_| obs(day, *uf, *biome)))
        .collect();
        let states = regional_series(&input, RegionGrouping::State, TimeGranularity::Daily);
        let biomes = regional_series(&input, RegionGrouping::Biome, TimeGranularity::Daily);
        let config = config_with(1, &[]);

        let alerts = evaluate_series(&[&states, &biomes], &config);
        let keys: Vec<&str> = alerts.iter().filter_map(|a| a.region.as_deref()).collect();
        assert_eq!(keys, vec!["AM", "AMAZONIA", "PA"]);
        assert_eq!(alerts[1].kind, AlertKind::PerBiome);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let input: Vec<Observation> = (1..=9)
            .flat_map(|day| {
                let n = if day == 9 { 40 } else { 5 + day % 3 };
                (0..n).map(move |_| obs(&format!("2024-03-{day:02}"), Uf::Mt, Some(Biome::Cerrado)))
            })
            .collect();
        let states = regional_series(&input, RegionGrouping::State, TimeGranularity::Daily);
        let config = config_with(20, &[]);
        let first = evaluate_series(&[&states], &config);
        let second = evaluate_series(&[&states], &config);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn latest_only_evaluates_last_period() {
        let mut input: Vec<Observation> = (0..10).map(|_| obs("2024-01-01", Uf::Sp, None)).collect();
        input.extend((0..5).map(|_| obs("2024-01-02", Uf::Sp, None)));
        let states = regional_series(&input, RegionGrouping::State, TimeGranularity::Daily);
        let config = config_with(8, &[]);
        assert!(evaluate_latest(&[&states], &config).is_empty());
    }

    #[test]
    fn empty_input_raises_nothing() {
        let states = regional_series(&[], RegionGrouping::State, TimeGranularity::Daily);
        let config = AlertConfig::default();
        assert!(evaluate_series(&[&states], &config).is_empty());
        assert!(evaluate_latest(&[&states], &config).is_empty());
        assert!(evaluate_series(&[], &config).is_empty());
    }

    #[test]
    fn snapshot_history_is_bounded_by_window() {
        let input: Vec<Observation> = (1..=10)
            .map(|day| obs(&format!("2024-05-{day:02}"), Uf::To, None))
            .collect();
        let states = regional_series(&input, RegionGrouping::State, TimeGranularity::Daily);
        let snap = AlertSnapshot::at(&[&states], 9, 3).unwrap();
        assert_eq!(snap.regions[0].history, vec![1, 1, 1]);
        assert_eq!(snap.global_history.len(), 6);
        assert!(AlertSnapshot::at(&[&states], 10, 3).is_none());
    }
}
