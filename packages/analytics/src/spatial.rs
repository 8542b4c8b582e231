//! Spatial aggregation: counts per state or per biome.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use queimadas_analytics_models::{
    RegionCounts, RegionalAggregate, RegionalSeries, RegionalTable, TimeGranularity,
};
use queimadas_hotspot_models::{Biome, Observation, Region, RegionGrouping, Uf};

/// Counts observations per region for `grouping`.
///
/// Rows are sorted by count descending, ties broken by key ascending.
/// Regions with no observations are omitted. Observations missing the
/// grouping key (a biome-less row when grouping by biome) are counted in
/// [`RegionalTable::excluded`].
#[must_use]
pub fn aggregate_by(observations: &[Observation], grouping: RegionGrouping) -> RegionalTable {
    let mut counts: BTreeMap<&'static str, (Region, u64)> = BTreeMap::new();
    let mut excluded = 0usize;
    for observation in observations {
        match Region::of(observation, grouping) {
            Some(region) => counts.entry(region.key()).or_insert((region, 0)).1 += 1,
            None => excluded += 1,
        }
    }

    if excluded > 0 {
        log::warn!("{excluded} observations have no {grouping} and were excluded");
    }

    let total: u64 = counts.values().map(|(_, c)| c).sum();
    let mut rows: Vec<RegionalAggregate> = counts
        .into_iter()
        .map(|(key, (region, count))| {
            #[allow(clippy::cast_precision_loss)]
            let percentage = 100.0 * count as f64 / total as f64;
            RegionalAggregate {
                key: key.to_string(),
                name: region.name().to_string(),
                count,
                percentage,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));

    log::debug!("{} {grouping} rows, total {total}", rows.len());
    RegionalTable {
        grouping,
        total,
        excluded,
        rows,
    }
}

/// Keeps observations in `state` and `biome`. A `None` filter matches
/// everything; with a biome set, biome-less observations are dropped.
#[must_use]
pub fn filter_by_region(
    observations: &[Observation],
    state: Option<Uf>,
    biome: Option<Biome>,
) -> Vec<Observation> {
    if state.is_none() && biome.is_none() {
        return observations.to_vec();
    }
    let kept: Vec<Observation> = observations
        .iter()
        .filter(|o| state.is_none_or(|uf| o.state == uf))
        .filter(|o| biome.is_none_or(|b| o.biome == Some(b)))
        .cloned()
        .collect();
    log::info!(
        "Region filter {}/{} kept {} of {} observations",
        state.map_or("*", Uf::code),
        biome.map_or("*", Biome::name),
        kept.len(),
        observations.len()
    );
    kept
}

/// Per-region counts for every period between the first and last observed
/// period, zero-filled.
///
/// Observations without a timestamp are ignored. Regions are sorted by key.
#[must_use]
pub fn regional_series(
    observations: &[Observation],
    grouping: RegionGrouping,
    granularity: TimeGranularity,
) -> RegionalSeries {
    let dated: Vec<(NaiveDate, &Observation)> = observations
        .iter()
        .filter_map(|o| {
            o.observed_at
                .map(|ts| (granularity.period_start(ts.date_naive()), o))
        })
        .collect();

    let periods = match (
        dated.iter().map(|(p, _)| *p).min(),
        dated.iter().map(|(p, _)| *p).max(),
    ) {
        (Some(first), Some(last)) => granularity.periods_between(first, last),
        _ => Vec::new(),
    };

    let mut totals = vec![0u64; periods.len()];
    let mut by_region: BTreeMap<&'static str, RegionCounts> = BTreeMap::new();
    for (period, observation) in &dated {
        let Ok(index) = periods.binary_search(period) else {
            continue;
        };
        totals[index] += 1;
        if let Some(region) = Region::of(observation, grouping) {
            by_region
                .entry(region.key())
                .or_insert_with(|| RegionCounts {
                    region,
                    counts: vec![0; periods.len()],
                })
                .counts[index] += 1;
        }
    }

    RegionalSeries {
        granularity,
        grouping,
        periods,
        totals,
        regions: by_region.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use queimadas_hotspot_models::Coordinates;

    use super::*;

    fn obs(day: &str, state: Uf, biome: Option<Biome>) -> Observation {
        Observation {
            observed_at: format!("{day}T08:00:00Z").parse().ok(),
            coordinates: Coordinates::new(-10.0, -50.0).unwrap(),
            state,
            biome,
            municipality: None,
            satellite: None,
            confidence: None,
            frp: None,
        }
    }

    fn sample() -> Vec<Observation> {
        vec![
            obs("2024-01-01", Uf::Pa, Some(Biome::Amazonia)),
            obs("2024-01-01", Uf::Pa, Some(Biome::Amazonia)),
            obs("2024-01-01", Uf::Mt, Some(Biome::Cerrado)),
            obs("2024-01-03", Uf::Am, Some(Biome::Amazonia)),
            obs("2024-01-03", Uf::Mt, None),
        ]
    }

    #[test]
    fn region_filter_matches_state_and_biome() {
        let all = sample();
        assert_eq!(filter_by_region(&all, None, None).len(), 5);

        let mt = filter_by_region(&all, Some(Uf::Mt), None);
        assert_eq!(mt.len(), 2);
        assert!(mt.iter().all(|o| o.state == Uf::Mt));

        let amazonia = filter_by_region(&all, None, Some(Biome::Amazonia));
        assert_eq!(amazonia.len(), 3);

        assert_eq!(filter_by_region(&all, Some(Uf::Mt), Some(Biome::Cerrado)).len(), 1);
        assert!(filter_by_region(&all, Some(Uf::Sp), None).is_empty());
    }

    #[test]
    fn sorts_by_count_then_key() {
        let table = aggregate_by(&sample(), RegionGrouping::State);
        let keys: Vec<&str> = table.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["MT", "PA", "AM"]);
        assert_eq!(table.total, 5);
        assert_eq!(table.excluded, 0);
    }

    #[test]
    fn percentages_sum_to_100() {
        for grouping in [RegionGrouping::State, RegionGrouping::Biome] {
            let table = aggregate_by(&sample(), grouping);
            let sum: f64 = table.rows.iter().map(|r| r.percentage).sum();
            assert!((sum - 100.0).abs() < 0.01, "{grouping}: {sum}");
        }
    }

    #[test]
    fn counts_equal_observations_with_key() {
        let input = sample();
        let table = aggregate_by(&input, RegionGrouping::Biome);
        let with_biome = input.iter().filter(|o| o.biome.is_some()).count() as u64;
        assert_eq!(table.total, with_biome);
        assert_eq!(table.excluded, 1);
        assert_eq!(table.rows[0].key, "AMAZONIA");
        assert_eq!(table.rows[0].name, "Amazônia");
        assert_eq!(table.rows[0].count, 3);
    }

    #[test]
    fn missing_regions_are_omitted() {
        let table = aggregate_by(&sample(), RegionGrouping::State);
        assert!(table.rows.iter().all(|r| r.count > 0));
        assert!(!table.rows.iter().any(|r| r.key == "SP"));
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = aggregate_by(&[], RegionGrouping::State);
        assert!(table.rows.is_empty());
        assert_eq!(table.total, 0);
    }

    #[test]
    fn regional_series_zero_fills_gaps() {
        let series = regional_series(&sample(), RegionGrouping::State, TimeGranularity::Daily);
        assert_eq!(series.periods.len(), 3);
        assert_eq!(series.totals, vec![3, 0, 2]);
        let keys: Vec<&str> = series.regions.iter().map(|r| r.region.key()).collect();
        assert_eq!(keys, vec!["AM", "MT", "PA"]);
        assert_eq!(series.regions[1].counts, vec![1, 0, 1]);
        assert_eq!(
            series.index_of(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()),
            Some(2)
        );
    }

    #[test]
    fn regional_series_totals_include_rows_without_key() {
        let series = regional_series(&sample(), RegionGrouping::Biome, TimeGranularity::Daily);
        assert_eq!(series.totals, vec![3, 0, 2]);
        let per_region: u64 = series.regions.iter().map(|r| r.counts[2]).sum();
        assert_eq!(per_region, 1);
    }
}
