#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cleaning of raw hotspot rows.
//!
//! Turns a [`RawDataset`] into validated [`Observation`]s:
//!
//! 1. Normalize column names and aliases ([`columns`]).
//! 2. Remove exact duplicate rows.
//! 3. Parse timestamps, coordinates, state, biome and numeric fields.
//! 4. Reject rows with unusable coordinates or state codes.
//! 5. Fill missing confidence and FRP values with the column median.
//!
//! Rejections never fail the batch. They are counted in the returned
//! [`CleaningReport`] and logged.

pub mod columns;
pub mod output;

use std::collections::HashSet;

use queimadas_analytics::stats::median;
use queimadas_hotspot_models::{Biome, Coordinates, Observation, Uf};
use queimadas_source::parsing::{
    non_empty, parse_confidence, parse_f64, parse_lat_lng, parse_timestamp,
};
use queimadas_source_models::{RawDataset, RawRecord};
use serde::Serialize;

pub use output::{CleanError, ObservationRow, write_observations_csv};

/// Per-batch cleaning counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningReport {
    pub rows_read: usize,
    pub duplicates_removed: usize,
    /// Missing, unparseable or outside Brazil.
    pub invalid_coordinates: usize,
    /// Missing or not one of the 27 UFs.
    pub invalid_states: usize,
    /// Kept, but with no usable timestamp.
    pub missing_timestamps: usize,
    /// A biome name was present but not recognized.
    pub unknown_biomes: usize,
    pub filled_confidence: usize,
    pub filled_frp: usize,
    pub rows_kept: usize,
}

impl CleaningReport {
    #[must_use]
    pub const fn rows_rejected(&self) -> usize {
        self.invalid_coordinates + self.invalid_states
    }
}

/// Cleaned observations together with the counters that produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedBatch {
    pub observations: Vec<Observation>,
    pub report: CleaningReport,
}

/// Why a single row was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Coordinates,
    State,
}

/// Cleans a raw dataset.
#[must_use]
pub fn clean(dataset: &RawDataset) -> CleanedBatch {
    let mut report = CleaningReport {
        rows_read: dataset.len(),
        ..CleaningReport::default()
    };

    let normalized = columns::normalize_dataset(dataset);
    let unique = dedup(normalized.records);
    report.duplicates_removed = report.rows_read - unique.len();

    let mut observations = Vec::with_capacity(unique.len());
    for (i, record) in unique.iter().enumerate() {
        match parse_record(record, &mut report) {
            Ok(observation) => observations.push(observation),
            Err(rejection) => {
                match rejection {
                    Rejection::Coordinates => report.invalid_coordinates += 1,
                    Rejection::State => report.invalid_states += 1,
                }
                log::debug!("Row {i} rejected ({rejection:?}): {record:?}");
            }
        }
    }

    fill_missing(&mut observations, &mut report);
    report.rows_kept = observations.len();

    if report.duplicates_removed > 0 {
        log::info!("Removed {} duplicate rows", report.duplicates_removed);
    }
    if report.invalid_coordinates > 0 {
        log::warn!(
            "Dropped {} rows with missing or out-of-bounds coordinates",
            report.invalid_coordinates
        );
    }
    if report.invalid_states > 0 {
        log::warn!(
            "Dropped {} rows with a missing or invalid UF",
            report.invalid_states
        );
    }
    if report.missing_timestamps > 0 {
        log::warn!(
            "{} rows have no parseable timestamp",
            report.missing_timestamps
        );
    }
    if report.unknown_biomes > 0 {
        log::warn!(
            "{} rows have an unrecognized biome",
            report.unknown_biomes
        );
    }
    log::info!(
        "Cleaning: {} rows read, {} kept",
        report.rows_read,
        report.rows_kept
    );

    CleanedBatch {
        observations,
        report,
    }
}

/// Removes exact duplicates, keeping the first occurrence.
fn dedup(records: Vec<RawRecord>) -> Vec<RawRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.clone()))
        .collect()
}

fn field<'a>(record: &'a RawRecord, column: &str) -> Option<&'a str> {
    record.get(column).and_then(|v| non_empty(v))
}

fn parse_record(record: &RawRecord, report: &mut CleaningReport) -> Result<Observation, Rejection> {
    let coordinates = parse_lat_lng(
        field(record, columns::LATITUDE),
        field(record, columns::LONGITUDE),
    )
    .and_then(|(lat, lon)| Coordinates::new(lat, lon).ok())
    .ok_or(Rejection::Coordinates)?;

    let state = field(record, columns::STATE)
        .and_then(Uf::parse_code_or_name)
        .ok_or(Rejection::State)?;

    let observed_at = field(record, columns::DATE).and_then(parse_timestamp);
    if observed_at.is_none() {
        report.missing_timestamps += 1;
    }

    let biome = field(record, columns::BIOME).and_then(|name| {
        name.parse::<Biome>()
            .map_err(|e| {
                report.unknown_biomes += 1;
                log::debug!("{e}");
            })
            .ok()
    });

    Ok(Observation {
        observed_at,
        coordinates,
        state,
        biome,
        municipality: field(record, columns::MUNICIPALITY).map(str::to_string),
        satellite: field(record, columns::SATELLITE).map(str::to_string),
        confidence: field(record, columns::CONFIDENCE).and_then(parse_confidence),
        frp: field(record, columns::FRP).and_then(parse_f64),
    })
}

/// Fills missing confidence and FRP with the median of the values present.
/// Columns with no values at all are left empty.
fn fill_missing(observations: &mut [Observation], report: &mut CleaningReport) {
    let confidences: Vec<f64> = observations
        .iter()
        .filter_map(|o| o.confidence.map(f64::from))
        .collect();
    if confidences.len() < observations.len()
        && let Some(m) = median(&confidences)
    {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let fill = m.round().clamp(0.0, 100.0) as u8;
        for o in observations.iter_mut().filter(|o| o.confidence.is_none()) {
            o.confidence = Some(fill);
            report.filled_confidence += 1;
        }
        log::info!(
            "Filled {} missing confidence values with median {fill}",
            report.filled_confidence
        );
    }

    let frps: Vec<f64> = observations.iter().filter_map(|o| o.frp).collect();
    if frps.len() < observations.len()
        && let Some(m) = median(&frps)
    {
        for o in observations.iter_mut().filter(|o| o.frp.is_none()) {
            o.frp = Some(m);
            report.filled_frp += 1;
        }
        log::info!("Filled {} missing FRP values with median {m}", report.filled_frp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> RawDataset {
        RawDataset {
            columns: columns.iter().map(ToString::to_string).collect(),
            records: rows
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .zip(row.iter())
                        .map(|(c, v)| ((*c).to_string(), (*v).to_string()))
                        .collect()
                })
                .collect(),
        }
    }

    #[test]
    fn drops_invalid_state_codes() {
        let raw = dataset(
            &["data", "latitude", "longitude", "uf"],
            &[
                &["2024-01-01 10:00:00", "-23.5", "-46.6", "SP"],
                &["2024-01-01 11:00:00", "-23.5", "-46.6", "XX"],
            ],
        );
        let batch = clean(&raw);
        assert_eq!(batch.observations.len(), 1);
        assert_eq!(batch.observations[0].state, Uf::Sp);
        assert_eq!(batch.report.invalid_states, 1);
    }

    #[test]
    fn drops_coordinates_outside_brazil() {
        let raw = dataset(
            &["lat", "lon", "estado"],
            &[
                &["40.7", "-74.0", "SP"],
                &["", "-50.0", "MT"],
                &["-10.0", "-55.0", "MT"],
            ],
        );
        let batch = clean(&raw);
        assert_eq!(batch.observations.len(), 1);
        assert_eq!(batch.report.invalid_coordinates, 2);
        assert_eq!(batch.report.rows_rejected(), 2);
    }

    #[test]
    fn removes_exact_duplicates_after_normalization() {
        let raw = dataset(
            &["DataHora", "Lat", "Lon", "UF"],
            &[
                &["2024-01-01 10:00:00", "-10.0", "-55.0", "MT"],
                &["2024-01-01 10:00:00", "-10.0", "-55.0", "MT"],
                &["2024-01-01 10:05:00", "-10.0", "-55.0", "MT"],
            ],
        );
        let batch = clean(&raw);
        assert_eq!(batch.report.duplicates_removed, 1);
        assert_eq!(batch.observations.len(), 2);
    }

    #[test]
    fn keeps_rows_with_bad_timestamps_as_none() {
        let raw = dataset(
            &["data", "latitude", "longitude", "uf"],
            &[&["ontem", "-10.0", "-55.0", "MT"]],
        );
        let batch = clean(&raw);
        assert_eq!(batch.observations.len(), 1);
        assert!(batch.observations[0].observed_at.is_none());
        assert_eq!(batch.report.missing_timestamps, 1);
    }

    #[test]
    fn unknown_biomes_become_none_and_are_counted() {
        let raw = dataset(
            &["latitude", "longitude", "uf", "bioma"],
            &[
                &["-3.1", "-60.0", "AM", "Amazônia"],
                &["-3.1", "-60.1", "AM", "Tundra"],
                &["-3.1", "-60.2", "AM", ""],
            ],
        );
        let batch = clean(&raw);
        assert_eq!(batch.observations[0].biome, Some(Biome::Amazonia));
        assert_eq!(batch.observations[1].biome, None);
        assert_eq!(batch.observations[2].biome, None);
        assert_eq!(batch.report.unknown_biomes, 1);
    }

    #[test]
    fn fills_numeric_gaps_with_median() {
        let raw = dataset(
            &["latitude", "longitude", "uf", "confianca", "frp"],
            &[
                &["-10.0", "-55.0", "MT", "10", "1.0"],
                &["-10.1", "-55.0", "MT", "30", "3.0"],
                &["-10.2", "-55.0", "MT", "", "5.0"],
                &["-10.3", "-55.0", "MT", "50", ""],
            ],
        );
        let batch = clean(&raw);
        assert_eq!(batch.observations[2].confidence, Some(30));
        assert_eq!(batch.observations[3].frp, Some(3.0));
        assert_eq!(batch.report.filled_confidence, 1);
        assert_eq!(batch.report.filled_frp, 1);
    }

    #[test]
    fn categorical_gaps_stay_empty() {
        let raw = dataset(
            &["latitude", "longitude", "uf", "municipio", "satelite"],
            &[&["-10.0", "-55.0", "MT", "", " "]],
        );
        let batch = clean(&raw);
        assert_eq!(batch.observations[0].municipality, None);
        assert_eq!(batch.observations[0].satellite, None);
    }

    #[test]
    fn accepts_full_state_names() {
        let raw = dataset(
            &["latitude", "longitude", "estado"],
            &[&["-10.0", "-55.0", "MATO GROSSO"]],
        );
        assert_eq!(clean(&raw).observations[0].state, Uf::Mt);
    }

    #[test]
    fn empty_dataset_yields_empty_batch() {
        let batch = clean(&RawDataset::empty());
        assert!(batch.observations.is_empty());
        assert_eq!(batch.report, CleaningReport::default());
    }
}
