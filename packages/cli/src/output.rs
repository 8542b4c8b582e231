//! Intermediate CSV outputs of a run.

use std::path::{Path, PathBuf};

use queimadas_analytics_models::{RegionalTable, TemporalSeries};
use queimadas_hotspot_models::Observation;
use serde::Serialize;

use crate::pipeline::PipelineError;

/// File names under the run's data directory.
pub const CLEANED_FILE: &str = "focos_limpos.csv";
pub const STATES_FILE: &str = "focos_por_uf.csv";
pub const BIOMES_FILE: &str = "focos_por_bioma.csv";

#[must_use]
pub fn series_file(series: &TemporalSeries) -> String {
    format!("focos_por_{}.csv", series.granularity)
}

/// Writes `rows` as a headed CSV file.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be created or a row fails
/// to serialize.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the cleaned observations, the temporal series and both regional
/// tables into `dir`. Returns the written paths.
///
/// # Errors
///
/// Returns [`PipelineError`] if the directory or a file cannot be written.
pub fn write_intermediates(
    dir: &Path,
    observations: &[Observation],
    series: &TemporalSeries,
    states: &RegionalTable,
    biomes: &RegionalTable,
) -> Result<Vec<PathBuf>, PipelineError> {
    std::fs::create_dir_all(dir)?;

    let cleaned = dir.join(CLEANED_FILE);
    queimadas_clean::write_observations_csv(&cleaned, observations)?;

    let series_path = dir.join(series_file(series));
    write_rows(&series_path, &series.points)?;

    let states_path = dir.join(STATES_FILE);
    write_rows(&states_path, &states.rows)?;

    let biomes_path = dir.join(BIOMES_FILE);
    write_rows(&biomes_path, &biomes.rows)?;

    log::info!("Wrote intermediate files to {}", dir.display());
    Ok(vec![cleaned, series_path, states_path, biomes_path])
}
