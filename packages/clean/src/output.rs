//! Flat CSV form of cleaned observations.
//!
//! The `csv` crate cannot serialize nested structs, so observations are
//! written through [`ObservationRow`], which uses the canonical column
//! names so the file can be fed back into the pipeline.

use std::path::Path;

use chrono::{DateTime, Utc};
use queimadas_hotspot_models::{Biome, Observation};
use serde::{Deserialize, Serialize};

/// Errors reading or writing observation files.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One observation as a CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub data: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub uf: String,
    pub bioma: Option<String>,
    pub municipio: Option<String>,
    pub satelite: Option<String>,
    pub confianca: Option<u8>,
    pub frp: Option<f64>,
}

impl From<&Observation> for ObservationRow {
    fn from(o: &Observation) -> Self {
        Self {
            data: o.observed_at.map(format_timestamp),
            latitude: o.coordinates.latitude(),
            longitude: o.coordinates.longitude(),
            uf: o.state.code().to_string(),
            bioma: o.biome.map(|b: Biome| b.name().to_string()),
            municipio: o.municipality.clone(),
            satelite: o.satellite.clone(),
            confianca: o.confidence,
            frp: o.frp,
        }
    }
}

fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Writes observations to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`CleanError`] if the file cannot be written.
pub fn write_observations_csv(path: &Path, observations: &[Observation]) -> Result<(), CleanError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for observation in observations {
        writer.serialize(ObservationRow::from(observation))?;
    }
    writer.flush()?;
    log::info!("Wrote {} observations to {}", observations.len(), path.display());
    Ok(())
}
