#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hotspot observation types and the Brazilian geographic taxonomy.
//!
//! Every ingestion path (INPE download, local CSV, synthetic generator)
//! ends up as [`Observation`] records after cleaning. Observations carry a
//! [`Uf`] state code, an optional [`Biome`], and [`Coordinates`] that are
//! guaranteed to fall inside Brazil's bounding envelope.

pub mod biome;
pub mod uf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use biome::{Biome, UnknownBiomeError, fold_name};
pub use uf::Uf;

/// Southern edge of Brazil's bounding envelope (degrees latitude).
pub const BRAZIL_SOUTH: f64 = -33.75;
/// Northern edge of Brazil's bounding envelope (degrees latitude).
pub const BRAZIL_NORTH: f64 = 5.2725;
/// Western edge of Brazil's bounding envelope (degrees longitude).
pub const BRAZIL_WEST: f64 = -73.99;
/// Eastern edge of Brazil's bounding envelope (degrees longitude).
pub const BRAZIL_EAST: f64 = -34.793;

/// Error returned when a coordinate pair falls outside Brazil's envelope
/// or is not a finite number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidCoordinatesError {
    /// Rejected latitude.
    pub latitude: f64,
    /// Rejected longitude.
    pub longitude: f64,
}

impl std::fmt::Display for InvalidCoordinatesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "coordinates ({}, {}) are outside Brazil's bounding envelope",
            self.latitude, self.longitude
        )
    }
}

impl std::error::Error for InvalidCoordinatesError {}

/// A WGS84 coordinate pair inside Brazil's bounding envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validates and wraps a coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinatesError`] if either value is not finite or
    /// the point lies outside the envelope.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinatesError> {
        if is_within_brazil(latitude, longitude) {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(InvalidCoordinatesError {
                latitude,
                longitude,
            })
        }
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Returns `true` if the point lies inside Brazil's bounding envelope.
/// Non-finite values are never inside.
#[must_use]
pub fn is_within_brazil(latitude: f64, longitude: f64) -> bool {
    (BRAZIL_SOUTH..=BRAZIL_NORTH).contains(&latitude)
        && (BRAZIL_WEST..=BRAZIL_EAST).contains(&longitude)
}

/// A single satellite-detected hotspot after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Detection time. `None` when the source record had a missing or
    /// unparseable timestamp; such records are still counted spatially but
    /// dropped by the temporal aggregator.
    pub observed_at: Option<DateTime<Utc>>,
    /// Validated position.
    pub coordinates: Coordinates,
    /// Federal unit the hotspot was reported in.
    pub state: Uf,
    /// Biome, if the source provided a recognizable one.
    pub biome: Option<Biome>,
    /// Municipality name as reported by the source.
    pub municipality: Option<String>,
    /// Detecting satellite (e.g. `"AQUA"`, `"NOAA-20"`).
    pub satellite: Option<String>,
    /// Detection confidence, 0-100.
    pub confidence: Option<u8>,
    /// Fire radiative power in MW.
    pub frp: Option<f64>,
}

/// A spatial grouping dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionGrouping {
    /// Group by federal unit.
    State,
    /// Group by biome.
    Biome,
}

impl std::fmt::Display for RegionGrouping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State => write!(f, "state"),
            Self::Biome => write!(f, "biome"),
        }
    }
}

/// A region key: either a federal unit or a biome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "type", content = "code", rename_all = "snake_case")]
pub enum Region {
    State(Uf),
    Biome(Biome),
}

impl Region {
    /// Returns the region an observation falls into for `grouping`, or
    /// `None` if the observation lacks that key.
    #[must_use]
    pub const fn of(observation: &Observation, grouping: RegionGrouping) -> Option<Self> {
        match grouping {
            RegionGrouping::State => Some(Self::State(observation.state)),
            RegionGrouping::Biome => match observation.biome {
                Some(biome) => Some(Self::Biome(biome)),
                None => None,
            },
        }
    }

    /// Stable key used for sorting and configuration lookup
    /// (e.g. `"SP"`, `"MATA_ATLANTICA"`).
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::State(uf) => uf.code(),
            Self::Biome(biome) => biome.code(),
        }
    }

    /// Human-readable name (e.g. `"São Paulo"`, `"Mata Atlântica"`).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::State(uf) => uf.name(),
            Self::Biome(biome) => biome.name(),
        }
    }

    #[must_use]
    pub const fn grouping(&self) -> RegionGrouping {
        match self {
            Self::State(_) => RegionGrouping::State,
            Self::Biome(_) => RegionGrouping::Biome,
        }
    }

    /// Parses a configuration key: a UF code first, then a biome name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Uf::parse_code(s)
            .map(Self::State)
            .or_else(|| s.parse::<Biome>().ok().map(Self::Biome))
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
