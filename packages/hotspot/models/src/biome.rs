//! Brazilian biome taxonomy.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// One of Brazil's six major biomes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Biome {
    Amazonia,
    Caatinga,
    Cerrado,
    MataAtlantica,
    Pampa,
    Pantanal,
}

/// Error returned when a string does not name a known biome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBiomeError {
    /// The input that failed to parse.
    pub value: String,
}

impl std::fmt::Display for UnknownBiomeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown biome '{}'", self.value)
    }
}

impl std::error::Error for UnknownBiomeError {}

impl Biome {
    /// Returns the stable code (e.g. `"MATA_ATLANTICA"`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Amazonia => "AMAZONIA",
            Self::Caatinga => "CAATINGA",
            Self::Cerrado => "CERRADO",
            Self::MataAtlantica => "MATA_ATLANTICA",
            Self::Pampa => "PAMPA",
            Self::Pantanal => "PANTANAL",
        }
    }

    /// Returns the Portuguese display name (e.g. `"Mata Atlântica"`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Amazonia => "Amazônia",
            Self::Caatinga => "Caatinga",
            Self::Cerrado => "Cerrado",
            Self::MataAtlantica => "Mata Atlântica",
            Self::Pampa => "Pampa",
            Self::Pantanal => "Pantanal",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Amazonia,
            Self::Caatinga,
            Self::Cerrado,
            Self::MataAtlantica,
            Self::Pampa,
            Self::Pantanal,
        ]
    }
}

/// Folds a place name down to lowercase ASCII letters and digits so that
/// `"Mata Atlântica"`, `"mata_atlantica"` and `"MATA-ATLANTICA"` compare
/// equal.
#[must_use]
pub fn fold_name(s: &str) -> String {
    s.chars()
        .filter_map(|c| {
            let c = match c.to_lowercase().next().unwrap_or(c) {
                'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
                'é' | 'è' | 'ê' | 'ë' => 'e',
                'í' | 'ì' | 'î' | 'ï' => 'i',
                'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
                'ú' | 'ù' | 'û' | 'ü' => 'u',
                'ç' => 'c',
                other => other,
            };
            c.is_ascii_alphanumeric().then_some(c)
        })
        .collect()
}

impl FromStr for Biome {
    type Err = UnknownBiomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_name(s).as_str() {
            "amazonia" | "amazon" => Ok(Self::Amazonia),
            "caatinga" => Ok(Self::Caatinga),
            "cerrado" => Ok(Self::Cerrado),
            "mataatlantica" | "atlanticforest" => Ok(Self::MataAtlantica),
            "pampa" => Ok(Self::Pampa),
            "pantanal" => Ok(Self::Pantanal),
            _ => Err(UnknownBiomeError {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_accented_and_plain_names() {
        assert_eq!("Amazônia".parse::<Biome>(), Ok(Biome::Amazonia));
        assert_eq!("Amazonia".parse::<Biome>(), Ok(Biome::Amazonia));
        assert_eq!("Mata Atlântica".parse::<Biome>(), Ok(Biome::MataAtlantica));
        assert_eq!("MATA_ATLANTICA".parse::<Biome>(), Ok(Biome::MataAtlantica));
        assert_eq!("pantanal".parse::<Biome>(), Ok(Biome::Pantanal));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("Desconhecido".parse::<Biome>().is_err());
        assert!("".parse::<Biome>().is_err());
    }

    #[test]
    fn display_name_roundtrips_through_parse() {
        for biome in Biome::all() {
            assert_eq!(biome.name().parse::<Biome>(), Ok(*biome));
            assert_eq!(biome.to_string().parse::<Biome>(), Ok(*biome));
        }
    }
}
