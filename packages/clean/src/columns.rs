//! Column name normalization.
//!
//! INPE exports, TerraBrasilis mirrors and hand-made spreadsheets name the
//! same fields differently (`data_hora_gmt`, `lat`, `estado`, ...). Every
//! header is folded to lowercase snake case and then mapped onto one of the
//! canonical names below.

use queimadas_source_models::{RawDataset, RawRecord};

pub const DATE: &str = "data";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const SATELLITE: &str = "satelite";
pub const COUNTRY: &str = "pais";
pub const STATE: &str = "uf";
pub const MUNICIPALITY: &str = "municipio";
pub const BIOME: &str = "bioma";
pub const FRP: &str = "frp";
pub const CONFIDENCE: &str = "confianca";

/// Alias to canonical column name. Canonical names map to themselves
/// implicitly.
const ALIASES: &[(&str, &str)] = &[
    ("data_hora", DATE),
    ("datahora", DATE),
    ("data_hora_gmt", DATE),
    ("data_pas", DATE),
    ("timestamp", DATE),
    ("lat", LATITUDE),
    ("latidude", LATITUDE),
    ("long", LONGITUDE),
    ("lon", LONGITUDE),
    ("satellite", SATELLITE),
    ("sat", SATELLITE),
    ("country", COUNTRY),
    ("país", COUNTRY),
    ("estado", STATE),
    ("estado_sigla", STATE),
    ("sigla_estado", STATE),
    ("state", STATE),
    ("cidade", MUNICIPALITY),
    ("city", MUNICIPALITY),
    ("município", MUNICIPALITY),
    ("biome", BIOME),
    ("potencia_radiativa_fogo", FRP),
    ("fire_radiative_power", FRP),
    ("confidence", CONFIDENCE),
    ("conf", CONFIDENCE),
    ("confiança", CONFIDENCE),
];

/// Folds a header to lowercase, trims it and replaces inner whitespace
/// with `_`, then resolves aliases.
#[must_use]
pub fn normalize_column(name: &str) -> String {
    let folded = name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map_or(folded, |(_, canonical)| (*canonical).to_string())
}

/// Renames every column of `dataset` to its canonical name.
///
/// When two source columns collapse onto the same name, the first one in
/// header order wins for each row unless its cell is empty.
#[must_use]
pub fn normalize_dataset(dataset: &RawDataset) -> RawDataset {
    let renames: Vec<(&String, String)> = dataset
        .columns
        .iter()
        .map(|c| (c, normalize_column(c)))
        .collect();

    let mut columns: Vec<String> = Vec::with_capacity(renames.len());
    for (original, canonical) in &renames {
        if original.as_str() != canonical {
            log::debug!("Column '{original}' -> '{canonical}'");
        }
        if !columns.contains(canonical) {
            columns.push(canonical.clone());
        }
    }

    let records = dataset
        .records
        .iter()
        .map(|record| {
            let mut out = RawRecord::new();
            for (original, canonical) in &renames {
                let Some(value) = record.get(*original) else {
                    continue;
                };
                let slot = out.entry(canonical.clone()).or_default();
                if slot.is_empty() {
                    slot.clone_from(value);
                }
            }
            out
        })
        .collect();

    RawDataset { columns, records }
}
