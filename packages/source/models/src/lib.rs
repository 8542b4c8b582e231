#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw hotspot dataset types.
//!
//! Sources hand the cleaning stage a [`RawDataset`]: untyped rows keyed by
//! whatever column names the provider used. Nothing here is validated;
//! cleaning turns these rows into typed observations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One untyped source row: column name to cell text.
///
/// Column names are kept exactly as the provider wrote them.
pub type RawRecord = BTreeMap<String, String>;

/// A batch of raw rows from a single source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDataset {
    /// Column headers in file order (first file wins when merging).
    pub columns: Vec<String>,
    /// All rows, in read order.
    pub records: Vec<RawRecord>,
}

impl RawDataset {
    /// Creates an empty dataset.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            columns: Vec::new(),
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends another dataset's rows, adding any columns not yet seen.
    pub fn extend(&mut self, other: Self) {
        for column in other.columns {
            if !self.columns.contains(&column) {
                self.columns.push(column);
            }
        }
        self.records.extend(other.records);
    }
}
