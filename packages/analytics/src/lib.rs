#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hotspot analytics.
//!
//! All functions are synchronous and operate on in-memory observations.
//! [`temporal`] buckets observations into calendar periods; [`spatial`]
//! counts them per state or biome. Empty input always produces empty
//! results rather than an error.

pub mod spatial;
pub mod stats;
pub mod temporal;

pub use spatial::{aggregate_by, filter_by_region, regional_series};
pub use temporal::{aggregate, filter_by_date_range};
