#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hotspot monitoring reports.
//!
//! [`assemble`] gathers the aggregates and alerts into a
//! [`ReportData`]; [`writer`] renders it as a self-contained HTML page
//! and/or pretty JSON.

pub mod assemble;
pub mod html;
pub mod writer;

pub use assemble::{assemble, trend};
pub use html::render_html;
pub use queimadas_report_models::ReportData;
pub use writer::write_report;

use strum_macros::{AsRefStr, Display, EnumString};

/// Errors from writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which files a report is written as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReportFormat {
    Html,
    Json,
    #[default]
    Both,
}

impl ReportFormat {
    #[must_use]
    pub const fn includes_html(self) -> bool {
        matches!(self, Self::Html | Self::Both)
    }

    #[must_use]
    pub const fn includes_json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}
