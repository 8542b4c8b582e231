#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hotspot alerting.
//!
//! [`evaluator`] turns per-period counts into [`Alert`]s according to an
//! [`AlertConfig`]; [`sink`] delivers them. Configuration loading in
//! [`config`] never fails: a bad file falls back to the defaults.

pub mod config;
pub mod evaluator;
pub mod sink;

pub use config::{ConfigFormat, ConfigLoad, load_config, write_default_config};
pub use evaluator::{AlertSnapshot, RegionSnapshot, evaluate, evaluate_latest, evaluate_series};
pub use queimadas_alert_models::{Alert, AlertConfig};
pub use sink::{AlertSink, FileSink, LogSink, deliver_all, sinks_from_config};

/// Errors from alert configuration and delivery.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// I/O error (config read, alert log write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration could not be parsed.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration could not be rendered as TOML.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON configuration could not be parsed or rendered.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration parsed but holds unusable values.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what went wrong.
        message: String,
    },
}
