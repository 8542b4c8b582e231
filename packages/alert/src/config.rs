//! Loading the alert configuration file.
//!
//! The file is TOML, or JSON when its name ends in `.json`. Any failure
//! (missing file, parse error, invalid values) is logged and the built-in
//! defaults are used instead; the reason is kept in
//! [`ConfigLoad::fallback`].

use std::path::Path;

use queimadas_alert_models::AlertConfig;

use crate::AlertError;

/// On-disk format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Picks the format from the file extension; TOML unless `.json`.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            Self::Json
        } else {
            Self::Toml
        }
    }
}

/// Result of loading a configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLoad {
    pub config: AlertConfig,
    /// Why the defaults were used, if they were.
    pub fallback: Option<String>,
}

/// Loads the configuration at `path`, or the defaults when `path` is
/// `None` or unusable.
#[must_use]
pub fn load_config(path: Option<&Path>) -> ConfigLoad {
    let Some(path) = path else {
        log::info!("No alert configuration given, using defaults");
        return ConfigLoad {
            config: AlertConfig::default(),
            fallback: None,
        };
    };

    match read_config(path) {
        Ok(config) => {
            log::info!("Loaded alert configuration from {}", path.display());
            ConfigLoad {
                config,
                fallback: None,
            }
        }
        Err(e) => {
            let reason = format!("{}: {e}", path.display());
            log::warn!("Alert configuration unusable, using defaults: {reason}");
            ConfigLoad {
                config: AlertConfig::default(),
                fallback: Some(reason),
            }
        }
    }
}

/// Reads, parses and validates a configuration file.
///
/// # Errors
///
/// Returns [`AlertError`] if the file cannot be read, parsed or validated.
pub fn read_config(path: &Path) -> Result<AlertConfig, AlertError> {
    let text = std::fs::read_to_string(path)?;
    parse_config(&text, ConfigFormat::from_path(path))
}

/// Parses and validates configuration text.
///
/// Unknown region keys are logged and ignored.
///
/// # Errors
///
/// Returns [`AlertError`] if the text cannot be parsed or holds invalid
/// values.
pub fn parse_config(text: &str, format: ConfigFormat) -> Result<AlertConfig, AlertError> {
    let config: AlertConfig = match format {
        ConfigFormat::Toml => toml::from_str(text)?,
        ConfigFormat::Json => serde_json::from_str(text)?,
    };
    validate(&config)?;

    for key in config.limits.per_region.unknown_keys() {
        log::warn!("Ignoring unknown region '{key}' in limits.per_region");
    }
    Ok(config)
}

/// Checks values that deserialize fine but cannot be used.
///
/// # Errors
///
/// Returns [`AlertError::InvalidConfig`] describing the first bad value.
pub fn validate(config: &AlertConfig) -> Result<(), AlertError> {
    let multiplier = config.anomaly.stddev_multiplier;
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(AlertError::InvalidConfig {
            message: format!("anomaly.stddev_multiplier must be a non-negative number, got {multiplier}"),
        });
    }
    if config.anomaly.window == 0 {
        return Err(AlertError::InvalidConfig {
            message: "anomaly.window must be at least 1".to_string(),
        });
    }
    if config.notification.file.enabled && config.notification.file.path.as_os_str().is_empty() {
        return Err(AlertError::InvalidConfig {
            message: "notification.file.path is empty".to_string(),
        });
    }
    Ok(())
}

/// Renders `config` as TOML.
///
/// # Errors
///
/// Returns [`AlertError::TomlSerialize`] if serialization fails.
pub fn to_toml(config: &AlertConfig) -> Result<String, AlertError> {
    Ok(toml::to_string_pretty(config)?)
}

/// Writes the default configuration to `path` (TOML, or JSON for `.json`),
/// creating parent directories.
///
/// # Errors
///
/// Returns [`AlertError`] if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), AlertError> {
    let config = AlertConfig::default();
    let text = match ConfigFormat::from_path(path) {
        ConfigFormat::Toml => to_toml(&config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    log::info!("Wrote default alert configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use queimadas_hotspot_models::{Region, Uf};

    use super::*;

    #[test]
    fn no_path_means_defaults_without_fallback() {
        let load = load_config(None);
        assert_eq!(load.config, AlertConfig::default());
        assert!(load.fallback.is_none());
    }

    #[test]
    fn missing_file_falls_back() {
        let path = std::env::temp_dir().join("queimadas_no_such_config.toml");
        let load = load_config(Some(&path));
        assert_eq!(load.config, AlertConfig::default());
        assert!(load.fallback.is_some());
    }

    #[test]
    fn malformed_toml_falls_back() {
        let dir = std::env::temp_dir().join("queimadas_malformed_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("alerts.toml");
        std::fs::write(&path, "[limits.global\ndaily = ").unwrap();
        let load = load_config(Some(&path));
        assert_eq!(load.config, AlertConfig::default());
        assert!(load.fallback.unwrap().contains("alerts.toml"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn negative_multiplier_is_invalid() {
        let err = parse_config("[anomaly]\nstddev_multiplier = -1.0\n", ConfigFormat::Toml);
        assert!(matches!(err, Err(AlertError::InvalidConfig { .. })));
    }

    #[test]
    fn negative_limit_is_a_parse_error() {
        assert!(parse_config("[limits.global]\ndaily = -5\n", ConfigFormat::Toml).is_err());
    }

    #[test]
    fn parses_json_documents() {
        let config = parse_config(
            r#"{"limits": {"per_region": {"default": 7, "SP": 8}}}"#,
            ConfigFormat::Json,
        )
        .unwrap();
        assert_eq!(config.limits.per_region.limit_for(Region::State(Uf::Sp)), 8);
        assert_eq!(config.limits.per_region.default, 7);
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("alerts")), ConfigFormat::Toml);
    }

    #[test]
    fn default_config_round_trips_through_file() {
        let dir = std::env::temp_dir().join("queimadas_default_config_test");
        for name in ["alerts.toml", "alerts.json"] {
            let path = dir.join(name);
            write_default_config(&path).unwrap();
            let load = load_config(Some(&path));
            assert!(load.fallback.is_none(), "{name}: {:?}", load.fallback);
            assert_eq!(load.config, AlertConfig::default());
        }
        std::fs::remove_dir_all(&dir).ok();
    }
}
