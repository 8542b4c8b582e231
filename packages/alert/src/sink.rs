//! Alert delivery.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use queimadas_alert_models::{Alert, NotificationConfig};

use crate::AlertError;

/// Somewhere alerts can be sent.
pub trait AlertSink: Send + Sync {
    /// Short name for log messages.
    fn name(&self) -> &str;

    /// Delivers `alerts`. An empty slice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError`] if delivery fails.
    fn deliver(&self, alerts: &[Alert]) -> Result<(), AlertError>;
}

/// Writes each alert through `log::warn!`.
pub struct LogSink;

impl AlertSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn deliver(&self, alerts: &[Alert]) -> Result<(), AlertError> {
        for alert in alerts {
            log::warn!("ALERT {alert}");
        }
        Ok(())
    }
}

/// Appends alert blocks to a text file.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one block stamped with `at`.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Io`] if the file cannot be opened or written.
    pub fn append(&self, alerts: &[Alert], at: DateTime<Utc>) -> Result<(), AlertError> {
        if alerts.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format_block(alerts, at).as_bytes())?;
        log::info!("Appended {} alerts to {}", alerts.len(), self.path.display());
        Ok(())
    }
}

impl AlertSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn deliver(&self, alerts: &[Alert]) -> Result<(), AlertError> {
        self.append(alerts, Utc::now())
    }
}

/// Renders the text block written by [`FileSink`].
#[must_use]
pub fn format_block(alerts: &[Alert], at: DateTime<Utc>) -> String {
    let stamp = at.format("%Y-%m-%d %H:%M:%S");
    let mut block = format!("--- ALERTS: {stamp} ---\n");
    for alert in alerts {
        block.push_str(&alert.message());
        block.push('\n');
    }
    block.push_str(&format!("--- END ALERTS: {stamp} ---\n\n"));
    block
}

/// Builds the sinks enabled in `config`.
#[must_use]
pub fn sinks_from_config(config: &NotificationConfig) -> Vec<Box<dyn AlertSink>> {
    let mut sinks: Vec<Box<dyn AlertSink>> = Vec::new();
    if config.log.enabled {
        sinks.push(Box::new(LogSink));
    }
    if config.file.enabled {
        sinks.push(Box::new(FileSink::new(&config.file.path)));
    }
    sinks
}

/// Delivers to every sink, logging failures instead of stopping.
/// Returns the number of sinks that failed.
pub fn deliver_all(sinks: &[Box<dyn AlertSink>], alerts: &[Alert]) -> usize {
    if alerts.is_empty() {
        log::info!("No alerts to deliver");
        return 0;
    }
    sinks
        .iter()
        .filter(|sink| match sink.deliver(alerts) {
            Ok(()) => false,
            Err(e) => {
                log::error!("Alert sink '{}' failed: {e}", sink.name());
                true
            }
        })
        .count()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use queimadas_alert_models::{AlertKind, AlertRule, Severity};

    use super::*;

    fn alert(observed: u64) -> Alert {
        let day = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        Alert {
            kind: AlertKind::GlobalDaily,
            rule: AlertRule::Absolute,
            region: None,
            region_name: None,
            period_start: day,
            period_end: day,
            observed,
            limit: 1000.0,
            baseline_mean: None,
            percent_increase: None,
            severity: Severity::Medium,
            timestamp: day.and_hms_opt(0, 0, 0).unwrap().and_utc(),
        }
    }

    fn at() -> DateTime<Utc> {
        "2024-08-16T09:30:00Z".parse().unwrap()
    }

    #[test]
    fn block_has_header_and_footer() {
        let block = format_block(&[alert(1200), alert(1500)], at());
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines[0], "--- ALERTS: 2024-08-16 09:30:00 ---");
        assert_eq!(lines[1], alert(1200).message());
        assert_eq!(lines[3], "--- END ALERTS: 2024-08-16 09:30:00 ---");
    }

    #[test]
    fn file_sink_appends_blocks() {
        let dir = std::env::temp_dir().join("queimadas_file_sink_test");
        let _ = std::fs::remove_dir_all(&dir);
        let sink = FileSink::new(dir.join("logs").join("alerts.log"));
        sink.append(&[alert(1200)], at()).unwrap();
        sink.append(&[alert(1300)], at()).unwrap();
        let text = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(text.matches("--- ALERTS:").count(), 2);
        assert!(text.contains("1300 hotspots"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_alert_list_writes_nothing() {
        let dir = std::env::temp_dir().join("queimadas_file_sink_empty_test");
        let _ = std::fs::remove_dir_all(&dir);
        let sink = FileSink::new(dir.join("alerts.log"));
        sink.deliver(&[]).unwrap();
        assert!(!sink.path().exists());
    }

    #[test]
    fn sinks_follow_config() {
        let mut config = NotificationConfig::default();
        assert_eq!(sinks_from_config(&config).len(), 2);
        config.file.enabled = false;
        let sinks = sinks_from_config(&config);
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks[0].name(), "log");
    }

    #[test]
    fn deliver_all_counts_failures() {
        struct Broken;
        impl AlertSink for Broken {
            fn name(&self) -> &'static str {
                "broken"
            }
            fn deliver(&self, _alerts: &[Alert]) -> Result<(), AlertError> {
                Err(AlertError::InvalidConfig {
                    message: "down".to_string(),
                })
            }
        }
        let sinks: Vec<Box<dyn AlertSink>> = vec![Box::new(LogSink), Box::new(Broken)];
        assert_eq!(deliver_all(&sinks, &[alert(1200)]), 1);
        assert_eq!(deliver_all(&sinks, &[]), 0);
    }
}
