//! Progress reporting for downloads and generation runs.
//!
//! Sources report per-day progress through [`ProgressCallback`] so the CLI
//! can render an `indicatif` bar while tests stay silent.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives progress updates from a running fetch.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total number of units (days, files) expected.
    fn set_total(&self, total: u64);

    /// Advances by `delta` units.
    fn inc(&self, delta: u64);

    /// Updates the status message (typically the day being processed).
    fn set_message(&self, msg: String);

    /// Marks the work as complete.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

/// Reports progress through `log::info!` every `every` units.
///
/// Used when stderr is not a terminal and a bar would only add noise.
pub struct LogProgress {
    label: String,
    every: u64,
    total: AtomicU64,
    position: AtomicU64,
}

impl LogProgress {
    #[must_use]
    pub fn new(label: impl Into<String>, every: u64) -> Self {
        Self {
            label: label.into(),
            every: every.max(1),
            total: AtomicU64::new(0),
            position: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }
}

impl ProgressCallback for LogProgress {
    fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
    }

    fn inc(&self, delta: u64) {
        let pos = self.position.fetch_add(delta, Ordering::Relaxed) + delta;
        if pos % self.every == 0 {
            log::info!(
                "{}: {pos}/{}",
                self.label,
                self.total.load(Ordering::Relaxed)
            );
        }
    }

    fn set_message(&self, msg: String) {
        log::debug!("{}: {msg}", self.label);
    }

    fn finish(&self, msg: String) {
        log::info!("{}: {msg}", self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_progress_tracks_position() {
        let progress = LogProgress::new("test", 2);
        progress.set_total(5);
        progress.inc(1);
        progress.inc(3);
        assert_eq!(progress.position(), 4);
    }
}
