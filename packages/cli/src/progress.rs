//! Terminal progress bars and logger setup.
//!
//! Log lines go through `indicatif-log-bridge` so they are suspended while
//! a bar redraws instead of tearing it.

use std::io::IsTerminal as _;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use queimadas_source::progress::{LogProgress, ProgressCallback};

/// Log a progress line every this many units when stderr is not a terminal.
const LOG_PROGRESS_EVERY: u64 = 10;

/// An `indicatif` [`ProgressBar`] behind [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Applied once `set_total()` gives the bar a length.
    bar_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Spinner that becomes a bar with ETA once the number of days or files
    /// is known.
    #[must_use]
    pub fn days_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.red} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let bar_style = ProgressStyle::with_template(
            "  {msg} {wide_bar:.red/dim} {pos}/{len} {percent}% [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Arc::new(Self { bar, bar_style })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// A bar when stderr is a terminal, periodic log lines otherwise.
#[must_use]
pub fn for_terminal(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
    progress_for(multi, message, std::io::stderr().is_terminal())
}

fn progress_for(
    multi: &MultiProgress,
    message: &str,
    interactive: bool,
) -> Arc<dyn ProgressCallback> {
    if interactive {
        IndicatifProgress::days_bar(multi, message)
    } else {
        Arc::new(LogProgress::new(message, LOG_PROGRESS_EVERY))
    }
}

/// Installs `pretty_env_logger` (filtered by `RUST_LOG`, `info` when unset)
/// behind the progress bridge and returns the [`MultiProgress`] every bar
/// must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let mut builder = pretty_env_logger::formatted_builder();
    if std::env::var_os("RUST_LOG").is_some() {
        builder.parse_env("RUST_LOG");
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }
    let logger = builder.build();
    let level = logger.filter();

    // Fails only if a logger is already installed.
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);
    multi
}
