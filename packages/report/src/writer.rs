//! Writing report files.

use std::path::{Path, PathBuf};

use queimadas_report_models::ReportData;

use crate::{ReportError, ReportFormat, html::render_html};

/// Base file name for a report, stamped with its generation time.
#[must_use]
pub fn report_stem(data: &ReportData) -> String {
    format!("relatorio_{}", data.generated_at.format("%Y%m%d_%H%M%S"))
}

/// Writes `data` into `output_dir` in the requested format(s), creating the
/// directory if needed. Returns the written paths, HTML first.
///
/// # Errors
///
/// Returns [`ReportError`] if serialization or a file write fails.
pub fn write_report(
    data: &ReportData,
    output_dir: &Path,
    format: ReportFormat,
) -> Result<Vec<PathBuf>, ReportError> {
    std::fs::create_dir_all(output_dir)?;
    let stem = report_stem(data);
    let mut written = Vec::new();

    if format.includes_html() {
        let path = output_dir.join(format!("{stem}.html"));
        std::fs::write(&path, render_html(data))?;
        log::info!("Wrote HTML report to {}", path.display());
        written.push(path);
    }

    if format.includes_json() {
        let path = output_dir.join(format!("{stem}.json"));
        std::fs::write(&path, serde_json::to_string_pretty(data)?)?;
        log::info!("Wrote JSON report to {}", path.display());
        written.push(path);
    }

    Ok(written)
}
