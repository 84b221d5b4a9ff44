pub mod types;

mod html;
mod pdf;
mod text;

pub use types::{AnalysisResult, EstimateResult, Finding, RiskLevel, Summary};

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render {format} report: {reason}")]
    Render { format: String, reason: String },
}

/// Requested output document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Txt,
    Html,
    Pdf,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Html, ReportFormat::Pdf, ReportFormat::Txt];

    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Txt => "txt",
            ReportFormat::Html => "html",
            ReportFormat::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

// Distinguishes reports written within the same timestamp tick, so repeated
// runs never overwrite earlier output.
static RUN_SEQ: AtomicU64 = AtomicU64::new(0);

fn run_stamp() -> String {
    format!(
        "{}_{}",
        Local::now().format("%Y%m%d%H%M%S%3f"),
        RUN_SEQ.fetch_add(1, Ordering::Relaxed)
    )
}

/// Render the result into every requested format under `out_dir`.
///
/// Each format renders independently from the same immutable inputs; a
/// failing format is logged and skipped without touching files that other
/// formats already wrote. Errors out only when the output directory cannot
/// be created or every requested format failed.
pub fn emit(
    result: &AnalysisResult,
    summary: &Summary,
    estimate: Option<&EstimateResult>,
    formats: &[ReportFormat],
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(out_dir)?;
    let stamp = run_stamp();

    let mut written = Vec::new();
    let mut last_error = None;
    for &format in formats {
        let path = out_dir.join(format!("analysis_report_{stamp}.{}", format.extension()));
        match write_report(format, &path, result, summary, estimate) {
            Ok(()) => {
                debug!(path = %path.display(), "report written");
                written.push(path);
            }
            Err(err) => {
                error!(format = %format, error = %err, "report format failed, skipping");
                last_error = Some(err);
            }
        }
    }

    match (written.is_empty(), last_error) {
        (true, Some(err)) => Err(err),
        _ => Ok(written),
    }
}

fn write_report(
    format: ReportFormat,
    path: &Path,
    result: &AnalysisResult,
    summary: &Summary,
    estimate: Option<&EstimateResult>,
) -> Result<(), ReportError> {
    match format {
        ReportFormat::Txt => fs::write(path, text::render(result, summary, estimate))?,
        ReportFormat::Html => fs::write(path, html::render(result, summary, estimate))?,
        ReportFormat::Pdf => fs::write(path, pdf::render(result, summary, estimate)?)?,
    }
    Ok(())
}

/// Share of `part` in `total` as a percentage; 0% for an empty total rather
/// than a division fault.
pub(crate) fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
