//! Source-tree quality analysis pipeline.
//!
//! One run flows through fixed stages: classify the target's files by
//! language, run analyzer backends over them, enrich the findings with
//! advisory notes, aggregate into a summary and emit reports. Stages hand
//! owned data forward; nothing downstream mutates a stage that already ran.

pub mod advisory;
pub mod aggregate;
pub mod analysis;
pub mod classify;
pub mod config;
pub mod report;

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, info_span, Instrument};

use crate::advisory::Enricher;
use crate::classify::standards;
use crate::config::AnalysisRequest;
use crate::report::{ReportError, Summary};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Classify(#[from] classify::ClassifyError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Final outcome of one analysis run, shaped for both human and JSON output.
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    pub success: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub report_paths: Vec<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub message: String,
}

/// Run the full pipeline. Never panics and never returns Err: any stage
/// failure is folded into a failed outcome so callers get one uniform shape.
pub async fn run(request: AnalysisRequest) -> RunOutcome {
    let span = info_span!("analysis_run", target = %request.target_path.display());
    match execute(request).instrument(span).await {
        Ok(outcome) => outcome,
        Err(err) => RunOutcome {
            success: false,
            report_paths: Vec::new(),
            summary: None,
            error: Some(err.to_string()),
            message: "source quality analysis failed".to_string(),
        },
    }
}

async fn execute(request: AnalysisRequest) -> Result<RunOutcome, RunError> {
    info!("starting analysis");

    let mut classification = classify::classify(&request.target_path, &request.exclude_patterns)?;

    // An explicit language list narrows the run to those languages; the
    // default is every language detected in the tree.
    if !request.language_types.is_empty() {
        let requested: BTreeSet<String> = request
            .language_types
            .iter()
            .map(|l| l.to_ascii_lowercase())
            .collect();
        classification
            .files
            .retain(|file| classify::language_for(file).is_some_and(|l| requested.contains(l)));
        classification.languages.retain(|l| requested.contains(l));
    }

    let standards = standards::resolve(&classification.languages, &request.analysis_standard);
    let result = analysis::run(&classification.files, &standards).await;

    let enricher = Enricher::new(request.advisory.as_ref(), request.advisory_disabled);
    let advisories = enricher.enrich(&result.findings).await;
    let estimate = enricher
        .estimate(
            result.files_analyzed.len(),
            result.total_lines(),
            &result.language_stats,
        )
        .await;

    let result = aggregate::attach_advisories(result, advisories);
    let summary = aggregate::summarize(&result, &request.target_path);

    let report_paths = report::emit(
        &result,
        &summary,
        estimate.as_ref(),
        &request.report_formats,
        &request.report_path,
    )?;

    info!(
        files = summary.total_files,
        findings = result.findings.len(),
        reports = report_paths.len(),
        "analysis complete"
    );

    Ok(RunOutcome {
        success: true,
        report_paths,
        summary: Some(summary),
        error: None,
        message: "source quality analysis completed".to_string(),
    })
}
