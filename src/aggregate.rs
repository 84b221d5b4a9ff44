//! Merges analysis output and advisory text into the final result model.

use std::path::Path;

use crate::report::types::{AnalysisResult, RiskCounts, Summary};

/// Attach one advisory string to each finding, in order. Each finding's
/// advisory is filled exactly once; the zip truncates to the shorter side,
/// but the enricher guarantees equal lengths.
pub fn attach_advisories(mut result: AnalysisResult, advisories: Vec<String>) -> AnalysisResult {
    debug_assert_eq!(result.findings.len(), advisories.len());
    for (finding, advisory) in result.findings.iter_mut().zip(advisories) {
        finding.advisory = Some(advisory);
    }
    result
}

/// Derive the run summary from the immutable result.
pub fn summarize(result: &AnalysisResult, target_path: &Path) -> Summary {
    Summary {
        target_path: target_path.to_path_buf(),
        total_files: result.files_analyzed.len(),
        total_lines: result.total_lines(),
        language_breakdown: result.language_stats.clone(),
        risk_counts: RiskCounts::tally(&result.findings),
    }
}
