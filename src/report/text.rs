//! Structured-text report renderer.

use chrono::Local;
use std::fmt::Write;

use super::percent;
use super::types::{AnalysisResult, EstimateResult, RiskLevel, Summary};

const RULE: &str = "================================================================================";

pub(crate) fn render(
    result: &AnalysisResult,
    summary: &Summary,
    estimate: Option<&EstimateResult>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "==========================================");
    let _ = writeln!(out, "   codeaudit - source quality analysis report");
    let _ = writeln!(out, "==========================================");
    let _ = writeln!(out, "Target: {}", summary.target_path.display());
    let _ = writeln!(out, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Files analyzed: {}", summary.total_files);
    let _ = writeln!(out, "Total lines: {}", summary.total_lines);
    out.push('\n');

    let _ = writeln!(out, "Risk summary:");
    for level in RiskLevel::ALL {
        let _ = writeln!(out, "- {}: {}", level.label(), summary.risk_counts.get(level));
    }
    out.push('\n');

    let _ = writeln!(out, "Language distribution:");
    let total_lines = summary.total_lines;
    for (language, stat) in &summary.language_breakdown {
        let _ = writeln!(
            out,
            "- {}: {} files, {} lines ({:.2}%)",
            language,
            stat.files,
            stat.lines,
            percent(stat.lines, total_lines)
        );
    }
    if summary.language_breakdown.is_empty() {
        let _ = writeln!(out, "- none");
    }

    if let Some(estimate) = estimate {
        if estimate.effort_days > 0.0 {
            out.push('\n');
            let _ = writeln!(
                out,
                "Estimated development effort (traditional manual development, person-days): {:.2}",
                estimate.effort_days
            );
        }
        if let Some(maintain) = &estimate.maintain {
            out.push('\n');
            let _ = writeln!(
                out,
                "Worth maintaining: {}",
                if maintain.recommended { "yes" } else { "no" }
            );
            let _ = writeln!(out, "Rationale: {}", maintain.rationale);
        }
    }

    out.push('\n');
    let _ = writeln!(out, "Findings:");
    let _ = writeln!(out, "{RULE}");
    for (i, finding) in result.findings.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} (line {})",
            i + 1,
            finding.file.display(),
            finding.line
        );
        let _ = writeln!(out, "   Severity: {}", finding.severity.label());
        let _ = writeln!(out, "   Kind: {}", finding.kind);
        let _ = writeln!(out, "   Message: {}", finding.message);
        let _ = writeln!(out, "   Remedy: {}", finding.remedy);
        let _ = writeln!(
            out,
            "   Advisory: {}",
            finding.advisory.as_deref().unwrap_or("none")
        );
        out.push('\n');
    }
    if result.findings.is_empty() {
        let _ = writeln!(out, "No findings.");
    }
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "End of report");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate;
    use crate::report::types::{Finding, LanguageStat, MaintainAdvice};
    use std::path::{Path, PathBuf};

    fn sample_result() -> AnalysisResult {
        let mut result = AnalysisResult {
            files_analyzed: vec![PathBuf::from("app.py")],
            findings: vec![Finding {
                file: PathBuf::from("app.py"),
                line: 12,
                severity: RiskLevel::High,
                kind: "security_vulnerability".to_string(),
                message: "unvalidated input".to_string(),
                remedy: "validate input".to_string(),
                advisory: Some("sanitize at the boundary".to_string()),
            }],
            ..AnalysisResult::default()
        };
        result
            .language_stats
            .insert("python".to_string(), LanguageStat { files: 1, lines: 50 });
        result
    }

    #[test]
    fn test_all_required_sections_present() {
        let result = sample_result();
        let summary = aggregate::summarize(&result, Path::new("/project"));
        let text = render(&result, &summary, None);

        assert!(text.contains("codeaudit"));
        assert!(text.contains("Target: /project"));
        assert!(text.contains("Files analyzed: 1"));
        assert!(text.contains("Total lines: 50"));
        assert!(text.contains("Critical: 0"));
        assert!(text.contains("High: 1"));
        assert!(text.contains("python: 1 files, 50 lines (100.00%)"));
        assert!(text.contains("unvalidated input"));
        assert!(text.contains("sanitize at the boundary"));
        // No estimate blocks without an estimate
        assert!(!text.contains("Estimated development effort"));
        assert!(!text.contains("Worth maintaining"));
    }

    #[test]
    fn test_estimate_blocks_rendered_when_present() {
        let result = sample_result();
        let summary = aggregate::summarize(&result, Path::new("/project"));
        let estimate = EstimateResult {
            effort_days: 10.0,
            maintain: Some(MaintainAdvice {
                recommended: true,
                rationale: "actively used".to_string(),
            }),
        };
        let text = render(&result, &summary, Some(&estimate));
        assert!(text.contains("person-days): 10.00"));
        assert!(text.contains("Worth maintaining: yes"));
        assert!(text.contains("actively used"));
    }

    #[test]
    fn test_zero_effort_block_hidden() {
        let result = sample_result();
        let summary = aggregate::summarize(&result, Path::new("/project"));
        let estimate = EstimateResult { effort_days: 0.0, maintain: None };
        let text = render(&result, &summary, Some(&estimate));
        assert!(!text.contains("Estimated development effort"));
        assert!(!text.contains("Worth maintaining"));
    }

    #[test]
    fn test_zero_total_lines_renders_zero_percent() {
        let mut result = AnalysisResult::default();
        result
            .language_stats
            .insert("python".to_string(), LanguageStat { files: 0, lines: 0 });
        let summary = aggregate::summarize(&result, Path::new("/empty"));
        let text = render(&result, &summary, None);
        assert!(text.contains("(0.00%)"));
        assert!(text.contains("No findings."));
    }
}
