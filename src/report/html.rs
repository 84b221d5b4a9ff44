//! Styled-hypertext report renderer.

use chrono::Local;
use html_escape::encode_text;
use std::fmt::Write;

use super::percent;
use super::types::{AnalysisResult, EstimateResult, RiskLevel, Summary};

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; }
.header { background: linear-gradient(135deg, #667eea, #764ba2); color: white; padding: 20px; text-align: center; }
.container { max-width: 1200px; margin: 20px auto; background: white; padding: 20px; border-radius: 8px; }
h1 { margin: 0; font-size: 2em; }
h2 { color: #333; border-bottom: 2px solid #667eea; padding-bottom: 5px; }
table { border-collapse: collapse; width: 100%; margin: 20px 0; }
th, td { border: 1px solid #ddd; padding: 12px; text-align: left; vertical-align: top; }
th { background-color: #f2f2f2; cursor: pointer; font-weight: bold; }
th:hover { background-color: #e0e0e0; }
.critical { background-color: #ffece8; }
.high { background-color: #fef5e7; }
.medium { background-color: #fff8e1; }
.low { background-color: #f5f5f5; }
.filter-input { padding: 10px; width: 100%; border: 1px solid #ddd; border-radius: 4px; box-sizing: border-box; }
.summary-box { background: #f9f9f9; padding: 15px; border-radius: 5px; margin: 15px 0; border-left: 4px solid #667eea; }
.summary-item { margin: 5px 0; }
.section { margin: 25px 0; }
.badge { padding: 2px 8px; border-radius: 3px; }
"#;

const SCRIPT: &str = r#"
function sortTable(columnIndex) {
    const table = document.getElementById('findingsTable');
    const tbody = table.querySelector('tbody');
    const rows = Array.from(tbody.querySelectorAll('tr'));
    rows.sort((a, b) => {
        const aVal = a.cells[columnIndex].innerText.trim();
        const bVal = b.cells[columnIndex].innerText.trim();
        if (!isNaN(aVal) && !isNaN(bVal)) {
            return parseFloat(aVal) - parseFloat(bVal);
        }
        return aVal.localeCompare(bVal);
    });
    rows.forEach(row => tbody.appendChild(row));
}

document.getElementById('searchInput').addEventListener('keyup', function() {
    const searchTerm = this.value.toLowerCase();
    document.querySelectorAll('#findingsTable tbody tr').forEach(row => {
        row.style.display = row.textContent.toLowerCase().includes(searchTerm) ? '' : 'none';
    });
});
"#;

pub(crate) fn render(
    result: &AnalysisResult,
    summary: &Summary,
    estimate: Option<&EstimateResult>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "<!DOCTYPE html>\n<html>\n<head>");
    let _ = writeln!(out, "<meta charset=\"UTF-8\">");
    let _ = writeln!(out, "<title>codeaudit - source quality analysis report</title>");
    let _ = writeln!(out, "<style>{STYLE}</style>");
    let _ = writeln!(out, "</head>\n<body>");
    let _ = writeln!(out, "<div class=\"header\"><h1>codeaudit &mdash; source quality analysis report</h1></div>");
    let _ = writeln!(out, "<div class=\"container\">");

    // Summary block
    let _ = writeln!(out, "<div class=\"section\"><h2>Summary</h2>\n<div class=\"summary-box\">");
    let _ = writeln!(
        out,
        "<div class=\"summary-item\"><strong>Target:</strong> {}</div>",
        encode_text(&summary.target_path.display().to_string())
    );
    let _ = writeln!(
        out,
        "<div class=\"summary-item\"><strong>Generated:</strong> {}</div>",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(
        out,
        "<div class=\"summary-item\"><strong>Files analyzed:</strong> {}</div>",
        summary.total_files
    );
    let _ = writeln!(
        out,
        "<div class=\"summary-item\"><strong>Total lines:</strong> {}</div>",
        summary.total_lines
    );
    for level in RiskLevel::ALL {
        let _ = writeln!(
            out,
            "<div class=\"summary-item\"><strong>{} risk:</strong> <span class=\"badge\" style=\"background-color: {}\">{}</span></div>",
            level.label(),
            level.color(),
            summary.risk_counts.get(level)
        );
    }
    let _ = writeln!(out, "</div></div>");

    // Optional estimate blocks
    if let Some(estimate) = estimate {
        if estimate.effort_days > 0.0 {
            let _ = writeln!(out, "<div class=\"section\"><h2>Development effort estimate</h2>\n<div class=\"summary-box\">");
            let _ = writeln!(
                out,
                "<div class=\"summary-item\">Estimated effort under traditional manual development: <strong>{:.2}</strong> person-days</div>",
                estimate.effort_days
            );
            let _ = writeln!(out, "</div></div>");
        }
        if let Some(maintain) = &estimate.maintain {
            let _ = writeln!(out, "<div class=\"section\"><h2>Maintenance recommendation</h2>\n<div class=\"summary-box\">");
            let _ = writeln!(
                out,
                "<div class=\"summary-item\">Worth maintaining: <strong>{}</strong></div>",
                if maintain.recommended { "yes" } else { "no" }
            );
            let _ = writeln!(
                out,
                "<div class=\"summary-item\">Rationale: {}</div>",
                encode_text(&maintain.rationale)
            );
            let _ = writeln!(out, "</div></div>");
        }
    }

    // Language distribution
    let _ = writeln!(out, "<div class=\"section\"><h2>Language distribution</h2>\n<table>");
    let _ = writeln!(out, "<tr><th>Language</th><th>Files</th><th>Lines</th><th>Share</th></tr>");
    for (language, stat) in &summary.language_breakdown {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}%</td></tr>",
            encode_text(language),
            stat.files,
            stat.lines,
            percent(stat.lines, summary.total_lines)
        );
    }
    let _ = writeln!(out, "</table></div>");

    // Findings table
    let _ = writeln!(out, "<div class=\"section\"><h2>Findings</h2>");
    let _ = writeln!(
        out,
        "<input type=\"text\" id=\"searchInput\" placeholder=\"Filter findings...\" class=\"filter-input\">"
    );
    let _ = writeln!(out, "<table id=\"findingsTable\">\n<thead>\n<tr>");
    for (i, column) in ["File", "Line", "Severity", "Kind", "Message", "Remedy", "Advisory"]
        .iter()
        .enumerate()
    {
        let _ = writeln!(out, "<th onclick=\"sortTable({i})\">{column}</th>");
    }
    let _ = writeln!(out, "</tr>\n</thead>\n<tbody>");
    for finding in &result.findings {
        let _ = writeln!(out, "<tr class=\"{}\">", finding.severity.tag());
        let _ = writeln!(
            out,
            "<td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            encode_text(&finding.file.display().to_string()),
            finding.line,
            finding.severity.label(),
            encode_text(&finding.kind),
            encode_text(&finding.message),
            encode_text(&finding.remedy),
            encode_text(finding.advisory.as_deref().unwrap_or("none")),
        );
        let _ = writeln!(out, "</tr>");
    }
    let _ = writeln!(out, "</tbody>\n</table></div>");

    let _ = writeln!(out, "<script>{SCRIPT}</script>");
    let _ = writeln!(out, "</div>\n</body>\n</html>");

    out
}
