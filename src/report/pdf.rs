//! Paginated-document report renderer.
//!
//! Built on printpdf's builtin fonts so no font files are needed at runtime.
//! Layout is a simple y-cursor with page breaks; the content sections mirror
//! the text renderer.

use chrono::Local;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use std::io::Write;

use super::percent;
use super::types::{AnalysisResult, EstimateResult, RiskLevel, Summary};
use super::ReportError;

const WRAP_COLUMNS: usize = 100;

struct PageWriter {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    layer: PdfLayerReference,
    y: Mm,
}

impl PageWriter {
    fn new(title: &str) -> Result<PageWriter, ReportError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(210.0), Mm(297.0), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(render_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(render_err)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(PageWriter { doc, regular, bold, layer, y: Mm(280.0) })
    }

    fn break_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = Mm(280.0);
    }

    fn newline(&mut self) {
        self.y = Mm(self.y.0 - 5.0);
        if self.y.0 < 15.0 {
            self.break_page();
        }
    }

    fn gap(&mut self) {
        self.y = Mm(self.y.0 - 3.0);
        if self.y.0 < 15.0 {
            self.break_page();
        }
    }

    fn line(&mut self, text: &str, bold: bool) {
        // Cloned so the font handle does not borrow self across newline().
        let font = if bold { self.bold.clone() } else { self.regular.clone() };
        for chunk in wrap(text, WRAP_COLUMNS) {
            self.layer.use_text(chunk, 9.0, Mm(15.0), self.y, &font);
            self.newline();
        }
    }

    fn heading(&mut self, text: &str) {
        self.gap();
        self.layer.use_text(text.to_string(), 12.0, Mm(15.0), self.y, &self.bold);
        self.newline();
        self.gap();
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        let mut bytes: Vec<u8> = Vec::new();
        let mut writer = std::io::BufWriter::new(&mut bytes);
        self.doc.save(&mut writer).map_err(render_err)?;
        writer.flush()?;
        drop(writer);
        Ok(bytes)
    }
}

fn render_err(err: impl std::fmt::Display) -> ReportError {
    ReportError::Render { format: "pdf".to_string(), reason: err.to_string() }
}

/// Split a line into printable chunks; builtin fonts have no shaping, so a
/// plain column wrap is enough for report text.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    if text.chars().count() <= columns {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(columns)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

pub(crate) fn render(
    result: &AnalysisResult,
    summary: &Summary,
    estimate: Option<&EstimateResult>,
) -> Result<Vec<u8>, ReportError> {
    let mut page = PageWriter::new("codeaudit - source quality analysis report")?;

    page.line("codeaudit - source quality analysis report", true);
    page.gap();
    page.line(&format!("Target: {}", summary.target_path.display()), false);
    page.line(
        &format!("Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
        false,
    );
    page.line(&format!("Files analyzed: {}", summary.total_files), false);
    page.line(&format!("Total lines: {}", summary.total_lines), false);

    page.heading("Risk summary");
    for level in RiskLevel::ALL {
        page.line(
            &format!("{}: {}", level.label(), summary.risk_counts.get(level)),
            false,
        );
    }

    if let Some(estimate) = estimate {
        if estimate.effort_days > 0.0 {
            page.heading("Development effort estimate");
            page.line(
                &format!(
                    "Estimated effort under traditional manual development: {:.2} person-days",
                    estimate.effort_days
                ),
                false,
            );
        }
        if let Some(maintain) = &estimate.maintain {
            page.heading("Maintenance recommendation");
            page.line(
                &format!(
                    "Worth maintaining: {}",
                    if maintain.recommended { "yes" } else { "no" }
                ),
                false,
            );
            page.line(&format!("Rationale: {}", maintain.rationale), false);
        }
    }

    page.heading("Language distribution");
    for (language, stat) in &summary.language_breakdown {
        page.line(
            &format!(
                "{}: {} files, {} lines ({:.2}%)",
                language,
                stat.files,
                stat.lines,
                percent(stat.lines, summary.total_lines)
            ),
            false,
        );
    }

    page.heading("Findings");
    if result.findings.is_empty() {
        page.line("No findings.", false);
    }
    for (i, finding) in result.findings.iter().enumerate() {
        page.line(
            &format!("{}. {} (line {})", i + 1, finding.file.display(), finding.line),
            true,
        );
        page.line(
            &format!("Severity: {}  Kind: {}", finding.severity.label(), finding.kind),
            false,
        );
        page.line(&format!("Message: {}", finding.message), false);
        page.line(&format!("Remedy: {}", finding.remedy), false);
        page.line(
            &format!("Advisory: {}", finding.advisory.as_deref().unwrap_or("none")),
            false,
        );
        page.gap();
    }

    page.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate;
    use crate::report::types::{Finding, LanguageStat};
    use std::path::{Path, PathBuf};

    #[test]
    fn test_wrap_short_and_long() {
        assert_eq!(wrap("short", 10), vec!["short".to_string()]);
        let chunks = wrap(&"x".repeat(25), 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[2].len(), 5);
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let mut result = AnalysisResult {
            files_analyzed: vec![PathBuf::from("app.py")],
            findings: (0..60)
                .map(|i| Finding {
                    file: PathBuf::from("app.py"),
                    line: i + 1,
                    severity: RiskLevel::Low,
                    kind: "style_issue".to_string(),
                    message: format!("issue {i}"),
                    remedy: "fix".to_string(),
                    advisory: Some("advice".to_string()),
                })
                .collect(),
            ..AnalysisResult::default()
        };
        result
            .language_stats
            .insert("python".to_string(), LanguageStat { files: 1, lines: 100 });
        let summary = aggregate::summarize(&result, Path::new("/project"));

        // Enough findings to force pagination; must still render cleanly.
        let bytes = render(&result, &summary, None).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_lines_render_in_both_fonts() {
        let mut page = PageWriter::new("wrap check").unwrap();
        let long = "x".repeat(WRAP_COLUMNS * 3 + 7);
        page.line(&long, true);
        page.line(&long, false);
        let bytes = page.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
