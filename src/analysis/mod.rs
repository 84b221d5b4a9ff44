pub mod backends;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::classify;
use crate::report::types::{AnalysisResult, Finding, LanguageStat};

use backends::Backend;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis failed for {analyzer}: {reason}")]
    Failed { analyzer: String, reason: String },
}

/// Capability implemented by every analyzer backend.
///
/// The concrete engines (pylint, eslint, ...) are external collaborators;
/// this trait is the only contract the pipeline depends on. A failing
/// backend contributes zero findings for that file and must not abort the
/// run.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Resolved analyzer id this backend answers for (e.g. "pylint").
    fn id(&self) -> &str;

    /// Produce findings for one file.
    async fn find_findings(
        &self,
        file: &Path,
        language: &str,
    ) -> Result<Vec<Finding>, AnalysisError>;
}

/// Analyze every file: accumulate per-language stats and collect findings
/// in file-traversal order. Advisory text is not attached here.
///
/// Never fails as a whole: unreadable files contribute zero lines, failing
/// backends contribute zero findings, and an empty file list yields an empty
/// result.
pub async fn run(files: &[PathBuf], standards: &BTreeMap<String, String>) -> AnalysisResult {
    let total = files.len();
    let mut result = AnalysisResult {
        files_analyzed: files.to_vec(),
        ..AnalysisResult::default()
    };

    for (processed, file) in files.iter().enumerate() {
        let Some(language) = classify::language_for(file) else {
            continue;
        };

        let stat = result
            .language_stats
            .entry(language.to_string())
            .or_insert_with(LanguageStat::default);
        stat.files += 1;
        stat.lines += count_lines(file);

        if let Some(standard) = standards.get(language) {
            let backend = Backend::from_id(standard);
            match backend.find_findings(file, language).await {
                Ok(findings) => result.findings.extend(findings),
                Err(err) => {
                    warn!(file = %file.display(), error = %err, "analyzer failed, skipping file");
                }
            }
        }

        // Observable progress only; has no effect on the result.
        debug!(processed = processed + 1, total, "analysis progress");
    }

    result
}

/// Count lines with a best-effort decode: undecodable bytes are replaced,
/// never fatal. A file that cannot be read at all counts as zero lines.
fn count_lines(file: &Path) -> usize {
    match std::fs::read(file) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).lines().count(),
        Err(err) => {
            warn!(file = %file.display(), error = %err, "unreadable file, counting zero lines");
            0
        }
    }
}
