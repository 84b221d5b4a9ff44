use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Severity classification for a finding.
///
/// Total ordering follows the weight (Critical greatest), so `max()` over a
/// set of findings yields the dominant severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// All levels, highest first. Closed set: nothing upstream may produce
    /// a severity outside this list.
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    /// Numeric weight used for tallies and sorting.
    pub fn weight(self) -> u8 {
        match self {
            RiskLevel::Critical => 4,
            RiskLevel::High => 3,
            RiskLevel::Medium => 2,
            RiskLevel::Low => 1,
        }
    }

    /// Display color for styled report formats.
    pub fn color(self) -> &'static str {
        match self {
            RiskLevel::Critical => "#ff0000",
            RiskLevel::High => "#ff9500",
            RiskLevel::Medium => "#ffff66",
            RiskLevel::Low => "#ccffcc",
        }
    }

    /// Human-readable label used in report tables.
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Critical => "Critical",
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        }
    }

    /// Lowercase tag, used as a CSS class and tally key.
    pub fn tag(self) -> &'static str {
        match self {
            RiskLevel::Critical => "critical",
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Critical => write!(f, "CRITICAL"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::Low => write!(f, "LOW"),
        }
    }
}

/// A single quality finding at a specific file and line.
///
/// Immutable once created; `advisory` is filled in exactly once by the
/// aggregator after enrichment and never overwritten.
#[derive(Debug, Clone)]
pub struct Finding {
    /// File the finding was reported against
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Severity of this finding
    pub severity: RiskLevel,
    /// Machine-readable kind tag (e.g. "potential_bug")
    pub kind: String,
    /// Human-readable description
    pub message: String,
    /// Suggested remedy
    pub remedy: String,
    /// Advisory note from the external text-generation service
    pub advisory: Option<String>,
}

/// Per-language accumulation of file and line counts.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LanguageStat {
    pub files: usize,
    pub lines: usize,
}

/// Immutable aggregate of one analysis run.
///
/// Derived views (risk counts, percentages) are computed on demand from this
/// value, never cached as separate mutable state.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    /// Every file that was classified and analyzed, in traversal order
    pub files_analyzed: Vec<PathBuf>,
    /// All findings, in file-traversal order
    pub findings: Vec<Finding>,
    /// Stats keyed by language; BTreeMap so report tables iterate stably
    pub language_stats: BTreeMap<String, LanguageStat>,
}

impl AnalysisResult {
    /// Sum of line counts across all languages.
    pub fn total_lines(&self) -> usize {
        self.language_stats.values().map(|s| s.lines).sum()
    }
}

/// Tally of findings per severity. Always sums to the finding count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskCounts {
    pub fn tally(findings: &[Finding]) -> Self {
        let mut counts = RiskCounts::default();
        for finding in findings {
            match finding.severity {
                RiskLevel::Critical => counts.critical += 1,
                RiskLevel::High => counts.high += 1,
                RiskLevel::Medium => counts.medium += 1,
                RiskLevel::Low => counts.low += 1,
            }
        }
        counts
    }

    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Critical => self.critical,
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Run summary returned to the caller alongside the report paths.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub target_path: PathBuf,
    pub total_files: usize,
    pub total_lines: usize,
    pub language_breakdown: BTreeMap<String, LanguageStat>,
    pub risk_counts: RiskCounts,
}

/// Maintain/retire recommendation from the advisory service.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintainAdvice {
    pub recommended: bool,
    pub rationale: String,
}

/// Document-level estimates, produced at most once per run.
///
/// Omitted entirely (the whole value is `None` at the call sites) when no
/// advisory provider is configured or advisory generation is disabled:
/// absence means "not evaluated", not "evaluated as zero".
#[derive(Debug, Clone)]
pub struct EstimateResult {
    /// Estimated historical development effort in person-days
    pub effort_days: f64,
    pub maintain: Option<MaintainAdvice>,
}
