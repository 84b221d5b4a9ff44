use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::advisory::ProviderKind;
use crate::report::ReportFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Version-control and tooling artifacts skipped by default.
pub const DEFAULT_EXCLUDES: [&str; 4] = [".svn", ".git", "__pycache__", "*.gitignore"];

/// Default directory for emitted reports, relative to the working directory.
pub const DEFAULT_REPORT_DIR: &str = "./reports";

const DEFAULT_TOP_P: f32 = 0.7;

/// Everything one analysis run needs, resolved up front. Built by the CLI
/// from flags, the optional config file and the environment; the pipeline
/// itself never consults ambient state.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// File or directory to analyze.
    pub target_path: PathBuf,

    /// Languages to analyze. Empty means every detected language.
    pub language_types: Vec<String>,

    /// Per-language analyzer overrides; unlisted languages use the builtin
    /// defaults.
    pub analysis_standard: BTreeMap<String, String>,

    /// Base-name glob patterns pruned during traversal.
    pub exclude_patterns: Vec<String>,

    pub report_formats: Vec<ReportFormat>,
    pub report_path: PathBuf,

    /// Advisory provider, if one could be resolved.
    pub advisory: Option<AdvisoryContext>,

    /// Explicitly switched off, as opposed to merely unconfigured.
    pub advisory_disabled: bool,
}

impl AnalysisRequest {
    pub fn new(target_path: impl Into<PathBuf>) -> AnalysisRequest {
        AnalysisRequest {
            target_path: target_path.into(),
            language_types: Vec::new(),
            analysis_standard: BTreeMap::new(),
            exclude_patterns: DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect(),
            report_formats: ReportFormat::ALL.to_vec(),
            report_path: PathBuf::from(DEFAULT_REPORT_DIR),
            advisory: None,
            advisory_disabled: false,
        }
    }
}

/// Resolved advisory provider settings, held for the duration of one run.
#[derive(Debug, Clone)]
pub struct AdvisoryContext {
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub top_p: f32,
}

/// Top-level configuration loaded from .codeaudit.toml.
///
/// All fields are optional, the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub advisory: AdvisoryConfig,

    #[serde(default)]
    pub report: ReportConfig,

    /// Extra exclude patterns, appended to the builtin defaults.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Per-language analyzer overrides, e.g. `python = "ruff"`.
    #[serde(default)]
    pub standards: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvisoryConfig {
    /// Provider name (openai, qwen, zhipu, ollama). If None, falls back to
    /// the LLM_PROVIDER env var.
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub top_p: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Output formats by name (txt, html, pdf).
    #[serde(default)]
    pub formats: Vec<String>,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from .codeaudit.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".codeaudit.toml");
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

/// Parse a report format name as written in config files.
pub fn parse_format(name: &str) -> Option<ReportFormat> {
    match name.to_ascii_lowercase().as_str() {
        "txt" | "text" => Some(ReportFormat::Txt),
        "html" => Some(ReportFormat::Html),
        "pdf" => Some(ReportFormat::Pdf),
        _ => None,
    }
}

/// Resolve the advisory provider: config file values take precedence,
/// falling back to `<PROVIDER>_*` and then `LLM_*` env vars. Returns None
/// when no provider is named or a key-requiring provider has no key; the
/// pipeline then runs with placeholder advisories.
pub fn resolve_advisory(config: &AdvisoryConfig) -> Option<AdvisoryContext> {
    let provider = config
        .provider
        .clone()
        .or_else(|| std::env::var("LLM_PROVIDER").ok())?;

    let api_key = config
        .api_key
        .clone()
        .or_else(|| env_fallback(&provider, "API_KEY"));
    if ProviderKind::from_name(&provider).requires_key() && api_key.is_none() {
        warn!(provider = %provider, "advisory provider has no API key, skipping advisories");
        return None;
    }

    Some(AdvisoryContext {
        base_url: config
            .base_url
            .clone()
            .or_else(|| env_fallback(&provider, "BASE_URL")),
        model: config
            .model
            .clone()
            .or_else(|| env_fallback(&provider, "MODEL")),
        top_p: config.top_p.unwrap_or(DEFAULT_TOP_P),
        provider,
        api_key,
    })
}

fn env_fallback(provider: &str, suffix: &str) -> Option<String> {
    let specific = format!(
        "{}_{suffix}",
        provider.to_ascii_uppercase().replace('-', "_")
    );
    std::env::var(specific)
        .ok()
        .or_else(|| std::env::var(format!("LLM_{suffix}")).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.advisory.provider.is_none());
        assert!(config.report.formats.is_empty());
        assert!(config.exclude.is_empty());
        assert!(config.standards.is_empty());
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
exclude = ["target", "*.lock"]

[standards]
python = "ruff"

[advisory]
provider = "ollama"
model = "codellama"

[report]
formats = ["txt", "html"]
path = "out/reports"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.exclude, vec!["target", "*.lock"]);
        assert_eq!(config.standards["python"], "ruff");
        assert_eq!(config.advisory.provider.as_deref(), Some("ollama"));
        assert_eq!(config.advisory.model.as_deref(), Some("codellama"));
        assert_eq!(config.report.formats, vec!["txt", "html"]);
        assert_eq!(config.report.path.as_deref(), Some(Path::new("out/reports")));
    }

    #[test]
    fn test_request_defaults() {
        let request = AnalysisRequest::new("/project");
        assert_eq!(request.target_path, PathBuf::from("/project"));
        assert!(request.language_types.is_empty());
        assert_eq!(request.exclude_patterns.len(), DEFAULT_EXCLUDES.len());
        assert_eq!(request.report_formats.len(), 3);
        assert_eq!(request.report_path, PathBuf::from(DEFAULT_REPORT_DIR));
        assert!(request.advisory.is_none());
        assert!(!request.advisory_disabled);
    }

    #[test]
    fn test_parse_format_names() {
        assert_eq!(parse_format("txt"), Some(ReportFormat::Txt));
        assert_eq!(parse_format("TEXT"), Some(ReportFormat::Txt));
        assert_eq!(parse_format("Html"), Some(ReportFormat::Html));
        assert_eq!(parse_format("pdf"), Some(ReportFormat::Pdf));
        assert_eq!(parse_format("docx"), None);
    }

    #[test]
    fn test_resolve_advisory_with_explicit_key() {
        let config = AdvisoryConfig {
            provider: Some("openai".to_string()),
            api_key: Some("sk-test".to_string()),
            base_url: None,
            model: Some("gpt-4o-mini".to_string()),
            top_p: None,
        };
        let context = resolve_advisory(&config).unwrap();
        assert_eq!(context.provider, "openai");
        assert_eq!(context.api_key.as_deref(), Some("sk-test"));
        assert_eq!(context.top_p, 0.7);
    }

    #[test]
    fn test_resolve_advisory_ollama_needs_no_key() {
        let config = AdvisoryConfig {
            provider: Some("ollama".to_string()),
            api_key: None,
            base_url: Some("http://localhost:11434".to_string()),
            model: Some("codellama".to_string()),
            top_p: Some(0.9),
        };
        let context = resolve_advisory(&config).unwrap();
        assert_eq!(context.provider, "ollama");
        assert_eq!(context.top_p, 0.9);
    }
}
