use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use codeaudit::config::{self, AdvisoryConfig, AnalysisRequest, Config};
use codeaudit::report::{ReportFormat, RiskLevel};
use codeaudit::RunOutcome;

/// codeaudit — CLI tool that scans a source tree, classifies files by
/// language, and emits quality reports with optional LLM advisories.
#[derive(Parser, Debug)]
#[command(name = "codeaudit", version, about)]
struct Cli {
    /// File or directory to analyze
    target: PathBuf,

    /// Restrict analysis to these languages (repeatable, e.g. -l python)
    #[arg(short, long = "language")]
    language: Vec<String>,

    /// Analyzer override per language as lang=analyzer (repeatable)
    #[arg(long = "standard", value_parser = parse_standard)]
    standard: Vec<(String, String)>,

    /// Extra exclusion patterns, added to the builtin defaults (repeatable)
    #[arg(short = 'x', long = "exclude")]
    exclude: Vec<String>,

    /// Report formats to emit (repeatable; default: html, pdf, txt)
    #[arg(short, long = "format", value_enum)]
    format: Vec<ReportFormat>,

    /// Directory for emitted reports
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Advisory provider (openai, qwen, zhipu, ollama)
    #[arg(long)]
    provider: Option<String>,

    /// API key for the advisory provider
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL of the advisory endpoint
    #[arg(long)]
    base_url: Option<String>,

    /// Model name for advisory generation
    #[arg(long)]
    model: Option<String>,

    /// Sampling top_p for providers that accept it
    #[arg(long)]
    top_p: Option<f32>,

    /// Disable advisory generation entirely
    #[arg(long)]
    no_advisory: bool,

    /// Print the outcome as JSON instead of the human summary
    #[arg(long)]
    json: bool,
}

fn parse_standard(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(lang, analyzer)| (lang.trim().to_string(), analyzer.trim().to_string()))
        .filter(|(lang, analyzer)| !lang.is_empty() && !analyzer.is_empty())
        .ok_or_else(|| format!("expected lang=analyzer, got '{value}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let file_config = Config::load()?;
    let request = build_request(&cli, &file_config);

    let outcome = codeaudit::run(request).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    std::process::exit(if outcome.success { 0 } else { 1 });
}

/// Merge CLI flags over the config file over the builtin defaults.
fn build_request(cli: &Cli, file_config: &Config) -> AnalysisRequest {
    let mut request = AnalysisRequest::new(&cli.target);

    request.language_types = cli.language.clone();

    request.analysis_standard = file_config.standards.clone();
    for (lang, analyzer) in &cli.standard {
        request
            .analysis_standard
            .insert(lang.clone(), analyzer.clone());
    }

    request
        .exclude_patterns
        .extend(file_config.exclude.iter().cloned());
    request.exclude_patterns.extend(cli.exclude.iter().cloned());

    if !cli.format.is_empty() {
        request.report_formats = cli.format.clone();
    } else if !file_config.report.formats.is_empty() {
        request.report_formats = file_config
            .report
            .formats
            .iter()
            .filter_map(|name| config::parse_format(name))
            .collect();
        if request.report_formats.is_empty() {
            request.report_formats = ReportFormat::ALL.to_vec();
        }
    }

    if let Some(dir) = cli.report_dir.clone().or(file_config.report.path.clone()) {
        request.report_path = dir;
    }

    request.advisory_disabled = cli.no_advisory;
    if !cli.no_advisory {
        let advisory_config = AdvisoryConfig {
            provider: cli.provider.clone().or(file_config.advisory.provider.clone()),
            api_key: cli.api_key.clone().or(file_config.advisory.api_key.clone()),
            base_url: cli.base_url.clone().or(file_config.advisory.base_url.clone()),
            model: cli.model.clone().or(file_config.advisory.model.clone()),
            top_p: cli.top_p.or(file_config.advisory.top_p),
        };
        request.advisory = config::resolve_advisory(&advisory_config);
    }

    request
}

fn print_outcome(outcome: &RunOutcome) {
    if !outcome.success {
        eprintln!(
            "{} {}",
            "error:".red().bold(),
            outcome.error.as_deref().unwrap_or("unknown failure")
        );
        return;
    }

    println!("{}", outcome.message.green().bold());

    if let Some(summary) = &outcome.summary {
        println!();
        println!("Target: {}", summary.target_path.display());
        println!(
            "Files analyzed: {} ({} lines)",
            summary.total_files, summary.total_lines
        );
        for level in RiskLevel::ALL {
            let count = summary.risk_counts.get(level);
            println!("  {}: {}", colorize_risk(level), count);
        }
    }

    if !outcome.report_paths.is_empty() {
        println!();
        println!("Reports:");
        for path in &outcome.report_paths {
            println!("  {}", path.display());
        }
    }
}

/// Helper to colorize a risk level string for terminal output.
fn colorize_risk(level: RiskLevel) -> colored::ColoredString {
    match level {
        RiskLevel::Critical => level.label().red().bold(),
        RiskLevel::High => level.label().red(),
        RiskLevel::Medium => level.label().yellow(),
        RiskLevel::Low => level.label().green(),
    }
}
