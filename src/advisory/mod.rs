pub mod provider;

pub use provider::{AdvisoryError, HttpAdvisor, ProviderKind};

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::classify;
use crate::config::AdvisoryContext;
use crate::report::types::{EstimateResult, Finding, LanguageStat, MaintainAdvice};

/// Placeholder advisory when no provider is configured.
pub const PLACEHOLDER_UNCONFIGURED: &str = "advisory service not configured";
/// Placeholder advisory when advisory generation is administratively disabled.
pub const PLACEHOLDER_DISABLED: &str = "advisory generation disabled";

/// Text-generation capability: prompt in, text out. The HTTP implementation
/// lives in [`provider`]; tests substitute their own.
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AdvisoryError>;
}

/// Enriches findings with advisory notes and produces the document-level
/// estimates. Holds the provider configuration explicitly for the duration
/// of one run; there is no ambient provider state.
pub struct Enricher {
    advisor: Option<Box<dyn Advisor>>,
    disabled: bool,
}

impl Enricher {
    pub fn new(context: Option<&AdvisoryContext>, disabled: bool) -> Enricher {
        if disabled {
            info!("advisory generation disabled by configuration");
            return Enricher { advisor: None, disabled: true };
        }
        let advisor = context.and_then(|ctx| match HttpAdvisor::new(ctx) {
            Ok(advisor) => {
                info!(provider = %ctx.provider, "advisory provider configured");
                Some(Box::new(advisor) as Box<dyn Advisor>)
            }
            Err(err) => {
                warn!(error = %err, "failed to build advisory client, continuing without advisories");
                None
            }
        });
        Enricher { advisor, disabled: false }
    }

    /// Build an enricher around an arbitrary advisor. Used by tests.
    pub fn with_advisor(advisor: Box<dyn Advisor>) -> Enricher {
        Enricher { advisor: Some(advisor), disabled: false }
    }

    /// One advisory string per finding, same length, same order.
    ///
    /// Requests fan out concurrently; `join_all` writes the i-th response
    /// back into the i-th slot, so concurrency never reorders results. A
    /// failed request degrades only its own slot.
    pub async fn enrich(&self, findings: &[Finding]) -> Vec<String> {
        if self.disabled {
            return vec![PLACEHOLDER_DISABLED.to_string(); findings.len()];
        }
        let Some(advisor) = self.advisor.as_deref() else {
            return vec![PLACEHOLDER_UNCONFIGURED.to_string(); findings.len()];
        };
        if findings.is_empty() {
            return Vec::new();
        }

        debug!(requests = findings.len(), "fanning out advisory requests");
        let requests = findings.iter().map(|finding| {
            let prompt = finding_prompt(finding);
            async move {
                match advisor.generate(&prompt).await {
                    Ok(text) => text,
                    Err(err) => format!("advisory unavailable: {err}"),
                }
            }
        });
        join_all(requests).await
    }

    /// Effort estimate and maintain/retire recommendation. Issued only when
    /// a provider is configured and advisory generation is enabled; absent
    /// otherwise ("not evaluated", never "evaluated as zero").
    pub async fn estimate(
        &self,
        total_files: usize,
        total_lines: usize,
        languages: &BTreeMap<String, LanguageStat>,
    ) -> Option<EstimateResult> {
        if self.disabled {
            return None;
        }
        let advisor = self.advisor.as_deref()?;

        let effort_days = match advisor.generate(&effort_prompt(total_files, total_lines)).await {
            Ok(text) => first_numeric_token(&text)
                .map(round2)
                .unwrap_or_else(|| fallback_effort(total_files, total_lines)),
            Err(err) => {
                warn!(error = %err, "effort estimate request failed, using fallback formula");
                fallback_effort(total_files, total_lines)
            }
        };

        let maintain_prompt = maintain_prompt(total_files, total_lines, languages, effort_days);
        let maintain = match advisor.generate(&maintain_prompt).await {
            Ok(text) => parse_maintain(&text),
            Err(err) => MaintainAdvice {
                recommended: false,
                rationale: format!("advisory request failed: {err}"),
            },
        };

        Some(EstimateResult { effort_days, maintain: Some(maintain) })
    }
}

/// Deterministic effort fallback in person-days, rounded to two decimals.
pub fn fallback_effort(total_files: usize, total_lines: usize) -> f64 {
    round2(0.01 * total_lines as f64 + 0.5 * total_files as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn finding_prompt(finding: &Finding) -> String {
    let language = classify::language_for(&finding.file).unwrap_or("unknown");
    format!(
        "Review the following {language} code quality finding and provide a short advisory note.\n\
         Severity: {severity}\n\
         Kind: {kind}\n\
         Message: {message}\n\
         Suggested remedy: {remedy}\n\
         Respond with a concise root-cause explanation and a concrete fix.",
        severity = finding.severity.label(),
        kind = finding.kind,
        message = finding.message,
        remedy = finding.remedy,
    )
}

fn effort_prompt(total_files: usize, total_lines: usize) -> String {
    format!(
        "Estimate the historical development effort for this project assuming \
         traditional manual development without AI assistance.\n\
         Files: {total_files}\n\
         Lines of code: {total_lines}\n\
         Account for coding, debugging and testing. Answer with the effort in \
         person-days as a number rounded to two decimals."
    )
}

fn maintain_prompt(
    total_files: usize,
    total_lines: usize,
    languages: &BTreeMap<String, LanguageStat>,
    effort_days: f64,
) -> String {
    let tech_stack = languages.keys().cloned().collect::<Vec<_>>().join(", ");
    format!(
        "Given the following project, decide whether it is worth maintaining.\n\
         Files: {total_files}\n\
         Lines of code: {total_lines}\n\
         Tech stack: {tech_stack}\n\
         Estimated development effort (person-days): {effort_days}\n\
         Answer as JSON: {{\"worth_maintaining\": \"yes\" or \"no\", \
         \"reasoning\": \"rationale, at most 500 words\"}}"
    )
}

/// Extract the first numeric token from free text ("about 12.5 days" -> 12.5).
fn first_numeric_token(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            let mut seen_dot = false;
            while i < bytes.len() {
                if bytes[i].is_ascii_digit() {
                    i += 1;
                } else if bytes[i] == b'.'
                    && !seen_dot
                    && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
                {
                    seen_dot = true;
                    i += 1;
                } else {
                    break;
                }
            }
            return text[start..i].parse().ok();
        }
        i += 1;
    }
    None
}

/// Parse the maintain/retire response. Prefers the structured JSON shape;
/// falls back to scanning line-oriented text for yes/no and rationale
/// markers; defaults to "not recommended" so the field is never absent when
/// advisory generation is enabled.
fn parse_maintain(text: &str) -> MaintainAdvice {
    let stripped = strip_code_fence(text);

    if let Ok(value) = serde_json::from_str::<Value>(stripped) {
        let verdict = value
            .get("worth_maintaining")
            .or_else(|| value.get("recommended"));
        if let Some(verdict) = verdict {
            let recommended = match verdict {
                Value::Bool(b) => *b,
                Value::String(s) => is_affirmative(s),
                _ => false,
            };
            let rationale = value
                .get("reasoning")
                .and_then(Value::as_str)
                .unwrap_or("no rationale given in the advisory response")
                .to_string();
            return MaintainAdvice { recommended, rationale };
        }
    }

    let mut recommended = None;
    let mut rationale = None;
    for line in stripped.lines() {
        let lower = line.to_ascii_lowercase();
        if lower.contains("worth_maintaining") || lower.contains("worth maintaining") {
            recommended = Some(is_affirmative(&lower));
        } else if let Some(rest) = lower
            .find("reasoning")
            .map(|pos| &line[pos + "reasoning".len()..])
        {
            rationale = Some(rest.trim_start_matches([':', ' ', '\t']).trim().to_string());
        }
    }

    match recommended {
        Some(recommended) => MaintainAdvice {
            recommended,
            rationale: rationale
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "no rationale given in the advisory response".to_string()),
        },
        None => MaintainAdvice {
            recommended: false,
            rationale: "no recognizable recommendation in the advisory response".to_string(),
        },
    }
}

fn is_affirmative(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("yes") || lower.contains("true")
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches('\n')
        .trim_end_matches('`')
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::RiskLevel;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn finding(n: usize) -> Finding {
        Finding {
            file: PathBuf::from(format!("src/file{n}.py")),
            line: n + 1,
            severity: RiskLevel::Medium,
            kind: "potential_bug".to_string(),
            message: format!("message {n}"),
            remedy: "fix it".to_string(),
            advisory: None,
        }
    }

    /// Advisor that echoes a counter and fails on one chosen call index.
    struct ScriptedAdvisor {
        calls: AtomicUsize,
        fail_on: Option<usize>,
    }

    impl ScriptedAdvisor {
        fn new(fail_on: Option<usize>) -> Self {
            ScriptedAdvisor { calls: AtomicUsize::new(0), fail_on }
        }
    }

    #[async_trait]
    impl Advisor for ScriptedAdvisor {
        async fn generate(&self, prompt: &str) -> Result<String, AdvisoryError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(call) {
                return Err(AdvisoryError::Protocol("scripted failure".to_string()));
            }
            // Echo back the message line so order can be verified.
            let message = prompt
                .lines()
                .find(|l| l.starts_with("Message:"))
                .unwrap_or("")
                .to_string();
            Ok(format!("advice for {message}"))
        }
    }

    #[tokio::test]
    async fn test_enrich_preserves_length_and_order() {
        let findings: Vec<Finding> = (0..5).map(finding).collect();
        let enricher = Enricher::with_advisor(Box::new(ScriptedAdvisor::new(None)));

        let advisories = enricher.enrich(&findings).await;
        assert_eq!(advisories.len(), findings.len());
        for (i, advisory) in advisories.iter().enumerate() {
            assert!(advisory.contains(&format!("message {i}")), "slot {i}: {advisory}");
        }
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_one_slot() {
        let findings: Vec<Finding> = (0..4).map(finding).collect();
        let enricher = Enricher::with_advisor(Box::new(ScriptedAdvisor::new(Some(2))));

        let advisories = enricher.enrich(&findings).await;
        assert_eq!(advisories.len(), 4);
        assert!(advisories[2].starts_with("advisory unavailable:"));
        for (i, advisory) in advisories.iter().enumerate() {
            if i != 2 {
                assert!(advisory.contains(&format!("message {i}")));
            }
        }
    }

    #[tokio::test]
    async fn test_unconfigured_yields_placeholders() {
        let findings: Vec<Finding> = (0..3).map(finding).collect();
        let enricher = Enricher::new(None, false);

        let advisories = enricher.enrich(&findings).await;
        assert_eq!(advisories, vec![PLACEHOLDER_UNCONFIGURED.to_string(); 3]);
        assert!(enricher.estimate(3, 100, &BTreeMap::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_yields_placeholders_and_no_estimate() {
        let findings: Vec<Finding> = (0..2).map(finding).collect();
        let enricher = Enricher::new(None, true);

        let advisories = enricher.enrich(&findings).await;
        assert_eq!(advisories, vec![PLACEHOLDER_DISABLED.to_string(); 2]);
        assert!(enricher.estimate(2, 50, &BTreeMap::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_findings_no_requests() {
        let enricher = Enricher::with_advisor(Box::new(ScriptedAdvisor::new(Some(0))));
        let advisories = enricher.enrich(&[]).await;
        assert!(advisories.is_empty());
    }

    struct FixedAdvisor(&'static str);

    #[async_trait]
    impl Advisor for FixedAdvisor {
        async fn generate(&self, _prompt: &str) -> Result<String, AdvisoryError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingAdvisor;

    #[async_trait]
    impl Advisor for FailingAdvisor {
        async fn generate(&self, _prompt: &str) -> Result<String, AdvisoryError> {
            Err(AdvisoryError::Protocol("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_effort_parses_first_numeric_token() {
        let enricher = Enricher::with_advisor(Box::new(FixedAdvisor(
            "roughly 12.5 person-days, maybe 14",
        )));
        let estimate = enricher.estimate(10, 500, &BTreeMap::new()).await.unwrap();
        assert_eq!(estimate.effort_days, 12.5);
    }

    #[tokio::test]
    async fn test_effort_fallback_formula_is_exact() {
        let enricher = Enricher::with_advisor(Box::new(FixedAdvisor("no number here")));
        let estimate = enricher.estimate(10, 500, &BTreeMap::new()).await.unwrap();
        // 0.01 * 500 + 0.5 * 10
        assert_eq!(estimate.effort_days, 10.00);
    }

    #[tokio::test]
    async fn test_request_failure_uses_fallback_and_conservative_maintain() {
        let enricher = Enricher::with_advisor(Box::new(FailingAdvisor));
        let estimate = enricher.estimate(10, 500, &BTreeMap::new()).await.unwrap();
        assert_eq!(estimate.effort_days, 10.00);
        let maintain = estimate.maintain.unwrap();
        assert!(!maintain.recommended);
        assert!(maintain.rationale.contains("down"));
    }

    #[test]
    fn test_fallback_effort_rounding() {
        assert_eq!(fallback_effort(3, 123), 2.73);
        assert_eq!(fallback_effort(0, 0), 0.0);
    }

    #[test]
    fn test_first_numeric_token() {
        assert_eq!(first_numeric_token("about 3 days"), Some(3.0));
        assert_eq!(first_numeric_token("2.75 person-days"), Some(2.75));
        assert_eq!(first_numeric_token("v1.2.3"), Some(1.2));
        assert_eq!(first_numeric_token("none"), None);
    }

    #[test]
    fn test_parse_maintain_json() {
        let advice = parse_maintain(r#"{"worth_maintaining": "yes", "reasoning": "small and active"}"#);
        assert!(advice.recommended);
        assert_eq!(advice.rationale, "small and active");
    }

    #[test]
    fn test_parse_maintain_json_bool_and_fence() {
        let advice = parse_maintain(
            "```json\n{\"worth_maintaining\": false, \"reasoning\": \"dead code\"}\n```",
        );
        assert!(!advice.recommended);
        assert_eq!(advice.rationale, "dead code");
    }

    #[test]
    fn test_parse_maintain_line_scan_fallback() {
        let advice = parse_maintain("worth_maintaining: yes\nreasoning: still deployed in prod");
        assert!(advice.recommended);
        assert_eq!(advice.rationale, "still deployed in prod");
    }

    #[test]
    fn test_parse_maintain_default_is_conservative() {
        let advice = parse_maintain("the model rambled about nothing useful");
        assert!(!advice.recommended);
        assert!(advice.rationale.contains("no recognizable recommendation"));
    }
}
