use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::Advisor;
use crate::config::AdvisoryContext;

/// Per-request timeout for advisory calls. A timeout is an isolated failure
/// for that one request, never a cancellation of its siblings.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("advisory request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected advisory response: {0}")]
    Protocol(String),

    #[error("no advisory provider configured")]
    NotConfigured,
}

/// Vendor families with distinct request/response shapes. Everything the
/// rest of the crate sees is `Advisor::generate`; the quirks live here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions (the default)
    OpenAi,
    /// Alibaba DashScope compatible mode
    Qwen,
    /// Zhipu AI
    Zhipu,
    /// Local Ollama daemon; no auth header, different endpoint and shape
    Ollama,
}

impl ProviderKind {
    pub fn from_name(name: &str) -> ProviderKind {
        match name.to_ascii_lowercase().as_str() {
            "qwen" | "aliyun" | "dashscope" => ProviderKind::Qwen,
            "zhipu" => ProviderKind::Zhipu,
            "ollama" => ProviderKind::Ollama,
            _ => ProviderKind::OpenAi,
        }
    }

    /// Providers other than ollama require an API key.
    pub fn requires_key(self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }
}

/// HTTP-backed advisory client: prompt in, text out.
pub struct HttpAdvisor {
    client: reqwest::Client,
    kind: ProviderKind,
    base_url: String,
    api_key: String,
    model: String,
    top_p: f32,
}

impl HttpAdvisor {
    pub fn new(context: &AdvisoryContext) -> Result<HttpAdvisor, AdvisoryError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("codeaudit/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(HttpAdvisor {
            client,
            kind: ProviderKind::from_name(&context.provider),
            base_url: context
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: context.api_key.clone().unwrap_or_default(),
            model: context
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            top_p: context.top_p,
        })
    }

    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.kind {
            ProviderKind::Ollama => format!("{base}/api/generate"),
            _ => format!("{base}/chat/completions"),
        }
    }

    fn payload(&self, prompt: &str) -> Value {
        match self.kind {
            ProviderKind::Ollama => json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }),
            ProviderKind::Qwen | ProviderKind::Zhipu => json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
                "top_p": self.top_p,
            }),
            ProviderKind::OpenAi => json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
                "temperature": 0.7,
            }),
        }
    }

    fn extract_text(&self, body: &Value) -> Result<String, AdvisoryError> {
        let text = match self.kind {
            ProviderKind::Ollama => body.get("response").and_then(Value::as_str),
            _ => body
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str),
        };
        text.map(|t| t.trim().to_string())
            .ok_or_else(|| AdvisoryError::Protocol(format!("missing text field in {body}")))
    }
}

#[async_trait]
impl Advisor for HttpAdvisor {
    async fn generate(&self, prompt: &str) -> Result<String, AdvisoryError> {
        let mut request = self.client.post(self.endpoint()).json(&self.payload(prompt));
        if self.kind.requires_key() {
            request = request.bearer_auth(&self.api_key);
        }

        debug!(provider = ?self.kind, "dispatching advisory request");
        let body = request
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        self.extract_text(&body)
    }
}
