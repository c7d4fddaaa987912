//! Chat-completion adapter.
//!
//! [`complete`] never fails: an unavailable client yields [`LLM_UNAVAILABLE`]
//! and any request failure yields a bracketed error string. One bad call must
//! not abort a whole report.

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{Credential, LlmConfig};
use crate::error::UpstreamError;

pub const NEWS_ASSISTANT: &str = "Du bist ein sachlicher deutscher Nachrichtenassistent.";
pub const BRIEFING_ASSISTANT: &str = "Du erstellst kurze, tagesaktuelle Markdown-Briefings.";

pub const LLM_UNAVAILABLE: &str = "[Chat-completion client not configured - unable to fetch live news. \
Provide OPENAI_API_KEY or an api_key.enc file and enable [llm] to use this feature.]";

/// Per-call settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system: String,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

impl ChatOptions {
    pub fn from_config(cfg: &LlmConfig) -> Self {
        Self {
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            system: NEWS_ASSISTANT.to_string(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// One request/response round trip against some chat-completion service.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<String, UpstreamError>;
    fn provider_name(&self) -> &'static str;
}

pub type DynChat = Arc<dyn ChatBackend>;

/// Send `prompt` once and return the trimmed answer or an in-band error string.
pub async fn complete(backend: &dyn ChatBackend, prompt: &str, options: &ChatOptions) -> String {
    render_outcome(try_complete(backend, prompt, options).await)
}

/// Like [`complete`] but keeps the error structured for the caller.
pub async fn try_complete(
    backend: &dyn ChatBackend,
    prompt: &str,
    options: &ChatOptions,
) -> Result<String, UpstreamError> {
    let res = backend.chat(prompt, options).await;
    let outcome = match &res {
        Ok(_) => "ok",
        Err(UpstreamError::Unavailable) => "unavailable",
        Err(_) => "error",
    };
    counter!("llm_requests_total", "outcome" => outcome).increment(1);
    if let Err(e) = &res {
        if !matches!(e, UpstreamError::Unavailable) {
            warn!(provider = backend.provider_name(), error = %e, "chat completion failed");
        }
    }
    res.map(|text| text.trim().to_string())
}

/// String form stored in reports for a chat outcome.
pub fn render_outcome(res: Result<String, UpstreamError>) -> String {
    match res {
        Ok(text) => text,
        Err(e) => render_error(&e),
    }
}

pub fn render_error(e: &UpstreamError) -> String {
    match e {
        UpstreamError::Unavailable => LLM_UNAVAILABLE.to_string(),
        other => format!("[Fehler bei der OpenAI-Abfrage: {other}]"),
    }
}

/// Pick the backend for this process: the real client when enabled and a
/// credential exists, otherwise [`UnavailableChat`].
pub fn build_backend(cfg: &LlmConfig, credential: Option<Credential>) -> DynChat {
    if !cfg.enabled {
        debug!("llm disabled in config");
        return Arc::new(UnavailableChat);
    }
    let Some(credential) = credential else {
        warn!("no API credential found; LLM answers will be placeholders");
        return Arc::new(UnavailableChat);
    };
    match OpenAiChat::new(cfg, credential) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            warn!(error = %e, "cannot build http client for LLM");
            Arc::new(UnavailableChat)
        }
    }
}

/// OpenAI Chat Completions API (or any compatible endpoint).
pub struct OpenAiChat {
    http: reqwest::Client,
    endpoint: String,
    credential: Credential,
}

impl OpenAiChat {
    pub fn new(cfg: &LlmConfig, credential: Credential) -> reqwest::Result<Self> {
        let http = crate::http::build_client(Duration::from_secs(cfg.timeout_secs))?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", cfg.base_url.trim_end_matches('/')),
            credential,
        })
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl ChatBackend for OpenAiChat {
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<String, UpstreamError> {
        let req = Req {
            model: &options.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: &options.system,
                },
                Msg {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.credential.expose())
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed: Resp =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Malformed(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| UpstreamError::Malformed("response has no choices".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Used when no credential is configured or the LLM is disabled.
pub struct UnavailableChat;

#[async_trait]
impl ChatBackend for UnavailableChat {
    async fn chat(&self, _prompt: &str, _options: &ChatOptions) -> Result<String, UpstreamError> {
        Err(UpstreamError::Unavailable)
    }

    fn provider_name(&self) -> &'static str {
        "unavailable"
    }
}

/// Deterministic backend for tests and offline runs: echoes a fixed answer.
#[derive(Clone)]
pub struct StaticChat {
    pub answer: String,
}

impl StaticChat {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

#[async_trait]
impl ChatBackend for StaticChat {
    async fn chat(&self, _prompt: &str, _options: &ChatOptions) -> Result<String, UpstreamError> {
        Ok(self.answer.clone())
    }

    fn provider_name(&self) -> &'static str {
        "static"
    }
}
