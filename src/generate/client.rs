//! Text-generation providers: Gemini, OpenAI and a deterministic mock.
//! A provider receives the key per call; deciding whether a key exists is the
//! caller's job, so providers never run without one.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::{GeneratorConfig, ProviderKind};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

const STATUS_BODY_MAX: usize = 300;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("API key is not configured")]
    MissingCredential,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("prompt blocked: {0}")]
    Blocked(String),
    #[error("empty response")]
    EmptyResponse,
}

pub type GenerationFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

/// Low-level provider: one prompt in, the raw text out.
pub trait TextGenerator: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str, api_key: &'a str) -> GenerationFuture<'a>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynGenerator = Arc<dyn TextGenerator>;

/// Factory: build the provider named by `config`.
pub fn build_provider(config: &GeneratorConfig) -> anyhow::Result<DynGenerator> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("trendcast/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("building generator http client")?;
    let model = config.model_or_default();

    let provider: DynGenerator = match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            http,
            model,
            config.base_url.as_deref().unwrap_or(GEMINI_BASE_URL),
        )),
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
            http,
            model,
            config.base_url.as_deref().unwrap_or(OPENAI_BASE_URL),
        )),
        ProviderKind::Mock => Arc::new(MockGenerator::echo()),
    };
    Ok(provider)
}

async fn status_error(resp: reqwest::Response) -> GenerationError {
    let code = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    GenerationError::Status {
        code,
        body: body.chars().take(STATUS_BODY_MAX).collect(),
    }
}

// ------------------------------------------------------------
// Gemini
// ------------------------------------------------------------

/// Gemini `generateContent` REST endpoint. The key travels in the
/// `x-goog-api-key` header, never in the URL.
pub struct GeminiProvider {
    http: reqwest::Client,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiReq<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResp {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiFeedback>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiRespContent>,
}

#[derive(Deserialize)]
struct GeminiRespContent {
    #[serde(default)]
    parts: Vec<GeminiRespPart>,
}

#[derive(Deserialize)]
struct GeminiRespPart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiFeedback {
    block_reason: Option<String>,
}

impl GeminiProvider {
    pub fn new(http: reqwest::Client, model: &str, base_url: &str) -> Self {
        Self {
            http,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl TextGenerator for GeminiProvider {
    fn complete<'a>(&'a self, prompt: &'a str, api_key: &'a str) -> GenerationFuture<'a> {
        Box::pin(async move {
            let req = GeminiReq {
                contents: vec![GeminiContent {
                    role: "user",
                    parts: vec![GeminiPart { text: prompt }],
                }],
            };
            let resp = self
                .http
                .post(self.endpoint())
                .header("x-goog-api-key", api_key)
                .json(&req)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(status_error(resp).await);
            }

            let body: GeminiResp = resp.json().await?;
            let text: String = body
                .candidates
                .first()
                .and_then(|c| c.content.as_ref())
                .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
                .unwrap_or_default();
            if !text.is_empty() {
                return Ok(text);
            }
            match body.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => Err(GenerationError::Blocked(reason)),
                None => Err(GenerationError::EmptyResponse),
            }
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// ------------------------------------------------------------
// OpenAI
// ------------------------------------------------------------

/// OpenAI provider (Chat Completions API).
pub struct OpenAiProvider {
    http: reqwest::Client,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(http: reqwest::Client, model: &str, base_url: &str) -> Self {
        Self {
            http,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl TextGenerator for OpenAiProvider {
    fn complete<'a>(&'a self, prompt: &'a str, api_key: &'a str) -> GenerationFuture<'a> {
        Box::pin(async move {
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
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: Option<String>,
            }

            let req = Req {
                model: &self.model,
                messages: vec![Msg {
                    role: "user",
                    content: prompt,
                }],
                temperature: 0.7,
            };

            let resp = self
                .http
                .post(format!("{}/v1/chat/completions", self.base_url))
                .bearer_auth(api_key)
                .json(&req)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(status_error(resp).await);
            }
            let body: Resp = resp.json().await?;
            body.choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|c| !c.is_empty())
                .ok_or(GenerationError::EmptyResponse)
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ------------------------------------------------------------
// Mock
// ------------------------------------------------------------

/// Deterministic provider for tests and offline runs. Counts its calls.
pub struct MockGenerator {
    fixed: Option<String>,
    calls: AtomicUsize,
}

impl MockGenerator {
    /// Answers with the prompt's first line.
    pub fn echo() -> Self {
        Self {
            fixed: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fixed(text: &str) -> Self {
        Self {
            fixed: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextGenerator for MockGenerator {
    fn complete<'a>(&'a self, prompt: &'a str, _api_key: &'a str) -> GenerationFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let out = match &self.fixed {
            Some(s) => s.clone(),
            None => format!("[mock] {}", prompt.lines().next().unwrap_or_default()),
        };
        Box::pin(async move { Ok(out) })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
