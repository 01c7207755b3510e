// src/config/generator.rs
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenAi,
    Mock,
}

impl ProviderKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAi),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }

    /// Env var / secret name the key is read from.
    pub fn key_var(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Mock => "MOCK_API_KEY",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub provider: ProviderKind,
    /// Empty means the provider's default model.
    pub model: String,
    /// "ENV" means: read from GEMINI_API_KEY / OPENAI_API_KEY (by provider).
    /// Empty means no configured key; the page/CLI may still supply one.
    pub api_key: String,
    pub timeout_secs: u64,
    /// Endpoint override (tests, proxies).
    pub base_url: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: String::new(),
            api_key: "ENV".to_string(),
            timeout_secs: DEFAULT_GENERATOR_TIMEOUT_SECS,
            base_url: None,
        }
    }
}

impl GeneratorConfig {
    pub fn model_or_default(&self) -> &str {
        if !self.model.trim().is_empty() {
            return self.model.trim();
        }
        match self.provider {
            ProviderKind::Gemini => DEFAULT_GEMINI_MODEL,
            ProviderKind::OpenAi => DEFAULT_OPENAI_MODEL,
            ProviderKind::Mock => "mock",
        }
    }

    /// Resolve the configured key. A missing env var is not an error here:
    /// generation answers with the missing-key warning instead.
    pub fn resolve_api_key(&self) -> Option<String> {
        let raw = self.api_key.trim();
        let key = if raw.eq_ignore_ascii_case("env") {
            env::var(self.provider.key_var()).unwrap_or_default()
        } else {
            raw.to_string()
        };
        let key = key.trim().to_string();
        (!key.is_empty()).then_some(key)
    }

    pub(crate) fn sanitize(&mut self) {
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_GENERATOR_TIMEOUT_SECS;
        }
    }
}
