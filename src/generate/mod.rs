// src/generate/mod.rs
pub mod client;
pub mod mode;
pub mod prompt;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::config::{GeneratorConfig, ProviderKind};
use crate::generate::client::{build_provider, DynGenerator, GenerationError};
use crate::generate::mode::Mode;
use crate::generate::prompt::build_prompt;

/// Returned verbatim when no key is available; no request is made.
pub const MISSING_KEY_WARNING: &str = "⚠️ APIキーを設定してください";

/// Prefix of the text returned in place of content when a call fails.
pub const ERROR_PREFIX: &str = "エラーが発生しました: ";

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("generate_requests_total", "Generation requests received.");
        describe_counter!(
            "generate_errors_total",
            "Generation calls that failed (answered with an error text)."
        );
        describe_counter!(
            "generate_missing_credential_total",
            "Generation requests answered with the missing-key warning."
        );
    });
}

/// Template lookup + credential resolution in front of one provider.
pub struct Generator {
    provider: DynGenerator,
    configured_key: Option<String>,
}

impl Generator {
    pub fn new(provider: DynGenerator, configured_key: Option<String>) -> Self {
        Self {
            provider,
            configured_key: configured_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// `secret_key` comes from the deployment secret store and is used only
    /// when the config resolves no key.
    pub fn from_config(cfg: &GeneratorConfig, secret_key: Option<String>) -> anyhow::Result<Self> {
        let provider = build_provider(cfg)?;
        let mut key = cfg.resolve_api_key().or(secret_key);
        if key.is_none() && cfg.provider == ProviderKind::Mock {
            key = Some("mock".to_string());
        }
        tracing::info!(
            provider = provider.name(),
            model = cfg.model_or_default(),
            key_len = key.as_deref().map(str::len).unwrap_or(0),
            "generator configured"
        );
        Ok(Self::new(provider, key))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn has_configured_key(&self) -> bool {
        self.configured_key.is_some()
    }

    /// Per-request key first, then the configured one.
    fn pick_key<'a>(&'a self, key_override: Option<&'a str>) -> Option<&'a str> {
        key_override
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or(self.configured_key.as_deref())
    }

    pub async fn try_generate(
        &self,
        term: &str,
        mode: Mode,
        key_override: Option<&str>,
    ) -> Result<String, GenerationError> {
        ensure_metrics_described();
        counter!("generate_requests_total").increment(1);

        let Some(key) = self.pick_key(key_override) else {
            counter!("generate_missing_credential_total").increment(1);
            return Err(GenerationError::MissingCredential);
        };

        let prompt = build_prompt(term, mode);
        tracing::info!(provider = self.provider.name(), mode = mode.id(), "generating");
        self.provider.complete(&prompt, key).await.inspect_err(|e| {
            tracing::warn!(error = %e, provider = self.provider.name(), "generation failed");
            counter!("generate_errors_total").increment(1);
        })
    }

    /// Generate with the configured key. Failures come back as text.
    pub async fn generate(&self, term: &str, mode: Mode) -> String {
        self.generate_with_key(term, mode, None).await
    }

    pub async fn generate_with_key(
        &self,
        term: &str,
        mode: Mode,
        key_override: Option<&str>,
    ) -> String {
        match self.try_generate(term, mode, key_override).await {
            Ok(text) => text,
            Err(e) => error_text(&e),
        }
    }
}

/// User-facing text for a failed generation.
pub fn error_text(e: &GenerationError) -> String {
    match e {
        GenerationError::MissingCredential => MISSING_KEY_WARNING.to_string(),
        other => format!("{ERROR_PREFIX}{other}"),
    }
}
