// src/config/mod.rs
//! Application config: `config/trendcast.toml` plus a handful of env overrides.

pub mod generator;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use generator::{GeneratorConfig, ProviderKind};

use crate::trends::providers::{aggregator, google_api, google_rss, yahoo_realtime};
use crate::trends::types::SourceKind;

pub const ENV_CONFIG_PATH: &str = "TRENDCAST_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/trendcast.toml";

pub const ENV_SOURCE: &str = "TRENDCAST_SOURCE";
pub const ENV_CAP: &str = "TRENDCAST_CAP";
pub const ENV_CACHE_TTL_SECS: &str = "TRENDCAST_CACHE_TTL_SECS";
pub const ENV_GENERATOR: &str = "TRENDCAST_GENERATOR";
pub const ENV_AI_TEST_MODE: &str = "AI_TEST_MODE";

pub const DEFAULT_CAP: usize = 10;
pub const MAX_CAP: usize = 50;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub trends: TrendsConfig,
    pub generator: GeneratorConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendsConfig {
    pub source: SourceKind,
    pub cap: usize,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
    pub geo: String,
    pub hl: String,
    /// Endpoint override; `None` uses the source's default for `geo`/`hl`.
    pub url: Option<String>,
    pub user_agent: Option<String>,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            cap: DEFAULT_CAP,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            geo: "JP".to_string(),
            hl: "ja".to_string(),
            url: None,
            user_agent: None,
        }
    }
}

impl TrendsConfig {
    pub fn endpoint(&self) -> String {
        if let Some(u) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return u.trim().to_string();
        }
        let is_jp = self.geo.eq_ignore_ascii_case("JP");
        match self.source {
            SourceKind::GoogleApi if is_jp && self.hl == "ja" => google_api::DEFAULT_URL.to_string(),
            SourceKind::GoogleApi => format!(
                "https://trends.google.com/trends/api/dailytrends?hl={}&geo={}&ns=15",
                urlencoding::encode(&self.hl),
                urlencoding::encode(&self.geo)
            ),
            SourceKind::GoogleRss if is_jp => google_rss::DEFAULT_URL.to_string(),
            SourceKind::GoogleRss => format!(
                "https://trends.google.com/trending/rss?geo={}",
                urlencoding::encode(&self.geo)
            ),
            SourceKind::YahooRealtime => yahoo_realtime::DEFAULT_URL.to_string(),
            SourceKind::Aggregator => aggregator::DEFAULT_URL.to_string(),
        }
    }

    fn sanitize(&mut self) {
        self.cap = self.cap.clamp(1, MAX_CAP);
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        if self.geo.trim().is_empty() {
            self.geo = "JP".to_string();
        }
        if self.hl.trim().is_empty() {
            self.hl = "ja".to_string();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s).context("parsing trendcast config")?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Load from an explicit path; env overrides are not applied.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $TRENDCAST_CONFIG_PATH
    /// 2) config/trendcast.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("TRENDCAST_CONFIG_PATH points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if p.exists() {
                Self::load_from(&p)?
            } else {
                AppConfig::default()
            }
        };
        cfg.apply_env_overrides();
        cfg.sanitize();
        Ok(cfg)
    }

    /// Unknown or unparsable values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var(ENV_SOURCE) {
            match SourceKind::parse(&v) {
                Some(k) => self.trends.source = k,
                None => tracing::warn!(value = %v, "ignoring unknown {ENV_SOURCE}"),
            }
        }
        if let Some(cap) = parse_env_num::<usize>(ENV_CAP) {
            self.trends.cap = cap;
        }
        if let Some(ttl) = parse_env_num::<u64>(ENV_CACHE_TTL_SECS) {
            self.trends.cache_ttl_secs = ttl;
        }
        if let Ok(v) = std::env::var(ENV_GENERATOR) {
            match ProviderKind::parse(&v) {
                Some(p) => self.switch_provider(p),
                None => tracing::warn!(value = %v, "ignoring unknown {ENV_GENERATOR}"),
            }
        }
        if std::env::var(ENV_AI_TEST_MODE).is_ok_and(|v| v == "mock") {
            self.switch_provider(ProviderKind::Mock);
        }
    }

    /// A model name only makes sense for the provider it was written for.
    fn switch_provider(&mut self, provider: ProviderKind) {
        if self.generator.provider != provider {
            self.generator.provider = provider;
            self.generator.model.clear();
        }
    }

    fn sanitize(&mut self) {
        self.trends.sanitize();
        self.generator.sanitize();
    }
}

fn parse_env_num<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(value = %raw, "ignoring unparsable {name}");
            None
        }
    }
}
