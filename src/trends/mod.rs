// src/trends/mod.rs
pub mod cache;
pub mod providers;
pub mod types;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::time::Duration;

use crate::config::TrendsConfig;
use crate::trends::cache::{TrendCache, TrendSnapshot};
use crate::trends::providers::{
    aggregator::AggregatorProvider, explore_link, google_api::GoogleApiProvider,
    google_rss::GoogleRssProvider, yahoo_realtime::YahooRealtimeProvider, BROWSER_USER_AGENT,
    DEFAULT_USER_AGENT,
};
use crate::trends::types::{ErrorKind, RawTrend, SourceKind, TrendError, TrendItem, TrendSource};

/// Shown whenever a listing comes back empty.
pub const NO_TRENDS_NOTICE: &str = "no trends available";

const TITLE_MAX_CHARS: usize = 200;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("trends_fetch_total", "Trend source fetches attempted.");
        describe_counter!(
            "trends_fetch_errors_total",
            "Trend source fetch/parse errors (answered with an empty list)."
        );
        describe_counter!(
            "trends_cache_hits_total",
            "Listings served from the process-local cache."
        );
        describe_histogram!("trends_parse_ms", "Source parse time in milliseconds.");
    });
}

/// Normalize a title that still carries markup (entities, inline tags), as
/// the daily-trends JSON does. Text already decoded by an XML/HTML parser
/// goes through [`clean_title`] instead.
pub fn normalize_title(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    clean_title(&re_tags.replace_all(&decoded, ""))
}

/// Collapse whitespace, trim, cap the length. Characters are kept as-is.
pub fn clean_title(s: &str) -> String {
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("whitespace regex"));
    let out = re_ws.replace_all(s, " ");
    let out = out.trim();

    if out.chars().count() > TITLE_MAX_CHARS {
        out.chars().take(TITLE_MAX_CHARS).collect()
    } else {
        out.to_string()
    }
}

/// Keep source order, drop untitled entries, truncate to `cap`, assign ranks.
/// Entries without a link point at the explore page for `geo`.
pub fn rank_and_cap(raw: Vec<RawTrend>, cap: usize, geo: &str) -> Vec<TrendItem> {
    raw.into_iter()
        .filter(|r| !r.title.trim().is_empty())
        .take(cap)
        .enumerate()
        .map(|(i, r)| TrendItem {
            rank: i as u32 + 1,
            link: r
                .link
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| explore_link(&r.title, geo)),
            title: r.title,
            metric: r.metric,
        })
        .collect()
}

/// Fetch once and surface the typed failure.
pub async fn try_fetch_trends(
    source: &dyn TrendSource,
    cap: usize,
) -> Result<Vec<TrendItem>, TrendError> {
    ensure_metrics_described();
    counter!("trends_fetch_total").increment(1);
    let raw = source.fetch_latest().await?;
    Ok(rank_and_cap(raw, cap, source.geo()))
}

/// Fetch once; any failure becomes an empty list.
pub async fn fetch_trends(source: &dyn TrendSource, cap: usize) -> Vec<TrendItem> {
    match try_fetch_trends(source, cap).await {
        Ok(items) => items,
        Err(e) => {
            report_fetch_error(source.name(), &e);
            Vec::new()
        }
    }
}

fn report_fetch_error(source: &'static str, e: &TrendError) {
    tracing::warn!(error = %e, kind = ?e.kind(), source, "trend fetch failed");
    counter!("trends_fetch_errors_total").increment(1);
}

/// Build the reqwest client and provider for `cfg.source`.
pub fn build_source(cfg: &TrendsConfig) -> Result<Box<dyn TrendSource>> {
    let ua = cfg.user_agent.clone().unwrap_or_else(|| {
        if cfg.source.wants_browser_agent() {
            BROWSER_USER_AGENT.to_string()
        } else {
            DEFAULT_USER_AGENT.to_string()
        }
    });
    let client = reqwest::Client::builder()
        .user_agent(ua)
        .connect_timeout(Duration::from_secs(cfg.timeout_secs.clamp(1, 4)))
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("building trend source http client")?;

    let url = cfg.endpoint();
    let geo = cfg.geo.as_str();
    let source: Box<dyn TrendSource> = match cfg.source {
        SourceKind::GoogleApi => Box::new(GoogleApiProvider::from_url(url, client, geo)),
        SourceKind::GoogleRss => Box::new(GoogleRssProvider::from_url(url, client, geo)),
        SourceKind::YahooRealtime => Box::new(YahooRealtimeProvider::from_url(url, client, geo)),
        SourceKind::Aggregator => Box::new(AggregatorProvider::from_url(url, client, geo)),
    };
    Ok(source)
}

/// Answer to one list request.
#[derive(Debug, Clone, Serialize)]
pub struct TrendListing {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub cached: bool,
    pub items: Vec<TrendItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

/// One configured source behind the listing cache.
pub struct TrendService {
    source: Box<dyn TrendSource>,
    cap: usize,
    cache: TrendCache,
    // one fetch in flight at a time; waiters reuse its result
    fetch_gate: tokio::sync::Mutex<()>,
}

impl TrendService {
    pub fn new(source: Box<dyn TrendSource>, cap: usize, ttl: Duration) -> Self {
        Self {
            source,
            cap: cap.max(1),
            cache: TrendCache::new(ttl),
            fetch_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn from_config(cfg: &TrendsConfig) -> Result<Self> {
        let svc = Self::new(
            build_source(cfg)?,
            cfg.cap,
            Duration::from_secs(cfg.cache_ttl_secs),
        );
        tracing::info!(
            source = svc.source_name(),
            cap = svc.cap(),
            ttl_secs = svc.cache.ttl().as_secs(),
            "trend source configured"
        );
        Ok(svc)
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Cached listing while fresh; otherwise fetch. `refresh` drops the cache first.
    pub async fn listing(&self, refresh: bool) -> TrendListing {
        ensure_metrics_described();
        if refresh {
            self.cache.invalidate();
        } else if let Some(snap) = self.cache.get_fresh(Utc::now()) {
            counter!("trends_cache_hits_total").increment(1);
            return self.listing_from(snap, true);
        }

        let _gate = self.fetch_gate.lock().await;
        // a concurrent request may have filled the cache while we waited
        if !refresh {
            if let Some(snap) = self.cache.get_fresh(Utc::now()) {
                counter!("trends_cache_hits_total").increment(1);
                return self.listing_from(snap, true);
            }
        }

        let fetched_at = Utc::now();
        match try_fetch_trends(self.source.as_ref(), self.cap).await {
            Ok(items) => {
                tracing::info!(source = self.source_name(), count = items.len(), "trends fetched");
                let snap = TrendSnapshot { items, fetched_at };
                self.cache.store(snap.clone());
                self.listing_from(snap, false)
            }
            Err(e) => {
                report_fetch_error(self.source_name(), &e);
                TrendListing {
                    source: self.source_name().to_string(),
                    fetched_at,
                    cached: false,
                    items: Vec::new(),
                    notice: Some(NO_TRENDS_NOTICE.to_string()),
                    error_kind: Some(e.kind()),
                }
            }
        }
    }

    /// Look up an item of the last listing by rank.
    pub fn cached_item(&self, rank: u32) -> Option<TrendItem> {
        self.cache
            .last()
            .and_then(|s| s.items.into_iter().find(|i| i.rank == rank))
    }

    fn listing_from(&self, snap: TrendSnapshot, cached: bool) -> TrendListing {
        let notice = snap
            .items
            .is_empty()
            .then(|| NO_TRENDS_NOTICE.to_string());
        TrendListing {
            source: self.source_name().to_string(),
            fetched_at: snap.fetched_at,
            cached,
            items: snap.items,
            notice,
            error_kind: None,
        }
    }
}
