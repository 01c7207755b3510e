// src/trends/providers/yahoo_realtime.rs
use async_trait::async_trait;
use metrics::histogram;
use reqwest::Client;

use super::html::{parse_layouts, Layout};
use super::{explore_link, Origin};
use crate::trends::types::{RawTrend, TrendError, TrendSource};

pub const DEFAULT_URL: &str = "https://search.yahoo.co.jp/realtime";

/// Known markups of the Yahoo! JAPAN realtime-search trend ranking, newest first.
pub const LAYOUTS: &[Layout] = &[
    // CSS-module classes with readable prefixes.
    Layout {
        version: "2024-trend-module",
        scope: None,
        item: r#"li[class*="Trend_Trend__item"]"#,
        class_pattern: None,
        title: Some(r#"[class*="Trend_Trend__title"]"#),
        link: Some("a[href]"),
        metric: Some(r#"[class*="Trend_Trend__count"]"#),
    },
    // Fully hashed class names: only the `_trendItem__xxxxx` shape is stable.
    Layout {
        version: "2022-hashed",
        scope: None,
        item: "li",
        class_pattern: Some(r"(?:^|\s)[A-Za-z]+_trendItem__[0-9A-Za-z_-]{5}(?:\s|$)"),
        title: Some("h3"),
        link: Some("a[href]"),
        metric: None,
    },
    // Positional fallback: every link into a realtime search, in page order.
    Layout {
        version: "positional-search-links",
        scope: None,
        item: r#"a[href*="realtime/search?p="]"#,
        class_pattern: None,
        title: None,
        link: None,
        metric: None,
    },
];

pub struct YahooRealtimeProvider {
    origin: Origin,
    base_url: String,
    geo: String,
}

impl YahooRealtimeProvider {
    pub fn from_fixture(s: &str) -> Self {
        Self {
            origin: Origin::Fixture(s.to_string()),
            base_url: DEFAULT_URL.to_string(),
            geo: "JP".to_string(),
        }
    }

    pub fn from_url(url: impl Into<String>, client: Client, geo: &str) -> Self {
        let url = url.into();
        Self {
            base_url: url.clone(),
            origin: Origin::Http { url, client },
            geo: geo.to_string(),
        }
    }

    pub fn parse_items_from_str(
        html: &str,
        base_url: &str,
        geo: &str,
    ) -> Result<Vec<RawTrend>, TrendError> {
        let t0 = std::time::Instant::now();
        let (version, mut items) = parse_layouts(html, "yahoo_realtime", base_url, LAYOUTS)?;
        for it in items.iter_mut() {
            if it.link.is_none() {
                it.link = Some(explore_link(&it.title, geo));
            }
        }
        histogram!("trends_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        tracing::debug!(source = "yahoo_realtime", version, count = items.len(), "parsed trend page");
        Ok(items)
    }
}

#[async_trait]
impl TrendSource for YahooRealtimeProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawTrend>, TrendError> {
        let body = self.origin.load(self.name()).await?;
        Self::parse_items_from_str(&body, &self.base_url, &self.geo)
    }

    fn name(&self) -> &'static str {
        "yahoo_realtime"
    }

    fn geo(&self) -> &str {
        &self.geo
    }
}
