// src/trends/providers/aggregator.rs
use async_trait::async_trait;
use metrics::histogram;
use reqwest::Client;

use super::html::{parse_layouts, Layout};
use super::{explore_link, Origin};
use crate::trends::types::{RawTrend, TrendError, TrendSource};

pub const DEFAULT_URL: &str = "https://trends24.in/japan/";

/// trends24-style pages: one card per hour, newest first. Only the first card
/// is read.
pub const LAYOUTS: &[Layout] = &[
    Layout {
        version: "trend-card",
        scope: Some("ol.trend-card__list"),
        item: "li",
        class_pattern: None,
        title: Some("a.trend-link"),
        link: Some("a.trend-link"),
        metric: Some(".tweet-count"),
    },
    Layout {
        version: "first-ordered-list",
        scope: Some("ol"),
        item: "li",
        class_pattern: None,
        title: Some("a"),
        link: None,
        metric: None,
    },
];

pub struct AggregatorProvider {
    origin: Origin,
    base_url: String,
    geo: String,
}

impl AggregatorProvider {
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
        let (version, mut items) = parse_layouts(html, "aggregator", base_url, LAYOUTS)?;
        for it in items.iter_mut() {
            if it.link.is_none() {
                it.link = Some(explore_link(&it.title, geo));
            }
        }
        histogram!("trends_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        tracing::debug!(source = "aggregator", version, count = items.len(), "parsed trend page");
        Ok(items)
    }
}

#[async_trait]
impl TrendSource for AggregatorProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawTrend>, TrendError> {
        let body = self.origin.load(self.name()).await?;
        Self::parse_items_from_str(&body, &self.base_url, &self.geo)
    }

    fn name(&self) -> &'static str {
        "aggregator"
    }

    fn geo(&self) -> &str {
        &self.geo
    }
}
