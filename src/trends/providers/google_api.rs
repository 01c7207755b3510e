// src/trends/providers/google_api.rs
use async_trait::async_trait;
use metrics::histogram;
use reqwest::Client;
use serde::Deserialize;

use super::{explore_link, resolve_link, Origin};
use crate::trends::normalize_title;
use crate::trends::types::{RawTrend, TrendError, TrendSource};

pub const DEFAULT_URL: &str =
    "https://trends.google.com/trends/api/dailytrends?hl=ja&tz=-540&geo=JP&ns=15";
const BASE: &str = "https://trends.google.com";

/// Anti-XSSI guard Google prepends to its JSON endpoints.
const XSSI_PREFIX: &str = ")]}'";

#[derive(Debug, Deserialize)]
struct Envelope {
    default: DailyTrends,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyTrends {
    #[serde(default)]
    trending_searches_days: Vec<Day>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Day {
    #[serde(default)]
    trending_searches: Vec<Search>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Search {
    title: SearchTitle,
    formatted_traffic: Option<String>,
    share_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchTitle {
    query: String,
    explore_link: Option<String>,
}

/// Google Trends daily-trends JSON API. Only the most recent day is used.
pub struct GoogleApiProvider {
    origin: Origin,
    geo: String,
}

impl GoogleApiProvider {
    pub fn from_fixture(s: &str) -> Self {
        Self {
            origin: Origin::Fixture(s.to_string()),
            geo: "JP".to_string(),
        }
    }

    pub fn from_url(url: impl Into<String>, client: Client, geo: &str) -> Self {
        Self {
            origin: Origin::Http {
                url: url.into(),
                client,
            },
            geo: geo.to_string(),
        }
    }

    pub fn parse_items_from_str(body: &str, geo: &str) -> Result<Vec<RawTrend>, TrendError> {
        let t0 = std::time::Instant::now();
        let json = strip_xssi(body);
        let env: Envelope = serde_json::from_str(json)
            .map_err(|e| TrendError::Malformed(format!("dailytrends json: {e}")))?;

        let Some(day) = env.default.trending_searches_days.into_iter().next() else {
            return Ok(Vec::new());
        };

        let mut out = Vec::with_capacity(day.trending_searches.len());
        for s in day.trending_searches {
            let title = normalize_title(&s.title.query);
            if title.is_empty() {
                continue;
            }
            let link = s
                .share_url
                .as_deref()
                .and_then(|u| resolve_link(BASE, u))
                .or_else(|| {
                    s.title
                        .explore_link
                        .as_deref()
                        .and_then(|u| resolve_link(BASE, u))
                })
                .unwrap_or_else(|| explore_link(&title, geo));
            out.push(RawTrend {
                title,
                link: Some(link),
                metric: s.formatted_traffic.filter(|m| !m.trim().is_empty()),
            });
        }

        histogram!("trends_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }
}

fn strip_xssi(body: &str) -> &str {
    let b = body.trim_start();
    match b.strip_prefix(XSSI_PREFIX) {
        Some(rest) => rest.trim_start_matches(',').trim_start(),
        None => b,
    }
}

#[async_trait]
impl TrendSource for GoogleApiProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawTrend>, TrendError> {
        let body = self.origin.load(self.name()).await?;
        Self::parse_items_from_str(&body, &self.geo)
    }

    fn name(&self) -> &'static str {
        "google_api"
    }

    fn geo(&self) -> &str {
        &self.geo
    }
}
