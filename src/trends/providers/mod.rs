// src/trends/providers/mod.rs
pub mod aggregator;
pub mod google_api;
pub mod google_rss;
pub mod html;
pub mod yahoo_realtime;

use reqwest::{Client, Url};

use crate::trends::types::TrendError;

/// Sent to HTML sources, which tend to serve a stripped page (or nothing) to
/// unknown agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub const DEFAULT_USER_AGENT: &str = concat!("trendcast/", env!("CARGO_PKG_VERSION"));

/// Where a provider gets its body from: an in-memory document or a live endpoint.
pub(crate) enum Origin {
    Fixture(String),
    Http { url: String, client: Client },
}

impl Origin {
    pub(crate) async fn load(&self, provider: &'static str) -> Result<String, TrendError> {
        match self {
            Origin::Fixture(s) => Ok(s.clone()),
            Origin::Http { url, client } => {
                let resp = client.get(url.as_str()).send().await.map_err(|e| {
                    tracing::warn!(error = ?e, provider, "provider http error");
                    TrendError::from(e)
                })?;
                let resp = resp.error_for_status()?;
                Ok(resp.text().await?)
            }
        }
    }
}

/// Resolve `href` against the page it came from. Absolute links pass through.
pub fn resolve_link(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if let Ok(u) = Url::parse(href) {
        return Some(u.to_string());
    }
    Url::parse(base)
        .ok()
        .and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
}

/// Google Trends explore page for `term`; used when a source gives no link.
pub fn explore_link(term: &str, geo: &str) -> String {
    format!(
        "https://trends.google.com/trends/explore?q={}&geo={}",
        urlencoding::encode(term),
        urlencoding::encode(geo)
    )
}
