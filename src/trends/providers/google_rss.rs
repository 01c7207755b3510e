// src/trends/providers/google_rss.rs
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;

use super::{explore_link, Origin};
use crate::trends::clean_title;
use crate::trends::types::{RawTrend, TrendError, TrendSource};

pub const DEFAULT_URL: &str = "https://trends.google.com/trending/rss?geo=JP";

/// Google Trends "trending now" RSS feed. Traffic comes from the
/// `ht:approx_traffic` extension element.
pub struct GoogleRssProvider {
    origin: Origin,
    geo: String,
}

impl GoogleRssProvider {
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

    pub fn parse_items_from_str(xml: &str, geo: &str) -> Result<Vec<RawTrend>, TrendError> {
        let t0 = std::time::Instant::now();
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        // Local names of open elements; fields are read only when their
        // parent is <item>, which skips nested ht:news_item children.
        let mut path: Vec<String> = Vec::new();
        let mut saw_channel = false;
        let mut out = Vec::new();

        let mut title = String::new();
        let mut link = String::new();
        let mut traffic = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    match name.as_str() {
                        "channel" => saw_channel = true,
                        "item" => {
                            title.clear();
                            link.clear();
                            traffic.clear();
                        }
                        _ => {}
                    }
                    path.push(name);
                }
                Ok(Event::End(_)) => {
                    if path.pop().as_deref() == Some("item") {
                        let t = clean_title(&title);
                        if !t.is_empty() {
                            let link = if link.trim().is_empty() {
                                explore_link(&t, geo)
                            } else {
                                link.trim().to_string()
                            };
                            let metric = traffic.trim();
                            out.push(RawTrend {
                                title: t,
                                link: Some(link),
                                metric: (!metric.is_empty()).then(|| metric.to_string()),
                            });
                        }
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| TrendError::Malformed(format!("rss text: {e}")))?;
                    push_field(&path, &text, &mut title, &mut link, &mut traffic);
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    push_field(&path, &text, &mut title, &mut link, &mut traffic);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(TrendError::Malformed(format!("rss xml: {e}"))),
                _ => {}
            }
        }

        if !saw_channel {
            return Err(TrendError::Malformed("no <channel> in feed".to_string()));
        }

        histogram!("trends_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }
}

fn push_field(path: &[String], text: &str, title: &mut String, link: &mut String, traffic: &mut String) {
    let n = path.len();
    if n < 2 || path[n - 2] != "item" {
        return;
    }
    match path[n - 1].as_str() {
        "title" => title.push_str(text),
        "link" => link.push_str(text),
        "approx_traffic" => traffic.push_str(text),
        _ => {}
    }
}

#[async_trait]
impl TrendSource for GoogleRssProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawTrend>, TrendError> {
        let body = self.origin.load(self.name()).await?;
        Self::parse_items_from_str(&body, &self.geo)
    }

    fn name(&self) -> &'static str {
        "google_rss"
    }

    fn geo(&self) -> &str {
        &self.geo
    }
}
