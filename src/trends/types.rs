// src/trends/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// One normalized trending-topic record. `rank` is the 1-based position in
/// the list the source returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendItem {
    pub rank: u32,
    pub title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>, // e.g. "20万+", "12K"
}

/// Entry as parsed from a source, before ranking and truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTrend {
    pub title: String,
    pub link: Option<String>,
    pub metric: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TrendError {
    #[error("source unreachable: {0}")]
    Http(#[source] reqwest::Error),
    #[error("source timed out")]
    Timeout,
    #[error("source answered with HTTP {0}")]
    Status(u16),
    #[error("{source_name} markup matched no known layout (tried {tried:?})")]
    FormatChanged {
        source_name: &'static str,
        tried: Vec<&'static str>,
    },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl TrendError {
    /// Stable label surfaced to the UI next to the empty list.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrendError::Http(_) => ErrorKind::Unreachable,
            TrendError::Timeout => ErrorKind::Timeout,
            TrendError::Status(_) => ErrorKind::HttpStatus,
            TrendError::FormatChanged { .. } => ErrorKind::FormatChanged,
            TrendError::Malformed(_) => ErrorKind::Malformed,
        }
    }
}

impl From<reqwest::Error> for TrendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TrendError::Timeout
        } else if let Some(status) = e.status() {
            TrendError::Status(status.as_u16())
        } else {
            TrendError::Http(e)
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unreachable,
    Timeout,
    HttpStatus,
    FormatChanged,
    Malformed,
}

/// Which external source the adapter talks to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    GoogleApi,
    #[default]
    GoogleRss,
    YahooRealtime,
    Aggregator,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::GoogleApi,
        SourceKind::GoogleRss,
        SourceKind::YahooRealtime,
        SourceKind::Aggregator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::GoogleApi => "google_api",
            SourceKind::GoogleRss => "google_rss",
            SourceKind::YahooRealtime => "yahoo_realtime",
            SourceKind::Aggregator => "aggregator",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// HTML pages reject non-browser agents more often than feeds/APIs do.
    pub fn wants_browser_agent(&self) -> bool {
        matches!(self, SourceKind::YahooRealtime | SourceKind::Aggregator)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait::async_trait]
pub trait TrendSource: Send + Sync {
    /// Fetch and parse the source, in source order. Ranking and the cap are
    /// applied by the caller.
    async fn fetch_latest(&self) -> Result<Vec<RawTrend>, TrendError>;
    fn name(&self) -> &'static str;
    /// Region used for explore links when an entry has none.
    fn geo(&self) -> &str {
        "JP"
    }
}
