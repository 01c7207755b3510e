// src/trends/providers/html.rs
//! Versioned HTML layouts for sources that only publish a web page.
//!
//! A source lists its known layouts newest first. Parsing walks the table and
//! takes the first layout that yields at least one entry; when none does, the
//! page is reported as [`TrendError::FormatChanged`] instead of an empty list.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::resolve_link;
use crate::trends::clean_title;
use crate::trends::types::{RawTrend, TrendError};

#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// Tag logged when this layout matches.
    pub version: &'static str,
    /// Restrict the search to the first element matching this selector.
    pub scope: Option<&'static str>,
    pub item: &'static str,
    /// Regex the item's `class` attribute must match (hashed CSS-module names).
    pub class_pattern: Option<&'static str>,
    /// Title element inside the item; `None` uses the item's own text.
    pub title: Option<&'static str>,
    /// Anchor inside the item; `None` uses the item itself if it is an `<a>`,
    /// else its first `a[href]`.
    pub link: Option<&'static str>,
    pub metric: Option<&'static str>,
}

impl Layout {
    pub const fn new(version: &'static str, item: &'static str) -> Self {
        Self {
            version,
            scope: None,
            item,
            class_pattern: None,
            title: None,
            link: None,
            metric: None,
        }
    }
}

fn selector(css: &str) -> Result<Selector, TrendError> {
    Selector::parse(css).map_err(|e| TrendError::Malformed(format!("selector {css:?}: {e:?}")))
}

fn element_text(el: ElementRef<'_>) -> String {
    clean_title(&el.text().collect::<Vec<_>>().join(" "))
}

/// Apply one layout. An empty vec means "did not match".
pub fn parse_with_layout(
    doc: &Html,
    layout: &Layout,
    base_url: &str,
) -> Result<Vec<RawTrend>, TrendError> {
    let item_sel = selector(layout.item)?;
    let title_sel = layout.title.map(selector).transpose()?;
    let link_sel = match layout.link {
        Some(css) => selector(css)?,
        None => selector("a[href]")?,
    };
    let metric_sel = layout.metric.map(selector).transpose()?;
    let class_re = layout
        .class_pattern
        .map(Regex::new)
        .transpose()
        .map_err(|e| TrendError::Malformed(format!("class pattern: {e}")))?;

    let scope_el = match layout.scope {
        Some(css) => match doc.select(&selector(css)?).next() {
            Some(el) => Some(el),
            None => return Ok(Vec::new()),
        },
        None => None,
    };
    let candidates: Vec<ElementRef<'_>> = match scope_el {
        Some(el) => el.select(&item_sel).collect(),
        None => doc.select(&item_sel).collect(),
    };

    let mut out = Vec::new();
    for el in candidates {
        if let Some(re) = &class_re {
            let class = el.value().attr("class").unwrap_or_default();
            if !re.is_match(class) {
                continue;
            }
        }

        let title = match &title_sel {
            Some(sel) => el.select(sel).next().map(element_text).unwrap_or_default(),
            None => element_text(el),
        };
        if title.is_empty() {
            continue;
        }

        let href = if layout.link.is_none() && el.value().name() == "a" {
            el.value().attr("href")
        } else {
            el.select(&link_sel).next().and_then(|a| a.value().attr("href"))
        };
        let link = href.and_then(|h| resolve_link(base_url, h));

        let metric = metric_sel
            .as_ref()
            .and_then(|sel| el.select(sel).next())
            .map(element_text)
            .filter(|m| !m.is_empty());

        out.push(RawTrend {
            title,
            link,
            metric,
        });
    }
    Ok(out)
}

/// Walk `layouts` newest first; return the matching version and its entries.
pub fn parse_layouts(
    html: &str,
    source_name: &'static str,
    base_url: &str,
    layouts: &[Layout],
) -> Result<(&'static str, Vec<RawTrend>), TrendError> {
    let doc = Html::parse_document(html);
    for layout in layouts {
        let items = parse_with_layout(&doc, layout, base_url)?;
        if !items.is_empty() {
            return Ok((layout.version, items));
        }
        tracing::debug!(source = source_name, version = layout.version, "layout did not match");
    }
    Err(TrendError::FormatChanged {
        source_name,
        tried: layouts.iter().map(|l| l.version).collect(),
    })
}
